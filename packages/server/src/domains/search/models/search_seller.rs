use serde::{Deserialize, Serialize};

use crate::common::{CityId, NeighborhoodId, SellerId};
use crate::domains::sellers::models::{
    LocationRef, SellerWithLocation, StoreStatus, SubscriptionStatus,
};

/// Seller record as stored in the search index.
///
/// Derived from [`SellerWithLocation`] during a sync and never persisted
/// locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSeller {
    pub id: SellerId,
    pub name: String,
    pub handle: String,
    pub description: Option<String>,
    pub photo: Option<String>,
    pub store_status: StoreStatus,
    pub approved: bool,
    pub subscription_status: SubscriptionStatus,
    pub city_id: Option<CityId>,
    pub neighborhood_id: Option<NeighborhoodId>,
    pub city: Option<LocationRef>,
    pub neighborhood: Option<LocationRef>,
}

impl algolia::IndexRecord for SearchSeller {
    fn object_id(&self) -> &str {
        self.id.as_str()
    }
}

impl From<SellerWithLocation> for SearchSeller {
    fn from(listed: SellerWithLocation) -> Self {
        let seller = listed.seller;
        Self {
            id: seller.id,
            name: seller.name,
            handle: seller.handle,
            description: seller.description,
            photo: seller.photo,
            store_status: seller.store_status,
            approved: seller.approved,
            subscription_status: seller.subscription_status,
            city_id: seller.city_id,
            neighborhood_id: seller.neighborhood_id,
            city: listed.city,
            neighborhood: listed.neighborhood,
        }
    }
}
