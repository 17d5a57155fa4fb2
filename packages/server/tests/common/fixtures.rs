//! Test fixtures for creating test data.

use b2c_core::common::{CityId, NeighborhoodId, SellerId};
use b2c_core::domains::sellers::models::{Seller, SubscriptionStatus};

pub fn seller_id(raw: &str) -> SellerId {
    SellerId::parse(raw).expect("valid seller id")
}

pub fn city_id(raw: &str) -> CityId {
    CityId::parse(raw).expect("valid city id")
}

pub fn neighborhood_id(raw: &str) -> NeighborhoodId {
    NeighborhoodId::parse(raw).expect("valid neighborhood id")
}

/// Approved seller with an active subscription.
pub fn published_seller(id: &str, name: &str) -> Seller {
    Seller::builder()
        .id(seller_id(id))
        .name(name)
        .handle(name.to_lowercase().replace(' ', "-"))
        .approved(true)
        .subscription_status(SubscriptionStatus::Active)
        .build()
}

pub fn unapproved_seller(id: &str, name: &str) -> Seller {
    Seller::builder()
        .id(seller_id(id))
        .name(name)
        .handle(name.to_lowercase().replace(' ', "-"))
        .approved(false)
        .subscription_status(SubscriptionStatus::Active)
        .build()
}

/// Fresh ids for Postgres tests, so runs never collide on the shared database.
pub fn unique_handle(prefix: &str) -> String {
    format!("{}-{}", prefix, SellerId::new().as_str().to_lowercase())
}
