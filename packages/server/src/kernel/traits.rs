// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Validation, workflows and the sync relay are domain functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseSellerStore, BaseSearchIndex)
//
// Store methods return `anyhow::Result`. A store that already knows how a
// failure should be classified wraps a `DomainError`, which `DomainError::from`
// recovers.

use anyhow::Result;
use async_trait::async_trait;

use crate::common::{CityId, FindParams, MemberId, NeighborhoodId, SellerId};
use crate::domains::locations::models::{City, Neighborhood};
use crate::domains::search::{IndexType, SearchSeller};
use crate::domains::sellers::models::{
    PublishedSellerFilter, Seller, SellerStatusRecord, SellerWithLocation, SubscriptionStatus,
};

// =============================================================================
// Location Store (cities and neighborhoods)
// =============================================================================

#[async_trait]
pub trait BaseLocationStore: Send + Sync {
    async fn find_city(&self, id: &CityId) -> Result<Option<City>>;

    async fn list_cities(&self, params: FindParams) -> Result<(Vec<City>, i64)>;

    async fn create_city(&self, id: &CityId, name: &str) -> Result<City>;

    /// Returns `None` when the city does not exist.
    async fn rename_city(&self, id: &CityId, name: &str) -> Result<Option<City>>;

    /// Soft-deletes the city together with its neighborhoods.
    async fn delete_city(&self, id: &CityId) -> Result<bool>;

    async fn find_neighborhood(&self, id: &NeighborhoodId) -> Result<Option<Neighborhood>>;

    /// Lists neighborhoods, optionally restricted to one city.
    async fn list_neighborhoods(
        &self,
        city_id: Option<&CityId>,
        params: FindParams,
    ) -> Result<(Vec<Neighborhood>, i64)>;

    async fn create_neighborhood(
        &self,
        id: &NeighborhoodId,
        name: &str,
        city_id: &CityId,
    ) -> Result<Neighborhood>;

    async fn update_neighborhood(
        &self,
        id: &NeighborhoodId,
        name: Option<&str>,
        city_id: Option<&CityId>,
    ) -> Result<Option<Neighborhood>>;

    async fn delete_neighborhood(&self, id: &NeighborhoodId) -> Result<bool>;
}

// =============================================================================
// Seller Store
// =============================================================================

#[async_trait]
pub trait BaseSellerStore: Send + Sync {
    async fn find_seller(&self, id: &SellerId) -> Result<Option<Seller>>;

    /// Minimal status projection. Ids that do not resolve are absent from
    /// the result; the order is the store's, not the caller's.
    async fn find_statuses(&self, ids: &[SellerId]) -> Result<Vec<SellerStatusRecord>>;

    /// Full projection with city and neighborhood names.
    async fn find_with_location(&self, ids: &[SellerId]) -> Result<Vec<SellerWithLocation>>;

    async fn list_published(
        &self,
        filter: &PublishedSellerFilter,
        params: FindParams,
    ) -> Result<(Vec<SellerWithLocation>, i64)>;

    /// Keyset page of seller ids ordered by id, starting after `after`.
    async fn list_ids_after(&self, after: Option<&SellerId>, limit: i64) -> Result<Vec<SellerId>>;

    async fn ids_in_city(&self, city_id: &CityId) -> Result<Vec<SellerId>>;

    async fn ids_in_neighborhood(&self, neighborhood_id: &NeighborhoodId) -> Result<Vec<SellerId>>;

    /// Writes both location fields in one statement. Returns `None` when
    /// the seller does not exist.
    async fn update_location(
        &self,
        id: &SellerId,
        city_id: Option<&CityId>,
        neighborhood_id: Option<&NeighborhoodId>,
    ) -> Result<Option<Seller>>;

    async fn update_status(
        &self,
        id: &SellerId,
        approved: Option<bool>,
        subscription_status: Option<SubscriptionStatus>,
    ) -> Result<Option<Seller>>;

    /// Clears city and neighborhood on every seller in `city_id`; returns
    /// the affected ids.
    async fn clear_city(&self, city_id: &CityId) -> Result<Vec<SellerId>>;

    async fn clear_neighborhood(&self, neighborhood_id: &NeighborhoodId) -> Result<Vec<SellerId>>;

    /// Clears `neighborhood_id` on sellers whose city is not `city_id`.
    async fn clear_mismatched_neighborhood(
        &self,
        neighborhood_id: &NeighborhoodId,
        city_id: &CityId,
    ) -> Result<Vec<SellerId>>;
}

// =============================================================================
// Actor Resolution
// =============================================================================

#[async_trait]
pub trait BaseActorResolver: Send + Sync {
    /// Seller the authenticated member acts for, if any.
    async fn resolve_seller_id(&self, member_id: &MemberId) -> Result<Option<SellerId>>;
}

// =============================================================================
// Search Index
// =============================================================================

#[async_trait]
pub trait BaseSearchIndex: Send + Sync {
    /// Upserts `records` and deletes `delete_ids` in one batch.
    async fn batch(
        &self,
        index: IndexType,
        records: &[SearchSeller],
        delete_ids: &[SellerId],
    ) -> Result<()>;

    async fn batch_delete(&self, index: IndexType, ids: &[SellerId]) -> Result<()>;
}
