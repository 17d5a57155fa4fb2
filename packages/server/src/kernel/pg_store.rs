//! Postgres implementation of the store traits, delegating to the model
//! methods.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::{CityId, FindParams, MemberId, NeighborhoodId, SellerId};
use crate::domains::locations::models::{City, Neighborhood};
use crate::domains::sellers::models::{
    PublishedSellerFilter, Seller, SellerStatusRecord, SellerWithLocation, SubscriptionStatus,
};
use crate::domains::sellers::validation::{city_not_found, neighborhood_not_found};
use crate::kernel::{BaseActorResolver, BaseLocationStore, BaseSellerStore};

const SELLER_NEIGHBORHOOD_FK: &str = "seller_neighborhood_id_foreign";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseLocationStore for PgStore {
    async fn find_city(&self, id: &CityId) -> Result<Option<City>> {
        City::find_by_id(id, &self.pool).await
    }

    async fn list_cities(&self, params: FindParams) -> Result<(Vec<City>, i64)> {
        City::find_page(params, &self.pool).await
    }

    async fn create_city(&self, id: &CityId, name: &str) -> Result<City> {
        City::create(id, name, &self.pool).await
    }

    async fn rename_city(&self, id: &CityId, name: &str) -> Result<Option<City>> {
        City::rename(id, name, &self.pool).await
    }

    async fn delete_city(&self, id: &CityId) -> Result<bool> {
        City::soft_delete(id, &self.pool).await
    }

    async fn find_neighborhood(&self, id: &NeighborhoodId) -> Result<Option<Neighborhood>> {
        Neighborhood::find_by_id(id, &self.pool).await
    }

    async fn list_neighborhoods(
        &self,
        city_id: Option<&CityId>,
        params: FindParams,
    ) -> Result<(Vec<Neighborhood>, i64)> {
        Neighborhood::find_page(city_id, params, &self.pool).await
    }

    async fn create_neighborhood(
        &self,
        id: &NeighborhoodId,
        name: &str,
        city_id: &CityId,
    ) -> Result<Neighborhood> {
        Neighborhood::create(id, name, city_id, &self.pool).await
    }

    async fn update_neighborhood(
        &self,
        id: &NeighborhoodId,
        name: Option<&str>,
        city_id: Option<&CityId>,
    ) -> Result<Option<Neighborhood>> {
        Neighborhood::update(id, name, city_id, &self.pool).await
    }

    async fn delete_neighborhood(&self, id: &NeighborhoodId) -> Result<bool> {
        Neighborhood::soft_delete(id, &self.pool).await
    }
}

#[async_trait]
impl BaseSellerStore for PgStore {
    async fn find_seller(&self, id: &SellerId) -> Result<Option<Seller>> {
        Seller::find_by_id(id, &self.pool).await
    }

    async fn find_statuses(&self, ids: &[SellerId]) -> Result<Vec<SellerStatusRecord>> {
        Seller::find_statuses(ids, &self.pool).await
    }

    async fn find_with_location(&self, ids: &[SellerId]) -> Result<Vec<SellerWithLocation>> {
        Seller::find_with_location(ids, &self.pool).await
    }

    async fn list_published(
        &self,
        filter: &PublishedSellerFilter,
        params: FindParams,
    ) -> Result<(Vec<SellerWithLocation>, i64)> {
        Seller::find_published(filter, params, &self.pool).await
    }

    async fn list_ids_after(&self, after: Option<&SellerId>, limit: i64) -> Result<Vec<SellerId>> {
        Seller::find_ids_after(after, limit, &self.pool).await
    }

    async fn ids_in_city(&self, city_id: &CityId) -> Result<Vec<SellerId>> {
        Seller::find_ids_by_city(city_id, &self.pool).await
    }

    async fn ids_in_neighborhood(&self, neighborhood_id: &NeighborhoodId) -> Result<Vec<SellerId>> {
        Seller::find_ids_by_neighborhood(neighborhood_id, &self.pool).await
    }

    async fn update_location(
        &self,
        id: &SellerId,
        city_id: Option<&CityId>,
        neighborhood_id: Option<&NeighborhoodId>,
    ) -> Result<Option<Seller>> {
        match Seller::update_location(id, city_id, neighborhood_id, &self.pool).await {
            Ok(seller) => Ok(seller),
            // A referenced city or neighborhood vanished after validation.
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                let neighborhood_fk = db.constraint() == Some(SELLER_NEIGHBORHOOD_FK);
                let err = match (city_id, neighborhood_id) {
                    (_, Some(n)) if neighborhood_fk => neighborhood_not_found(n),
                    (Some(c), _) => city_not_found(c),
                    (None, Some(n)) => neighborhood_not_found(n),
                    (None, None) => return Err(sqlx::Error::Database(db).into()),
                };
                Err(err.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_status(
        &self,
        id: &SellerId,
        approved: Option<bool>,
        subscription_status: Option<SubscriptionStatus>,
    ) -> Result<Option<Seller>> {
        Seller::update_status(id, approved, subscription_status, &self.pool).await
    }

    async fn clear_city(&self, city_id: &CityId) -> Result<Vec<SellerId>> {
        Seller::clear_city(city_id, &self.pool).await
    }

    async fn clear_neighborhood(&self, neighborhood_id: &NeighborhoodId) -> Result<Vec<SellerId>> {
        Seller::clear_neighborhood(neighborhood_id, &self.pool).await
    }

    async fn clear_mismatched_neighborhood(
        &self,
        neighborhood_id: &NeighborhoodId,
        city_id: &CityId,
    ) -> Result<Vec<SellerId>> {
        Seller::clear_mismatched_neighborhood(neighborhood_id, city_id, &self.pool).await
    }
}

#[async_trait]
impl BaseActorResolver for PgStore {
    async fn resolve_seller_id(&self, member_id: &MemberId) -> Result<Option<SellerId>> {
        Ok(Seller::find_by_member(member_id, &self.pool)
            .await?
            .map(|seller| seller.id))
    }
}
