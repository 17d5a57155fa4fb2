// TestDependencies - in-memory implementations for testing
//
// Provides stores and a search index that can be injected into ServerDeps so
// workflows and the sync relay run without Postgres or Algolia.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;

use super::{BaseActorResolver, BaseLocationStore, BaseSearchIndex, BaseSellerStore, ServerDeps};
use crate::common::{CityId, FindParams, MemberId, NeighborhoodId, SellerId};
use crate::domains::locations::models::{City, Neighborhood};
use crate::domains::search::{IndexType, SearchSeller};
use crate::domains::sellers::validation::{city_not_found, neighborhood_not_found};
use crate::domains::sellers::models::{
    LocationRef, PublishedSellerFilter, Seller, SellerStatusRecord, SellerWithLocation,
    SubscriptionStatus,
};

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Default)]
struct StoreState {
    cities: BTreeMap<CityId, City>,
    neighborhoods: BTreeMap<NeighborhoodId, Neighborhood>,
    sellers: BTreeMap<SellerId, Seller>,
    members: HashMap<MemberId, SellerId>,
    deleted_cities: BTreeSet<CityId>,
    deleted_neighborhoods: BTreeSet<NeighborhoodId>,
    /// Sellers removed right after the next status lookup.
    vanishing: Vec<SellerId>,
}

impl StoreState {
    fn live_city(&self, id: &CityId) -> Option<&City> {
        self.cities.get(id).filter(|_| !self.deleted_cities.contains(id))
    }

    fn live_neighborhood(&self, id: &NeighborhoodId) -> Option<&Neighborhood> {
        self.neighborhoods
            .get(id)
            .filter(|_| !self.deleted_neighborhoods.contains(id))
    }
}

/// Implements every store trait over maps.
///
/// Deletes are soft, as in Postgres: lookups and joins skip deleted cities
/// and neighborhoods, while the reference check on a location write still
/// sees them, the way a foreign key does.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
    status_lookups: AtomicUsize,
    projection_lookups: AtomicUsize,
    location_writes: AtomicUsize,
    fail_lookups: AtomicBool,
}

fn page<T: Clone>(rows: Vec<T>, params: FindParams) -> (Vec<T>, i64) {
    let count = rows.len() as i64;
    let items = rows
        .into_iter()
        .skip(params.offset.max(0) as usize)
        .take(params.limit.max(0) as usize)
        .collect();
    (items, count)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_city(&self, id: CityId, name: &str) -> City {
        let now = Utc::now();
        let city = City {
            id: id.clone(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        let mut state = self.write();
        state.deleted_cities.remove(&id);
        state.cities.insert(id, city.clone());
        city
    }

    pub fn insert_neighborhood(&self, id: NeighborhoodId, name: &str, city_id: CityId) -> Neighborhood {
        let now = Utc::now();
        let neighborhood = Neighborhood {
            id: id.clone(),
            name: name.to_string(),
            city_id,
            created_at: now,
            updated_at: now,
        };
        let mut state = self.write();
        state.deleted_neighborhoods.remove(&id);
        state.neighborhoods.insert(id, neighborhood.clone());
        neighborhood
    }

    pub fn insert_seller(&self, seller: Seller) -> Seller {
        self.write().sellers.insert(seller.id.clone(), seller.clone());
        seller
    }

    pub fn link_member(&self, member_id: MemberId, seller_id: SellerId) {
        self.write().members.insert(member_id, seller_id);
    }

    pub fn remove_seller(&self, id: &SellerId) {
        self.write().sellers.remove(id);
    }

    /// Removes the seller once the next status lookup has returned, as if
    /// it was deleted while a sync was running.
    pub fn vanish_after_status_lookup(&self, id: SellerId) {
        self.write().vanishing.push(id);
    }

    pub fn seller(&self, id: &SellerId) -> Option<Seller> {
        self.read().sellers.get(id).cloned()
    }

    pub fn city(&self, id: &CityId) -> Option<City> {
        self.read().live_city(id).cloned()
    }

    pub fn neighborhood(&self, id: &NeighborhoodId) -> Option<Neighborhood> {
        self.read().live_neighborhood(id).cloned()
    }

    /// Makes every seller lookup fail until reset.
    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    pub fn status_lookups(&self) -> usize {
        self.status_lookups.load(Ordering::SeqCst)
    }

    pub fn projection_lookups(&self) -> usize {
        self.projection_lookups.load(Ordering::SeqCst)
    }

    pub fn location_writes(&self) -> usize {
        self.location_writes.load(Ordering::SeqCst)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn check_lookup(&self) -> Result<()> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            bail!("seller store unavailable");
        }
        Ok(())
    }

    fn with_location(state: &StoreState, seller: &Seller) -> SellerWithLocation {
        let city = seller
            .city_id
            .as_ref()
            .and_then(|id| state.live_city(id))
            .map(|c| LocationRef {
                id: c.id.to_string(),
                name: c.name.clone(),
            });
        let neighborhood = seller
            .neighborhood_id
            .as_ref()
            .and_then(|id| state.live_neighborhood(id))
            .map(|n| LocationRef {
                id: n.id.to_string(),
                name: n.name.clone(),
            });
        SellerWithLocation {
            seller: seller.clone(),
            city,
            neighborhood,
        }
    }

    fn update_sellers(
        &self,
        matches: impl Fn(&Seller) -> bool,
        apply: impl Fn(&mut Seller),
    ) -> Vec<SellerId> {
        let mut state = self.write();
        let mut affected = Vec::new();
        for seller in state.sellers.values_mut() {
            if matches(seller) {
                apply(seller);
                seller.updated_at = Utc::now();
                affected.push(seller.id.clone());
            }
        }
        affected
    }
}

#[async_trait]
impl BaseLocationStore for InMemoryStore {
    async fn find_city(&self, id: &CityId) -> Result<Option<City>> {
        Ok(self.city(id))
    }

    async fn list_cities(&self, params: FindParams) -> Result<(Vec<City>, i64)> {
        let state = self.read();
        let mut rows: Vec<City> = state
            .cities
            .values()
            .filter(|c| !state.deleted_cities.contains(&c.id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(page(rows, params))
    }

    async fn create_city(&self, id: &CityId, name: &str) -> Result<City> {
        Ok(self.insert_city(id.clone(), name))
    }

    async fn rename_city(&self, id: &CityId, name: &str) -> Result<Option<City>> {
        let mut state = self.write();
        if state.deleted_cities.contains(id) {
            return Ok(None);
        }
        Ok(state.cities.get_mut(id).map(|city| {
            city.name = name.to_string();
            city.updated_at = Utc::now();
            city.clone()
        }))
    }

    async fn delete_city(&self, id: &CityId) -> Result<bool> {
        let mut state = self.write();
        if state.live_city(id).is_none() {
            return Ok(false);
        }
        state.deleted_cities.insert(id.clone());
        let in_city: Vec<NeighborhoodId> = state
            .neighborhoods
            .values()
            .filter(|n| &n.city_id == id)
            .map(|n| n.id.clone())
            .collect();
        state.deleted_neighborhoods.extend(in_city);
        Ok(true)
    }

    async fn find_neighborhood(&self, id: &NeighborhoodId) -> Result<Option<Neighborhood>> {
        Ok(self.neighborhood(id))
    }

    async fn list_neighborhoods(
        &self,
        city_id: Option<&CityId>,
        params: FindParams,
    ) -> Result<(Vec<Neighborhood>, i64)> {
        let state = self.read();
        let mut rows: Vec<Neighborhood> = state
            .neighborhoods
            .values()
            .filter(|n| !state.deleted_neighborhoods.contains(&n.id))
            .filter(|n| city_id.map_or(true, |c| &n.city_id == c))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(page(rows, params))
    }

    async fn create_neighborhood(
        &self,
        id: &NeighborhoodId,
        name: &str,
        city_id: &CityId,
    ) -> Result<Neighborhood> {
        Ok(self.insert_neighborhood(id.clone(), name, city_id.clone()))
    }

    async fn update_neighborhood(
        &self,
        id: &NeighborhoodId,
        name: Option<&str>,
        city_id: Option<&CityId>,
    ) -> Result<Option<Neighborhood>> {
        let mut state = self.write();
        if state.deleted_neighborhoods.contains(id) {
            return Ok(None);
        }
        Ok(state.neighborhoods.get_mut(id).map(|n| {
            if let Some(name) = name {
                n.name = name.to_string();
            }
            if let Some(city_id) = city_id {
                n.city_id = city_id.clone();
            }
            n.updated_at = Utc::now();
            n.clone()
        }))
    }

    async fn delete_neighborhood(&self, id: &NeighborhoodId) -> Result<bool> {
        let mut state = self.write();
        if state.live_neighborhood(id).is_none() {
            return Ok(false);
        }
        Ok(state.deleted_neighborhoods.insert(id.clone()))
    }
}

#[async_trait]
impl BaseSellerStore for InMemoryStore {
    async fn find_seller(&self, id: &SellerId) -> Result<Option<Seller>> {
        self.check_lookup()?;
        Ok(self.seller(id))
    }

    async fn find_statuses(&self, ids: &[SellerId]) -> Result<Vec<SellerStatusRecord>> {
        self.status_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_lookup()?;
        let mut state = self.write();
        // Same ordering as the SQL query: by id.
        let records: Vec<SellerStatusRecord> = state
            .sellers
            .values()
            .filter(|s| ids.contains(&s.id))
            .map(SellerStatusRecord::from)
            .collect();
        for id in std::mem::take(&mut state.vanishing) {
            state.sellers.remove(&id);
        }
        Ok(records)
    }

    async fn find_with_location(&self, ids: &[SellerId]) -> Result<Vec<SellerWithLocation>> {
        self.projection_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_lookup()?;
        let state = self.read();
        Ok(state
            .sellers
            .values()
            .filter(|s| ids.contains(&s.id))
            .map(|s| Self::with_location(&state, s))
            .collect())
    }

    async fn list_published(
        &self,
        filter: &PublishedSellerFilter,
        params: FindParams,
    ) -> Result<(Vec<SellerWithLocation>, i64)> {
        self.check_lookup()?;
        let state = self.read();
        let mut rows: Vec<SellerWithLocation> = state
            .sellers
            .values()
            .filter(|s| s.is_publishable())
            .filter(|s| filter.city_id.is_none() || s.city_id == filter.city_id)
            .filter(|s| filter.neighborhood_id.is_none() || s.neighborhood_id == filter.neighborhood_id)
            .map(|s| Self::with_location(&state, s))
            .collect();
        rows.sort_by(|a, b| {
            a.seller
                .name
                .cmp(&b.seller.name)
                .then_with(|| a.seller.id.cmp(&b.seller.id))
        });
        Ok(page(rows, params))
    }

    async fn list_ids_after(&self, after: Option<&SellerId>, limit: i64) -> Result<Vec<SellerId>> {
        self.check_lookup()?;
        Ok(self
            .read()
            .sellers
            .keys()
            .filter(|id| after.map_or(true, |a| *id > a))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn ids_in_city(&self, city_id: &CityId) -> Result<Vec<SellerId>> {
        Ok(self
            .read()
            .sellers
            .values()
            .filter(|s| s.city_id.as_ref() == Some(city_id))
            .map(|s| s.id.clone())
            .collect())
    }

    async fn ids_in_neighborhood(&self, neighborhood_id: &NeighborhoodId) -> Result<Vec<SellerId>> {
        Ok(self
            .read()
            .sellers
            .values()
            .filter(|s| s.neighborhood_id.as_ref() == Some(neighborhood_id))
            .map(|s| s.id.clone())
            .collect())
    }

    async fn update_location(
        &self,
        id: &SellerId,
        city_id: Option<&CityId>,
        neighborhood_id: Option<&NeighborhoodId>,
    ) -> Result<Option<Seller>> {
        let mut state = self.write();
        if let Some(c) = city_id.filter(|c| !state.cities.contains_key(*c)) {
            return Err(city_not_found(c).into());
        }
        if let Some(n) = neighborhood_id.filter(|n| !state.neighborhoods.contains_key(*n)) {
            return Err(neighborhood_not_found(n).into());
        }

        let Some(seller) = state.sellers.get_mut(id) else {
            return Ok(None);
        };
        seller.city_id = city_id.cloned();
        seller.neighborhood_id = neighborhood_id.cloned();
        seller.updated_at = Utc::now();
        self.location_writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(seller.clone()))
    }

    async fn update_status(
        &self,
        id: &SellerId,
        approved: Option<bool>,
        subscription_status: Option<SubscriptionStatus>,
    ) -> Result<Option<Seller>> {
        let mut state = self.write();
        Ok(state.sellers.get_mut(id).map(|seller| {
            if let Some(approved) = approved {
                seller.approved = approved;
            }
            if let Some(status) = subscription_status {
                seller.subscription_status = status;
            }
            seller.updated_at = Utc::now();
            seller.clone()
        }))
    }

    async fn clear_city(&self, city_id: &CityId) -> Result<Vec<SellerId>> {
        Ok(self.update_sellers(
            |s| s.city_id.as_ref() == Some(city_id),
            |s| {
                s.city_id = None;
                s.neighborhood_id = None;
            },
        ))
    }

    async fn clear_neighborhood(&self, neighborhood_id: &NeighborhoodId) -> Result<Vec<SellerId>> {
        Ok(self.update_sellers(
            |s| s.neighborhood_id.as_ref() == Some(neighborhood_id),
            |s| s.neighborhood_id = None,
        ))
    }

    async fn clear_mismatched_neighborhood(
        &self,
        neighborhood_id: &NeighborhoodId,
        city_id: &CityId,
    ) -> Result<Vec<SellerId>> {
        Ok(self.update_sellers(
            |s| {
                s.neighborhood_id.as_ref() == Some(neighborhood_id)
                    && s.city_id.as_ref() != Some(city_id)
            },
            |s| s.neighborhood_id = None,
        ))
    }
}

#[async_trait]
impl BaseActorResolver for InMemoryStore {
    async fn resolve_seller_id(&self, member_id: &MemberId) -> Result<Option<SellerId>> {
        Ok(self.read().members.get(member_id).cloned())
    }
}

// =============================================================================
// Mock search index
// =============================================================================

/// One call made against [`MockSearchIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexCall {
    Batch {
        index: IndexType,
        upserts: Vec<SellerId>,
        deletes: Vec<SellerId>,
    },
    Delete {
        index: IndexType,
        ids: Vec<SellerId>,
    },
}

/// Records every call and keeps the resulting documents, so tests can
/// assert on both the calls and the final index membership.
#[derive(Default)]
pub struct MockSearchIndex {
    calls: RwLock<Vec<IndexCall>>,
    documents: RwLock<BTreeMap<SellerId, SearchSeller>>,
    fail: AtomicBool,
}

impl MockSearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail until reset.
    pub fn fail_requests(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<IndexCall> {
        self.calls.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Ids currently in the index, ordered.
    pub fn indexed_ids(&self) -> Vec<SellerId> {
        self.documents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    pub fn document(&self, id: &SellerId) -> Option<SearchSeller> {
        self.documents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    fn record(&self, call: IndexCall) -> Result<()> {
        self.calls
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        if self.fail.load(Ordering::SeqCst) {
            bail!("search index returned 503: Service Unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl BaseSearchIndex for MockSearchIndex {
    async fn batch(
        &self,
        index: IndexType,
        records: &[SearchSeller],
        delete_ids: &[SellerId],
    ) -> Result<()> {
        self.record(IndexCall::Batch {
            index,
            upserts: records.iter().map(|r| r.id.clone()).collect(),
            deletes: delete_ids.to_vec(),
        })?;

        let mut documents = self.documents.write().unwrap_or_else(|e| e.into_inner());
        for record in records {
            documents.insert(record.id.clone(), record.clone());
        }
        for id in delete_ids {
            documents.remove(id);
        }
        Ok(())
    }

    async fn batch_delete(&self, index: IndexType, ids: &[SellerId]) -> Result<()> {
        self.record(IndexCall::Delete {
            index,
            ids: ids.to_vec(),
        })?;

        let mut documents = self.documents.write().unwrap_or_else(|e| e.into_inner());
        for id in ids {
            documents.remove(id);
        }
        Ok(())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// In-memory collaborators plus the `ServerDeps` wired over them.
pub struct TestDependencies {
    pub store: Arc<InMemoryStore>,
    pub search_index: Arc<MockSearchIndex>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            search_index: Arc::new(MockSearchIndex::new()),
        }
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.search_index.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
