//! Server dependencies for actions (using traits for testability)
//!
//! This module provides the central dependency container used by all domain
//! actions. Stores and the search index sit behind trait objects so tests can
//! swap in the in-memory versions.

use std::sync::Arc;

use algolia::AlgoliaService;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use crate::common::SellerId;
use crate::domains::search::{register_search_handlers, IndexType, SearchSeller, SyncRelay};
use crate::domains::sellers::events::SellerEvent;
use crate::kernel::{
    BaseActorResolver, BaseLocationStore, BaseSearchIndex, BaseSellerStore, EventBus, PgStore,
};

// =============================================================================
// AlgoliaService Adapter (implements BaseSearchIndex trait)
// =============================================================================

/// Wrapper around AlgoliaService that implements BaseSearchIndex trait
pub struct AlgoliaAdapter {
    service: Arc<AlgoliaService>,
    seller_index: String,
}

impl AlgoliaAdapter {
    pub fn new(service: Arc<AlgoliaService>, seller_index: impl Into<String>) -> Self {
        Self {
            service,
            seller_index: seller_index.into(),
        }
    }

    fn index_name(&self, index: IndexType) -> &str {
        match index {
            IndexType::Seller => &self.seller_index,
        }
    }
}

fn object_ids(ids: &[SellerId]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[async_trait]
impl BaseSearchIndex for AlgoliaAdapter {
    async fn batch(
        &self,
        index: IndexType,
        records: &[SearchSeller],
        delete_ids: &[SellerId],
    ) -> Result<()> {
        self.service
            .batch(self.index_name(index), records, &object_ids(delete_ids))
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    async fn batch_delete(&self, index: IndexType, ids: &[SellerId]) -> Result<()> {
        self.service
            .delete_objects(self.index_name(index), &object_ids(ids))
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Dependencies handed to every action (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub locations: Arc<dyn BaseLocationStore>,
    pub sellers: Arc<dyn BaseSellerStore>,
    pub actors: Arc<dyn BaseActorResolver>,
    pub search_index: Arc<dyn BaseSearchIndex>,
    pub relay: Arc<SyncRelay>,
    /// Search subscribers are registered on construction.
    pub events: Arc<EventBus>,
}

impl ServerDeps {
    pub fn new(
        locations: Arc<dyn BaseLocationStore>,
        sellers: Arc<dyn BaseSellerStore>,
        actors: Arc<dyn BaseActorResolver>,
        search_index: Arc<dyn BaseSearchIndex>,
    ) -> Self {
        let relay = Arc::new(SyncRelay::new(sellers.clone(), search_index.clone()));

        let mut events = EventBus::new();
        register_search_handlers(&mut events, relay.clone());

        Self {
            locations,
            sellers,
            actors,
            search_index,
            relay,
            events: Arc::new(events),
        }
    }

    /// Postgres-backed stores with the given search index.
    pub fn from_pool(pool: PgPool, search_index: Arc<dyn BaseSearchIndex>) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self::new(store.clone(), store.clone(), store, search_index)
    }

    /// Publishes `event` after a committed write.
    ///
    /// The write cannot be undone at this point, so a failing subscriber is
    /// logged and the event dropped; a reindex repairs the index later.
    /// Events without seller ids are not published.
    pub async fn emit(&self, event: SellerEvent) {
        if event.id_count() == 0 {
            return;
        }
        let name = event.name();
        if let Err(e) = self.events.publish(event).await {
            warn!(event = name, error = %e, "Event delivery failed after write");
        }
    }
}
