//! Search index subscribers.
//!
//! Cascade flow:
//!   SellerUpdated  → SellersChanged{[id]}
//!   SellersChanged → sync relay (terminal)
//!   SellersDeleted → index batch delete (terminal)

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::relay::SyncRelay;
use crate::domains::sellers::events::{EventKind, SellerEvent};
use crate::kernel::{EventBus, EventHandler};

pub const SELLER_UPDATED_SEARCH_HANDLER: &str = "seller-updated-search-handler";
pub const SEARCH_SELLERS_CHANGED_HANDLER: &str = "search-sellers-changed-handler";
pub const SEARCH_SELLERS_DELETED_HANDLER: &str = "search-sellers-deleted-handler";

/// Turns a single-seller update into an index re-evaluation.
pub struct SellerUpdatedHandler;

#[async_trait]
impl EventHandler for SellerUpdatedHandler {
    fn subscriber_id(&self) -> &'static str {
        SELLER_UPDATED_SEARCH_HANDLER
    }

    async fn handle(&self, event: &SellerEvent) -> Result<Vec<SellerEvent>> {
        match event {
            SellerEvent::SellerUpdated { id } => Ok(vec![SellerEvent::SellersChanged {
                ids: vec![id.clone()],
            }]),
            _ => Ok(Vec::new()),
        }
    }
}

pub struct SellersChangedHandler {
    relay: Arc<SyncRelay>,
}

#[async_trait]
impl EventHandler for SellersChangedHandler {
    fn subscriber_id(&self) -> &'static str {
        SEARCH_SELLERS_CHANGED_HANDLER
    }

    async fn handle(&self, event: &SellerEvent) -> Result<Vec<SellerEvent>> {
        if let SellerEvent::SellersChanged { ids } = event {
            self.relay.sync_sellers(ids).await?;
        }
        Ok(Vec::new())
    }
}

pub struct SellersDeletedHandler {
    relay: Arc<SyncRelay>,
}

#[async_trait]
impl EventHandler for SellersDeletedHandler {
    fn subscriber_id(&self) -> &'static str {
        SEARCH_SELLERS_DELETED_HANDLER
    }

    async fn handle(&self, event: &SellerEvent) -> Result<Vec<SellerEvent>> {
        if let SellerEvent::SellersDeleted { ids } = event {
            self.relay.delete_sellers(ids).await?;
        }
        Ok(Vec::new())
    }
}

/// Wires the search subscribers onto `bus`.
pub fn register_search_handlers(bus: &mut EventBus, relay: Arc<SyncRelay>) {
    bus.subscribe(EventKind::SellerUpdated, Arc::new(SellerUpdatedHandler))
        .subscribe(
            EventKind::SellersChanged,
            Arc::new(SellersChangedHandler {
                relay: relay.clone(),
            }),
        )
        .subscribe(
            EventKind::SellersDeleted,
            Arc::new(SellersDeletedHandler { relay }),
        );
}
