//! In-process dispatch of seller events.
//!
//! Handlers are registered per [`EventKind`]. Publishing an event runs every
//! handler for its kind in registration order; events a handler returns are
//! queued and dispatched after the current one (FIFO), so cascades such as
//! `SellerUpdated → SellersChanged` complete before `publish` returns.
//!
//! # Guarantees
//!
//! - **Stop on first error**: the failing handler's subscriber id is logged
//!   and the error returned to the publisher. Nothing is retried.
//! - **In-memory only**: redelivery belongs to whoever calls `publish`.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error};

use crate::domains::sellers::events::{EventKind, SellerEvent};

/// A subscriber on the bus.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Stable name used in logs.
    fn subscriber_id(&self) -> &'static str;

    /// Handles one event and returns follow-up events.
    async fn handle(&self, event: &SellerEvent) -> Result<Vec<SellerEvent>>;
}

#[derive(Default, Clone)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<Arc<dyn EventHandler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: EventKind, handler: Arc<dyn EventHandler>) -> &mut Self {
        self.handlers.entry(kind).or_default().push(handler);
        self
    }

    /// Subscriber ids registered for `kind`, in dispatch order.
    pub fn subscribers(&self, kind: EventKind) -> Vec<&'static str> {
        self.handlers
            .get(&kind)
            .map(|handlers| handlers.iter().map(|h| h.subscriber_id()).collect())
            .unwrap_or_default()
    }

    pub async fn publish(&self, event: SellerEvent) -> Result<()> {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let Some(handlers) = self.handlers.get(&event.kind()) else {
                debug!(event = event.name(), "No subscribers for event");
                continue;
            };

            for handler in handlers {
                debug!(
                    event = event.name(),
                    subscriber_id = handler.subscriber_id(),
                    id_count = event.id_count(),
                    "Dispatching event"
                );

                match handler.handle(&event).await {
                    Ok(follow_ups) => queue.extend(follow_ups),
                    Err(e) => {
                        error!(
                            event = event.name(),
                            subscriber_id = handler.subscriber_id(),
                            error = %e,
                            "Event handler failed"
                        );
                        return Err(e);
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SellerId;
    use std::sync::Mutex;

    struct Recorder {
        id: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
        follow_up: Option<SellerEvent>,
        fail: bool,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        fn subscriber_id(&self) -> &'static str {
            self.id
        }

        async fn handle(&self, event: &SellerEvent) -> Result<Vec<SellerEvent>> {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.id, event.name()));
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(self.follow_up.clone().into_iter().collect())
        }
    }

    fn seller(id: &str) -> SellerId {
        SellerId::parse(id).unwrap()
    }

    #[tokio::test]
    async fn follow_up_events_run_after_current_handlers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.subscribe(
            EventKind::SellerUpdated,
            Arc::new(Recorder {
                id: "first",
                seen: seen.clone(),
                follow_up: Some(SellerEvent::SellersChanged {
                    ids: vec![seller("sel_a")],
                }),
                fail: false,
            }),
        )
        .subscribe(
            EventKind::SellerUpdated,
            Arc::new(Recorder {
                id: "second",
                seen: seen.clone(),
                follow_up: None,
                fail: false,
            }),
        )
        .subscribe(
            EventKind::SellersChanged,
            Arc::new(Recorder {
                id: "changed",
                seen: seen.clone(),
                follow_up: None,
                fail: false,
            }),
        );

        bus.publish(SellerEvent::SellerUpdated { id: seller("sel_a") })
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "first:seller.updated",
                "second:seller.updated",
                "changed:search.sellers.changed",
            ]
        );
    }

    #[tokio::test]
    async fn first_error_stops_dispatch() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.subscribe(
            EventKind::SellersDeleted,
            Arc::new(Recorder {
                id: "failing",
                seen: seen.clone(),
                follow_up: None,
                fail: true,
            }),
        )
        .subscribe(
            EventKind::SellersDeleted,
            Arc::new(Recorder {
                id: "never",
                seen: seen.clone(),
                follow_up: None,
                fail: false,
            }),
        );

        let result = bus
            .publish(SellerEvent::SellersDeleted {
                ids: vec![seller("sel_a")],
            })
            .await;

        assert!(result.is_err());
        assert_eq!(*seen.lock().unwrap(), vec!["failing:search.sellers.deleted"]);
    }

    #[tokio::test]
    async fn events_without_subscribers_are_dropped() {
        let bus = EventBus::new();
        bus.publish(SellerEvent::SellersChanged { ids: vec![] })
            .await
            .unwrap();
        assert!(bus.subscribers(EventKind::SellersChanged).is_empty());
    }
}
