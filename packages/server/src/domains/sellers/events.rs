use serde::{Deserialize, Serialize};

use crate::common::SellerId;

/// Seller fact events.
///
/// `SellerUpdated` is emitted by seller writes. The two `Sellers*` events
/// drive the search index and may be delivered more than once, in any
/// order; their handlers rely on idempotent index operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SellerEvent {
    /// Location or approval/subscription fields of one seller changed
    SellerUpdated { id: SellerId },

    /// Index membership of these sellers must be re-evaluated
    SellersChanged { ids: Vec<SellerId> },

    /// These sellers are gone and must leave the index
    SellersDeleted { ids: Vec<SellerId> },
}

/// Dispatch key for [`SellerEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SellerUpdated,
    SellersChanged,
    SellersDeleted,
}

impl SellerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::SellerUpdated { .. } => EventKind::SellerUpdated,
            Self::SellersChanged { .. } => EventKind::SellersChanged,
            Self::SellersDeleted { .. } => EventKind::SellersDeleted,
        }
    }

    /// Wire name, as other services subscribe to it.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn id_count(&self) -> usize {
        match self {
            Self::SellerUpdated { .. } => 1,
            Self::SellersChanged { ids } | Self::SellersDeleted { ids } => ids.len(),
        }
    }
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::SellerUpdated => "seller.updated",
            Self::SellersChanged => "search.sellers.changed",
            Self::SellersDeleted => "search.sellers.deleted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = SellerEvent::SellersChanged {
            ids: vec![SellerId::parse("sel_a").unwrap()],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "sellers_changed");
        assert_eq!(json["ids"][0], "sel_a");
    }

    #[test]
    fn kind_and_name_follow_variant() {
        let event = SellerEvent::SellerUpdated {
            id: SellerId::parse("sel_a").unwrap(),
        };
        assert_eq!(event.kind(), EventKind::SellerUpdated);
        assert_eq!(event.name(), "seller.updated");
        assert_eq!(event.id_count(), 1);
    }
}
