//! Splits seller ids by index eligibility.

use std::collections::HashSet;

use crate::common::{DomainResult, SellerId};
use crate::domains::sellers::models::SellerStatusRecord;
use crate::kernel::BaseSellerStore;

/// Disjoint result of [`partition_by_status`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusPartition {
    /// Approved with an active subscription; to be upserted.
    pub eligible: Vec<SellerId>,
    /// Everything else, including ids that no longer resolve; to be deleted.
    pub ineligible: Vec<SellerId>,
}

impl StatusPartition {
    pub fn is_empty(&self) -> bool {
        self.eligible.is_empty() && self.ineligible.is_empty()
    }
}

/// Partitions the requested ids using the status records returned for them.
///
/// Resolved ids keep the order of `records`. Requested ids without a record
/// follow in request order in `ineligible`. Duplicates collapse to their
/// first occurrence and records that were not requested are ignored.
pub fn partition_by_status(
    requested: &[SellerId],
    records: &[SellerStatusRecord],
) -> StatusPartition {
    let wanted: HashSet<&SellerId> = requested.iter().collect();
    let mut placed: HashSet<&SellerId> = HashSet::with_capacity(requested.len());
    let mut partition = StatusPartition::default();

    for record in records {
        if !wanted.contains(&record.id) || !placed.insert(&record.id) {
            continue;
        }
        if record.is_publishable() {
            partition.eligible.push(record.id.clone());
        } else {
            partition.ineligible.push(record.id.clone());
        }
    }

    for id in requested {
        if placed.insert(id) {
            partition.ineligible.push(id.clone());
        }
    }

    partition
}

/// Looks up the status projection for `ids` and partitions it.
pub async fn filter_sellers_by_status(
    ids: &[SellerId],
    sellers: &dyn BaseSellerStore,
) -> DomainResult<StatusPartition> {
    if ids.is_empty() {
        return Ok(StatusPartition::default());
    }
    let records = sellers.find_statuses(ids).await?;
    Ok(partition_by_status(ids, &records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::sellers::models::SubscriptionStatus;

    fn id(raw: &str) -> SellerId {
        SellerId::parse(raw).unwrap()
    }

    fn record(raw: &str, approved: bool, status: SubscriptionStatus) -> SellerStatusRecord {
        SellerStatusRecord {
            id: id(raw),
            approved,
            subscription_status: status,
        }
    }

    #[test]
    fn only_approved_and_active_are_eligible() {
        let requested = [id("sel_a"), id("sel_b"), id("sel_c"), id("sel_d")];
        let records = [
            record("sel_a", true, SubscriptionStatus::Active),
            record("sel_b", false, SubscriptionStatus::Active),
            record("sel_c", true, SubscriptionStatus::Inactive),
            record("sel_d", true, SubscriptionStatus::Canceled),
        ];

        let partition = partition_by_status(&requested, &records);

        assert_eq!(partition.eligible, vec![id("sel_a")]);
        assert_eq!(partition.ineligible, vec![id("sel_b"), id("sel_c"), id("sel_d")]);
    }

    #[test]
    fn order_follows_lookup_not_request() {
        let requested = [id("sel_b"), id("sel_a")];
        let records = [
            record("sel_a", true, SubscriptionStatus::Active),
            record("sel_b", true, SubscriptionStatus::Active),
        ];

        let partition = partition_by_status(&requested, &records);

        assert_eq!(partition.eligible, vec![id("sel_a"), id("sel_b")]);
        assert!(partition.ineligible.is_empty());
    }

    #[test]
    fn missing_ids_are_ineligible_after_resolved_ones() {
        let requested = [id("sel_gone"), id("sel_a"), id("sel_b")];
        let records = [
            record("sel_a", false, SubscriptionStatus::Active),
            record("sel_b", true, SubscriptionStatus::Active),
        ];

        let partition = partition_by_status(&requested, &records);

        assert_eq!(partition.eligible, vec![id("sel_b")]);
        assert_eq!(partition.ineligible, vec![id("sel_a"), id("sel_gone")]);
    }

    #[test]
    fn every_requested_id_lands_in_exactly_one_set() {
        let requested = [id("sel_a"), id("sel_a"), id("sel_b"), id("sel_x")];
        let records = [
            record("sel_a", true, SubscriptionStatus::Active),
            record("sel_a", true, SubscriptionStatus::Active),
            record("sel_b", false, SubscriptionStatus::Inactive),
            record("sel_unrequested", true, SubscriptionStatus::Active),
        ];

        let partition = partition_by_status(&requested, &records);

        let mut all: Vec<_> = partition
            .eligible
            .iter()
            .chain(partition.ineligible.iter())
            .cloned()
            .collect();
        all.sort();
        assert_eq!(all, vec![id("sel_a"), id("sel_b"), id("sel_x")]);
        assert!(partition
            .eligible
            .iter()
            .all(|e| !partition.ineligible.contains(e)));
    }

    #[test]
    fn empty_request_is_empty_partition() {
        assert!(partition_by_status(&[], &[]).is_empty());
    }
}
