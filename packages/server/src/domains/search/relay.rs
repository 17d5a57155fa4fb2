//! Sync relay: reconciles seller state with the search index.
//!
//! ```text
//! ids ─► status filter ─┬─ eligible ──► projection ─┐
//!                       └─ ineligible ──────────────┴─► index.batch(upserts, deletes)
//! ```
//!
//! Index transitions are idempotent per seller, so replaying a sync with the
//! same ids converges to the same membership. Failures are logged with id
//! counts and returned; redelivery is the caller's decision.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use super::models::SearchSeller;
use super::status_filter::filter_sellers_by_status;
use super::IndexType;
use crate::common::{DomainError, DomainResult, SellerId};
use crate::kernel::{BaseSearchIndex, BaseSellerStore};

/// Outcome of one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub upserted: usize,
    pub deleted: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReindexSummary {
    pub pages: usize,
    pub sellers: usize,
    pub upserted: usize,
    pub deleted: usize,
}

pub struct SyncRelay {
    sellers: Arc<dyn BaseSellerStore>,
    index: Arc<dyn BaseSearchIndex>,
}

impl SyncRelay {
    pub fn new(sellers: Arc<dyn BaseSellerStore>, index: Arc<dyn BaseSearchIndex>) -> Self {
        Self { sellers, index }
    }

    /// Upserts the eligible sellers among `ids` and deletes the rest in a
    /// single index batch.
    pub async fn sync_sellers(&self, ids: &[SellerId]) -> DomainResult<SyncSummary> {
        if ids.is_empty() {
            return Ok(SyncSummary::default());
        }

        let partition = match filter_sellers_by_status(ids, self.sellers.as_ref()).await {
            Ok(partition) => partition,
            Err(e) => {
                error!(seller_count = ids.len(), ids = %join_ids(ids), error = %e, "Search sync status lookup failed");
                return Err(e);
            }
        };

        debug!(
            seller_count = ids.len(),
            upsert_count = partition.eligible.len(),
            delete_count = partition.ineligible.len(),
            "Search sync: processing sellers"
        );

        let mut deletes = partition.ineligible;
        let records: Vec<SearchSeller> = if partition.eligible.is_empty() {
            Vec::new()
        } else {
            let rows = match self.sellers.find_with_location(&partition.eligible).await {
                Ok(rows) => rows,
                Err(e) => {
                    error!(
                        upsert_count = partition.eligible.len(),
                        ids = %join_ids(&partition.eligible),
                        error = %e,
                        "Search sync projection lookup failed"
                    );
                    return Err(e.into());
                }
            };
            let records: Vec<SearchSeller> = rows.into_iter().map(SearchSeller::from).collect();

            // Deleted between the status and projection lookups.
            let vanished: Vec<SellerId> = {
                let projected: HashSet<&SellerId> = records.iter().map(|r| &r.id).collect();
                partition
                    .eligible
                    .iter()
                    .filter(|id| !projected.contains(id))
                    .cloned()
                    .collect()
            };
            if !vanished.is_empty() {
                debug!(ids = %join_ids(&vanished), "Search sync: eligible sellers no longer resolve");
                deletes.extend(vanished);
            }
            records
        };

        if let Err(e) = self
            .index
            .batch(IndexType::Seller, &records, &deletes)
            .await
        {
            error!(
                upsert_count = records.len(),
                delete_count = deletes.len(),
                ids = %join_ids(ids),
                error = %e,
                "Search sync failed"
            );
            return Err(DomainError::Upstream(e));
        }

        debug!(
            upserted = records.len(),
            deleted = deletes.len(),
            "Search sync: batch applied"
        );

        Ok(SyncSummary {
            upserted: records.len(),
            deleted: deletes.len(),
        })
    }

    /// Removes `ids` from the index without looking them up.
    pub async fn delete_sellers(&self, ids: &[SellerId]) -> DomainResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        if let Err(e) = self.index.batch_delete(IndexType::Seller, ids).await {
            error!(delete_count = ids.len(), ids = %join_ids(ids), error = %e, "Search delete failed");
            return Err(DomainError::Upstream(e));
        }

        debug!(deleted = ids.len(), "Search sync: sellers deleted");
        Ok(())
    }

    /// Walks every seller id in pages of `page_size` and syncs each page.
    pub async fn reindex_all_sellers(&self, page_size: i64) -> DomainResult<ReindexSummary> {
        if page_size < 1 {
            return Err(DomainError::validation("page_size must be at least 1"));
        }

        let mut summary = ReindexSummary::default();
        let mut after: Option<SellerId> = None;

        loop {
            let ids = self.sellers.list_ids_after(after.as_ref(), page_size).await?;
            let Some(last) = ids.last().cloned() else {
                break;
            };

            let page = self.sync_sellers(&ids).await?;
            summary.pages += 1;
            summary.sellers += ids.len();
            summary.upserted += page.upserted;
            summary.deleted += page.deleted;

            info!(page = summary.pages, sellers = summary.sellers, "Reindex progress");

            if (ids.len() as i64) < page_size {
                break;
            }
            after = Some(last);
        }

        Ok(summary)
    }
}

fn join_ids(ids: &[SellerId]) -> String {
    ids.iter().map(SellerId::as_str).collect::<Vec<_>>().join(", ")
}
