//! Search domain - keeps the external seller index in step with seller state
//!
//! Architecture:
//!   seller writes → SellerUpdated → effects → SyncRelay → BaseSearchIndex

pub mod effects;
pub mod index_type;
pub mod models;
pub mod relay;
pub mod status_filter;

pub use effects::register_search_handlers;
pub use index_type::IndexType;
pub use models::SearchSeller;
pub use relay::{ReindexSummary, SyncRelay, SyncSummary};
pub use status_filter::{filter_sellers_by_status, partition_by_status, StatusPartition};
