//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod event_bus;
pub mod health;
pub mod pg_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::{AlgoliaAdapter, ServerDeps};
pub use event_bus::{EventBus, EventHandler};
pub use health::{check_health, HealthReport, HealthStatus};
pub use pg_store::PgStore;
pub use test_dependencies::{InMemoryStore, IndexCall, MockSearchIndex, TestDependencies};
pub use traits::*;
