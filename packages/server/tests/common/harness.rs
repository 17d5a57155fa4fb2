//! Test harnesses.
//!
//! `TestHarness` wires `ServerDeps` over the in-memory store and the mock
//! search index; every test gets a fresh one. `PgHarness` runs the same
//! dependencies against a shared Postgres container (started once, migrations
//! run once) and needs Docker.

use std::sync::Arc;

use anyhow::{Context, Result};
use b2c_core::kernel::{InMemoryStore, MockSearchIndex, ServerDeps, TestDependencies};
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// In-memory harness
// ============================================================================

pub struct TestHarness {
    pub deps: ServerDeps,
    pub store: Arc<InMemoryStore>,
    pub index: Arc<MockSearchIndex>,
}

impl TestHarness {
    pub fn new() -> Self {
        init_tracing();
        let test_deps = TestDependencies::new();
        Self {
            deps: test_deps.server_deps(),
            store: test_deps.store,
            index: test_deps.search_index,
        }
    }
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }
}

// ============================================================================
// Postgres harness
// ============================================================================

/// Shared container that persists across all Postgres tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        init_tracing();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

pub struct PgHarness {
    pub db_pool: PgPool,
    pub deps: ServerDeps,
    pub index: Arc<MockSearchIndex>,
}

impl PgHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;
        let index = Arc::new(MockSearchIndex::new());
        let deps = ServerDeps::from_pool(db_pool.clone(), index.clone());

        Ok(Self {
            db_pool,
            deps,
            index,
        })
    }
}

impl AsyncTestContext for PgHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create Postgres harness")
    }
}
