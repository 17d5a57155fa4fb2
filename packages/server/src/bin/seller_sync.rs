//! CLI for schema migrations and search index maintenance
//!
//! Prints JSON results on stdout; logs go to stderr.

use std::sync::Arc;

use algolia::{AlgoliaOptions, AlgoliaService};
use anyhow::{Context, Result};
use b2c_core::common::SellerId;
use b2c_core::kernel::{check_health, AlgoliaAdapter, ServerDeps};
use b2c_core::Config;
use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "seller_sync")]
#[command(about = "Seller search index maintenance")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run pending SQL migrations
    Migrate,

    /// Re-evaluate index membership of the given sellers
    Sync {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Remove the given sellers from the index
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Sync every seller, page by page
    Reindex {
        #[arg(long, default_value_t = 500)]
        page_size: i64,
    },

    /// Check database connectivity
    Health,
}

fn output<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,b2c_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let pool = config.lazy_pool()?;

    match cli.command {
        Commands::Migrate => cmd_migrate(&pool).await,
        Commands::Sync { ids } => cmd_sync(&config, pool, &ids).await,
        Commands::Delete { ids } => cmd_delete(&config, pool, &ids).await,
        Commands::Reindex { page_size } => cmd_reindex(&config, pool, page_size).await,
        Commands::Health => cmd_health(&config, &pool).await,
    }
}

fn server_deps(config: &Config, pool: PgPool) -> Result<ServerDeps> {
    let algolia = config.algolia()?;
    let mut options = AlgoliaOptions::new(&algolia.app_id, &algolia.api_key);
    options.batch_size = algolia.batch_size;
    let adapter = AlgoliaAdapter::new(
        Arc::new(AlgoliaService::new(options)),
        &algolia.seller_index,
    );
    Ok(ServerDeps::from_pool(pool, Arc::new(adapter)))
}

fn parse_ids(raw: &[String]) -> Result<Vec<SellerId>> {
    raw.iter()
        .map(|id| SellerId::parse(id).with_context(|| format!("Invalid seller id: {:?}", id)))
        .collect()
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_migrate(pool: &PgPool) -> Result<()> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    output(&serde_json::json!({ "success": true }))
}

async fn cmd_sync(config: &Config, pool: PgPool, raw_ids: &[String]) -> Result<()> {
    let ids = parse_ids(raw_ids)?;
    let deps = server_deps(config, pool)?;
    let summary = deps.relay.sync_sellers(&ids).await?;
    output(&summary)
}

async fn cmd_delete(config: &Config, pool: PgPool, raw_ids: &[String]) -> Result<()> {
    let ids = parse_ids(raw_ids)?;
    let deps = server_deps(config, pool)?;
    deps.relay.delete_sellers(&ids).await?;
    output(&serde_json::json!({ "deleted": ids.len() }))
}

async fn cmd_reindex(config: &Config, pool: PgPool, page_size: i64) -> Result<()> {
    let deps = server_deps(config, pool)?;
    let summary = deps.relay.reindex_all_sellers(page_size).await?;
    tracing::info!(
        pages = summary.pages,
        sellers = summary.sellers,
        upserted = summary.upserted,
        deleted = summary.deleted,
        "Reindex complete"
    );
    output(&summary)
}

async fn cmd_health(config: &Config, pool: &PgPool) -> Result<()> {
    let report = check_health(pool, &config.database_url, config.database_ssl).await;
    output(&report)?;
    if !report.is_healthy() {
        std::process::exit(1);
    }
    Ok(())
}
