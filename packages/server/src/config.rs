use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

/// Managed Postgres providers that only accept TLS connections.
const TLS_HOST_SUFFIXES: &[&str] = &[
    ".railway.app",
    ".railway.internal",
    ".herokuapp.com",
    ".rds.amazonaws.com",
    ".postgres.database.azure.com",
    ".supabase.co",
];

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_pool_min: u32,
    pub db_pool_max: u32,
    pub database_ssl: bool,
    /// Absent when neither Algolia credential is set; only index commands
    /// need it.
    pub algolia: Option<AlgoliaConfig>,
}

#[derive(Debug, Clone)]
pub struct AlgoliaConfig {
    pub app_id: String,
    pub api_key: String,
    pub seller_index: String,
    pub batch_size: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let db_pool_min = parse_or(&lookup, "DB_POOL_MIN", 0u32)?;
        let db_pool_max = parse_or(&lookup, "DB_POOL_MAX", 5u32)?;
        if db_pool_min > db_pool_max {
            bail!("DB_POOL_MIN ({db_pool_min}) cannot be greater than DB_POOL_MAX ({db_pool_max})");
        }

        let database_ssl = requires_tls(&database_url, &lookup);

        let batch_size = parse_or(&lookup, "ALGOLIA_BATCH_SIZE", algolia::DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            bail!("ALGOLIA_BATCH_SIZE must be at least 1");
        }

        let algolia = match (lookup("ALGOLIA_APP_ID"), lookup("ALGOLIA_API_KEY")) {
            (Some(app_id), Some(api_key)) => Some(AlgoliaConfig {
                app_id,
                api_key,
                seller_index: lookup("ALGOLIA_SELLER_INDEX").unwrap_or_else(|| "seller".to_string()),
                batch_size,
            }),
            (None, None) => None,
            _ => bail!("ALGOLIA_APP_ID and ALGOLIA_API_KEY must be set together"),
        };

        Ok(Self {
            database_url,
            db_pool_min,
            db_pool_max,
            database_ssl,
            algolia,
        })
    }

    pub fn algolia(&self) -> Result<&AlgoliaConfig> {
        self.algolia
            .as_ref()
            .context("ALGOLIA_APP_ID and ALGOLIA_API_KEY must be set")
    }

    /// Connection options from `DATABASE_URL`, with TLS required when
    /// `database_ssl` is set.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        let options = PgConnectOptions::from_str(&self.database_url)
            .context("DATABASE_URL is not a valid Postgres URL")?;
        if self.database_ssl {
            return Ok(options.ssl_mode(PgSslMode::Require));
        }
        Ok(options)
    }

    /// Pool that connects on first use, so connection failures surface from
    /// the query that needed the connection.
    pub fn lazy_pool(&self) -> Result<PgPool> {
        Ok(PgPoolOptions::new()
            .min_connections(self.db_pool_min)
            .max_connections(self.db_pool_max)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy_with(self.connect_options()?))
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} must be a valid number, got: {raw}")),
        None => Ok(default),
    }
}

/// Explicit `DATABASE_SSL=true` wins, then a Railway deployment, then
/// production, then host detection.
fn requires_tls(database_url: &str, lookup: &impl Fn(&str) -> Option<String>) -> bool {
    let set = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if set("DATABASE_SSL").as_deref() == Some("true") {
        return true;
    }
    if set("RAILWAY_ENVIRONMENT").is_some() || set("RAILWAY_PROJECT_ID").is_some() {
        return true;
    }
    if set("APP_ENV").as_deref() == Some("production") {
        return true;
    }

    match Url::parse(database_url) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
            TLS_HOST_SUFFIXES.iter().any(|suffix| host.ends_with(suffix))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse DATABASE_URL for TLS detection, assuming no TLS");
            false
        }
    }
}
