//! Credential-free description of the database connection, for health
//! output and startup logs.

use serde::Serialize;
use url::Url;

const DEFAULT_PG_PORT: u16 = 5432;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbConnectionInfo {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub ssl_enabled: bool,
}

impl DbConnectionInfo {
    /// Returns `None` when the URL cannot be parsed. User and password are
    /// never copied out of the URL.
    pub fn parse(database_url: &str, ssl_enabled: bool) -> Option<Self> {
        let url = match Url::parse(database_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse DATABASE_URL");
                return None;
            }
        };

        Some(Self {
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port().unwrap_or(DEFAULT_PG_PORT),
            database: url.path().trim_start_matches('/').to_string(),
            ssl_enabled,
        })
    }

    pub fn describe(info: Option<&Self>) -> String {
        match info {
            Some(info) => format!(
                "Database: {} | Host: {}:{} | SSL: {}",
                info.database,
                info.host,
                info.port,
                if info.ssl_enabled { "enabled" } else { "disabled" }
            ),
            None => "Database connection info not available".to_string(),
        }
    }
}
