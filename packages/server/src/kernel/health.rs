use std::time::Duration;

use serde::Serialize;
use sqlx::PgPool;

use crate::common::utils::DbConnectionInfo;

const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub info: Option<DbConnectionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

/// Database connectivity check
///
/// Runs `SELECT 1` with a 5s timeout. The connection info in the report
/// never carries credentials.
pub async fn check_health(pool: &PgPool, database_url: &str, ssl_enabled: bool) -> HealthReport {
    let info = DbConnectionInfo::parse(database_url, ssl_enabled);

    let error = match tokio::time::timeout(QUERY_TIMEOUT, sqlx::query("SELECT 1").execute(pool))
        .await
    {
        Ok(Ok(_)) => None,
        Ok(Err(e)) => Some(format!("Query failed: {}", e)),
        Err(_) => Some(format!("Query timeout (>{}s)", QUERY_TIMEOUT.as_secs())),
    };

    HealthReport {
        status: if error.is_none() {
            HealthStatus::Ok
        } else {
            HealthStatus::Error
        },
        database: DatabaseHealth {
            connected: error.is_none(),
            info,
            error,
        },
    }
}
