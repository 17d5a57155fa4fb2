use thiserror::Error;

/// Errors surfaced by marketplace operations.
///
/// Every variant maps onto one outcome an outer surface can report:
/// malformed input, a broken reference between records, a missing record,
/// or an infrastructure failure.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed input, rejected before any lookup runs.
    #[error("{0}")]
    Validation(String),

    /// Input is well-formed but references records that do not exist or do
    /// not belong together.
    #[error("{0}")]
    InvalidData(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The search index (or another remote service) failed.
    #[error("Upstream error: {0:#}")]
    Upstream(anyhow::Error),

    #[error("Internal error: {0:#}")]
    Internal(anyhow::Error),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// HTTP-equivalent status for whichever surface reports the error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidData(_) => 400,
            Self::NotFound(_) => 404,
            Self::Upstream(_) => 502,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid_request",
            Self::InvalidData(_) => "invalid_data",
            Self::NotFound(_) => "not_found",
            Self::Database(_) => "database_error",
            Self::Upstream(_) => "upstream_error",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

/// Store traits speak `anyhow`; a store that already classified its failure
/// (for example a foreign-key violation) wraps a `DomainError`, which is
/// recovered here instead of being flattened into `Internal`.
impl From<anyhow::Error> for DomainError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DomainError>() {
            Ok(domain) => domain,
            Err(err) => match err.downcast::<sqlx::Error>() {
                Ok(db) => Self::Database(db),
                Err(err) => Self::Internal(err),
            },
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(DomainError::validation("x").status_code(), 400);
        assert_eq!(DomainError::invalid_data("x").status_code(), 400);
        assert_eq!(DomainError::not_found("x").status_code(), 404);
        assert_eq!(DomainError::Upstream(anyhow::anyhow!("down")).status_code(), 502);
        assert!(DomainError::not_found("x").is_client_error());
        assert!(!DomainError::Internal(anyhow::anyhow!("boom")).is_client_error());
    }

    #[test]
    fn classified_errors_survive_anyhow() {
        let wrapped: anyhow::Error = DomainError::invalid_data("City with ID city_1 not found").into();
        let back = DomainError::from(wrapped);
        assert!(matches!(back, DomainError::InvalidData(ref m) if m.contains("city_1")));
    }

    #[test]
    fn sqlx_errors_become_database_errors() {
        let wrapped = anyhow::Error::from(sqlx::Error::RowNotFound);
        assert!(matches!(DomainError::from(wrapped), DomainError::Database(_)));

        let other = DomainError::from(anyhow::anyhow!("socket closed"));
        assert_eq!(other.kind(), "internal_error");
    }
}
