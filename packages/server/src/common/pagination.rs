//! Offset pagination for list operations.

use serde::{Deserialize, Serialize};

use super::error::{DomainError, DomainResult};

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 1000;

/// `offset` / `limit` query parameters. Missing values take the defaults
/// (`0` / `50`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FindParams {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for FindParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl FindParams {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    pub fn validate(self) -> DomainResult<Self> {
        if self.offset < 0 {
            return Err(DomainError::validation("offset must not be negative"));
        }
        if self.limit < 1 || self.limit > MAX_LIMIT {
            return Err(DomainError::validation(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok(self)
    }
}

/// One page of results with the total row count.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: i64,
    pub offset: i64,
    pub limit: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, count: i64, params: FindParams) -> Self {
        Self {
            items,
            count,
            offset: params.offset,
            limit: params.limit,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            count: self.count,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

/// Applies `params` to an already-filtered, already-ordered list.
pub fn paginate<T: Clone>(rows: &[T], params: FindParams) -> Page<T> {
    let start = usize::try_from(params.offset).unwrap_or(usize::MAX).min(rows.len());
    let take = usize::try_from(params.limit).unwrap_or(0);
    let items = rows.iter().skip(start).take(take).cloned().collect();
    Page::new(items, rows.len() as i64, params)
}
