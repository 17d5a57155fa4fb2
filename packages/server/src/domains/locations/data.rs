use serde::{Deserialize, Serialize};

use crate::common::{CityId, DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCityInput {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCityInput {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateNeighborhoodInput {
    pub name: String,
    pub city_id: CityId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateNeighborhoodInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city_id: Option<CityId>,
}

/// Response of a soft delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedRecord {
    pub id: String,
    pub deleted: bool,
}

impl DeletedRecord {
    pub fn new(id: impl ToString) -> Self {
        Self {
            id: id.to_string(),
            deleted: true,
        }
    }
}

/// Trims `raw` and rejects an empty result.
pub fn clean_name(raw: &str, field: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(name.to_string())
}
