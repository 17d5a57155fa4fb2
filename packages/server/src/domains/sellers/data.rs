use serde::Deserialize;

use super::models::{PublishedSellerFilter, SubscriptionStatus};
use crate::common::{CityId, FindParams, NeighborhoodId};

/// Body of the admin and vendor location updates. `null` clears a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetLocationInput {
    pub city_id: Option<CityId>,
    pub neighborhood_id: Option<NeighborhoodId>,
}

impl SetLocationInput {
    pub fn new(city_id: Option<CityId>, neighborhood_id: Option<NeighborhoodId>) -> Self {
        Self {
            city_id,
            neighborhood_id,
        }
    }

    pub fn cleared() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSellerStatusInput {
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(default)]
    pub subscription_status: Option<SubscriptionStatus>,
}

/// Query string of the public seller listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListSellersQuery {
    #[serde(default)]
    pub city_id: Option<CityId>,
    #[serde(default)]
    pub neighborhood_id: Option<NeighborhoodId>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ListSellersQuery {
    pub fn filter(&self) -> PublishedSellerFilter {
        PublishedSellerFilter {
            city_id: self.city_id.clone(),
            neighborhood_id: self.neighborhood_id.clone(),
        }
    }

    pub fn params(&self) -> FindParams {
        let defaults = FindParams::default();
        FindParams::new(
            self.offset.unwrap_or(defaults.offset),
            self.limit.unwrap_or(defaults.limit),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_input_accepts_nulls() {
        let input: SetLocationInput =
            serde_json::from_str(r#"{"city_id":null,"neighborhood_id":null}"#).unwrap();
        assert_eq!(input, SetLocationInput::cleared());
    }

    #[test]
    fn location_input_is_strict() {
        let parsed: Result<SetLocationInput, _> =
            serde_json::from_str(r#"{"city_id":"city_1","zip":"1000"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn location_input_rejects_empty_ids() {
        let parsed: Result<SetLocationInput, _> = serde_json::from_str(r#"{"city_id":""}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn listing_query_defaults_pagination() {
        let query: ListSellersQuery = serde_json::from_str(r#"{"city_id":"city_1"}"#).unwrap();
        assert_eq!(query.params(), FindParams::default());
        assert_eq!(query.filter().city_id.unwrap().as_str(), "city_1");
    }
}
