//! Location validation.
//!
//! Two composed steps: a pure shape check on the input, then a read-only
//! referential check against the location store. Neither writes anything.

use super::data::SetLocationInput;
use crate::common::{CityId, DomainError, DomainResult, NeighborhoodId};
use crate::kernel::BaseLocationStore;

pub fn city_not_found(id: &CityId) -> DomainError {
    DomainError::invalid_data(format!("City with id {id} was not found"))
}

pub fn neighborhood_not_found(id: &NeighborhoodId) -> DomainError {
    DomainError::invalid_data(format!("Neighborhood with id {id} was not found"))
}

/// Rejects a neighborhood without a city.
pub fn validate_location_shape(input: &SetLocationInput) -> DomainResult<()> {
    if input.neighborhood_id.is_some() && input.city_id.is_none() {
        return Err(DomainError::validation(
            "city_id is required when neighborhood_id is provided",
        ));
    }
    Ok(())
}

/// Full check: shape, then the referenced city, then neighborhood-in-city
/// when both ids are set.
///
/// Deleted cities and neighborhoods count as missing. Both ids absent clears
/// the location and needs no lookup.
pub async fn validate_location(
    input: &SetLocationInput,
    locations: &dyn BaseLocationStore,
) -> DomainResult<()> {
    validate_location_shape(input)?;

    let Some(city_id) = &input.city_id else {
        return Ok(());
    };

    if locations.find_city(city_id).await?.is_none() {
        return Err(city_not_found(city_id));
    }

    let Some(neighborhood_id) = &input.neighborhood_id else {
        return Ok(());
    };

    let neighborhood = locations
        .find_neighborhood(neighborhood_id)
        .await?
        .ok_or_else(|| neighborhood_not_found(neighborhood_id))?;

    if &neighborhood.city_id != city_id {
        return Err(DomainError::invalid_data(format!(
            "Neighborhood {neighborhood_id} does not belong to city {city_id}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::InMemoryStore;

    fn city(raw: &str) -> CityId {
        CityId::parse(raw).unwrap()
    }

    fn nbhd(raw: &str) -> NeighborhoodId {
        NeighborhoodId::parse(raw).unwrap()
    }

    #[test]
    fn neighborhood_without_city_is_a_shape_error() {
        let input = SetLocationInput::new(None, Some(nbhd("nbhd_1")));
        let err = validate_location_shape(&input).unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
        assert_eq!(
            err.to_string(),
            "city_id is required when neighborhood_id is provided"
        );
    }

    #[test]
    fn other_shapes_pass() {
        assert!(validate_location_shape(&SetLocationInput::cleared()).is_ok());
        assert!(validate_location_shape(&SetLocationInput::new(Some(city("city_1")), None)).is_ok());
        assert!(validate_location_shape(&SetLocationInput::new(
            Some(city("city_1")),
            Some(nbhd("nbhd_1"))
        ))
        .is_ok());
    }

    #[tokio::test]
    async fn mismatched_neighborhood_names_both_ids() {
        let store = InMemoryStore::new();
        store.insert_city(city("city_1"), "Lisbon");
        store.insert_city(city("city_2"), "Porto");
        store.insert_neighborhood(nbhd("nbhd_9"), "Ribeira", city("city_2"));

        let input = SetLocationInput::new(Some(city("city_1")), Some(nbhd("nbhd_9")));
        let err = validate_location(&input, &store).await.unwrap_err();

        assert_eq!(err.kind(), "invalid_data");
        assert_eq!(
            err.to_string(),
            "Neighborhood nbhd_9 does not belong to city city_1"
        );
    }

    #[tokio::test]
    async fn unknown_neighborhood_is_invalid_data_naming_it() {
        let store = InMemoryStore::new();
        store.insert_city(city("city_1"), "Lisbon");

        let input = SetLocationInput::new(Some(city("city_1")), Some(nbhd("nbhd_x")));
        let err = validate_location(&input, &store).await.unwrap_err();

        assert_eq!(err.kind(), "invalid_data");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "Neighborhood with id nbhd_x was not found");
    }

    #[tokio::test]
    async fn unknown_city_is_invalid_data_naming_it() {
        let store = InMemoryStore::new();

        let input = SetLocationInput::new(Some(city("city_gone")), None);
        let err = validate_location(&input, &store).await.unwrap_err();

        assert_eq!(err.kind(), "invalid_data");
        assert_eq!(err.to_string(), "City with id city_gone was not found");
    }

    #[tokio::test]
    async fn deleted_city_counts_as_missing() {
        let store = InMemoryStore::new();
        store.insert_city(city("city_1"), "Lisbon");
        store.delete_city(&city("city_1")).await.unwrap();

        let input = SetLocationInput::new(Some(city("city_1")), None);
        let err = validate_location(&input, &store).await.unwrap_err();

        assert_eq!(err.to_string(), "City with id city_1 was not found");
    }

    #[tokio::test]
    async fn existing_city_alone_is_valid() {
        let store = InMemoryStore::new();
        store.insert_city(city("city_1"), "Lisbon");

        let input = SetLocationInput::new(Some(city("city_1")), None);
        assert!(validate_location(&input, &store).await.is_ok());
    }

    #[tokio::test]
    async fn cleared_location_skips_lookups() {
        let store = InMemoryStore::new();
        assert!(validate_location(&SetLocationInput::cleared(), &store).await.is_ok());
    }

    #[tokio::test]
    async fn matching_pair_is_valid() {
        let store = InMemoryStore::new();
        store.insert_city(city("city_1"), "Lisbon");
        store.insert_neighborhood(nbhd("nbhd_1"), "Alfama", city("city_1"));

        let input = SetLocationInput::new(Some(city("city_1")), Some(nbhd("nbhd_1")));
        assert!(validate_location(&input, &store).await.is_ok());
    }
}
