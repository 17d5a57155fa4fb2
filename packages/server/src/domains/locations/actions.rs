//! City and neighborhood administration.
//!
//! Renames, moves and deletes change what the search index shows for the
//! sellers involved, so each of them ends by announcing those sellers.

use tracing::info;

use super::data::{
    clean_name, CreateCityInput, CreateNeighborhoodInput, DeletedRecord, UpdateCityInput,
    UpdateNeighborhoodInput,
};
use super::models::{City, Neighborhood};
use crate::common::{CityId, DomainError, DomainResult, FindParams, NeighborhoodId, Page};
use crate::domains::sellers::events::SellerEvent;
use crate::kernel::ServerDeps;

fn city_not_found(id: &CityId) -> DomainError {
    DomainError::not_found(format!("City with id {id} was not found"))
}

fn neighborhood_not_found(id: &NeighborhoodId) -> DomainError {
    DomainError::not_found(format!("Neighborhood with id {id} was not found"))
}

/// Fails with `InvalidData` when `city_id` does not resolve.
async fn require_city_reference(city_id: &CityId, deps: &ServerDeps) -> DomainResult<City> {
    deps.locations
        .find_city(city_id)
        .await?
        .ok_or_else(|| DomainError::invalid_data(format!("City with ID {city_id} not found")))
}

// =============================================================================
// Cities
// =============================================================================

pub async fn create_city(input: CreateCityInput, deps: &ServerDeps) -> DomainResult<City> {
    let name = clean_name(&input.name, "name")?;
    let city = deps.locations.create_city(&CityId::new(), &name).await?;
    info!(city_id = %city.id, "City created");
    Ok(city)
}

pub async fn retrieve_city(id: &CityId, deps: &ServerDeps) -> DomainResult<City> {
    deps.locations
        .find_city(id)
        .await?
        .ok_or_else(|| city_not_found(id))
}

pub async fn list_cities(params: FindParams, deps: &ServerDeps) -> DomainResult<Page<City>> {
    let params = params.validate()?;
    let (items, count) = deps.locations.list_cities(params).await?;
    Ok(Page::new(items, count, params))
}

pub async fn update_city(
    id: &CityId,
    input: UpdateCityInput,
    deps: &ServerDeps,
) -> DomainResult<City> {
    let Some(raw_name) = input.name else {
        return retrieve_city(id, deps).await;
    };
    let name = clean_name(&raw_name, "name")?;

    let city = deps
        .locations
        .rename_city(id, &name)
        .await?
        .ok_or_else(|| city_not_found(id))?;

    let affected = deps.sellers.ids_in_city(id).await?;
    info!(city_id = %id, affected_sellers = affected.len(), "City renamed");
    deps.emit(SellerEvent::SellersChanged { ids: affected }).await;

    Ok(city)
}

/// Soft-deletes the city and its neighborhoods and detaches its sellers.
pub async fn delete_city(id: &CityId, deps: &ServerDeps) -> DomainResult<DeletedRecord> {
    if !deps.locations.delete_city(id).await? {
        return Err(city_not_found(id));
    }

    let affected = deps.sellers.clear_city(id).await?;
    info!(city_id = %id, affected_sellers = affected.len(), "City deleted");
    deps.emit(SellerEvent::SellersChanged { ids: affected }).await;

    Ok(DeletedRecord::new(id))
}

// =============================================================================
// Neighborhoods
// =============================================================================

pub async fn create_neighborhood(
    input: CreateNeighborhoodInput,
    deps: &ServerDeps,
) -> DomainResult<Neighborhood> {
    let name = clean_name(&input.name, "name")?;
    require_city_reference(&input.city_id, deps).await?;

    let neighborhood = deps
        .locations
        .create_neighborhood(&NeighborhoodId::new(), &name, &input.city_id)
        .await?;
    info!(neighborhood_id = %neighborhood.id, city_id = %neighborhood.city_id, "Neighborhood created");
    Ok(neighborhood)
}

pub async fn retrieve_neighborhood(
    id: &NeighborhoodId,
    deps: &ServerDeps,
) -> DomainResult<Neighborhood> {
    deps.locations
        .find_neighborhood(id)
        .await?
        .ok_or_else(|| neighborhood_not_found(id))
}

pub async fn list_neighborhoods(
    params: FindParams,
    deps: &ServerDeps,
) -> DomainResult<Page<Neighborhood>> {
    let params = params.validate()?;
    let (items, count) = deps.locations.list_neighborhoods(None, params).await?;
    Ok(Page::new(items, count, params))
}

/// Store-facing listing of one city's neighborhoods.
pub async fn list_city_neighborhoods(
    city_id: &CityId,
    params: FindParams,
    deps: &ServerDeps,
) -> DomainResult<Page<Neighborhood>> {
    let params = params.validate()?;
    retrieve_city(city_id, deps).await?;
    let (items, count) = deps
        .locations
        .list_neighborhoods(Some(city_id), params)
        .await?;
    Ok(Page::new(items, count, params))
}

pub async fn update_neighborhood(
    id: &NeighborhoodId,
    input: UpdateNeighborhoodInput,
    deps: &ServerDeps,
) -> DomainResult<Neighborhood> {
    let name = input
        .name
        .as_deref()
        .map(|raw| clean_name(raw, "name"))
        .transpose()?;
    if let Some(city_id) = &input.city_id {
        require_city_reference(city_id, deps).await?;
    }
    if name.is_none() && input.city_id.is_none() {
        return retrieve_neighborhood(id, deps).await;
    }

    let previous = retrieve_neighborhood(id, deps).await?;
    let neighborhood = deps
        .locations
        .update_neighborhood(id, name.as_deref(), input.city_id.as_ref())
        .await?
        .ok_or_else(|| neighborhood_not_found(id))?;

    let mut affected = if previous.city_id != neighborhood.city_id {
        deps.sellers
            .clear_mismatched_neighborhood(id, &neighborhood.city_id)
            .await?
    } else {
        Vec::new()
    };
    affected.extend(deps.sellers.ids_in_neighborhood(id).await?);

    info!(
        neighborhood_id = %id,
        city_id = %neighborhood.city_id,
        affected_sellers = affected.len(),
        "Neighborhood updated"
    );
    deps.emit(SellerEvent::SellersChanged { ids: affected }).await;

    Ok(neighborhood)
}

pub async fn delete_neighborhood(
    id: &NeighborhoodId,
    deps: &ServerDeps,
) -> DomainResult<DeletedRecord> {
    if !deps.locations.delete_neighborhood(id).await? {
        return Err(neighborhood_not_found(id));
    }

    let affected = deps.sellers.clear_neighborhood(id).await?;
    info!(neighborhood_id = %id, affected_sellers = affected.len(), "Neighborhood deleted");
    deps.emit(SellerEvent::SellersChanged { ids: affected }).await;

    Ok(DeletedRecord::new(id))
}
