//! Seller location workflow: validate, then write once.

use tracing::info;

use crate::common::{DomainError, DomainResult, MemberId, SellerId};
use crate::domains::sellers::data::SetLocationInput;
use crate::domains::sellers::events::SellerEvent;
use crate::domains::sellers::models::Seller;
use crate::domains::sellers::validation::validate_location;
use crate::kernel::ServerDeps;

/// Sets `(city_id, neighborhood_id)` on an arbitrary seller (admin).
///
/// Validation failures abort before the write. The write is a single
/// statement; `SellerUpdated` is emitted once it has committed.
pub async fn set_seller_location(
    seller_id: &SellerId,
    input: SetLocationInput,
    deps: &ServerDeps,
) -> DomainResult<Seller> {
    validate_location(&input, deps.locations.as_ref()).await?;

    let seller = deps
        .sellers
        .update_location(
            seller_id,
            input.city_id.as_ref(),
            input.neighborhood_id.as_ref(),
        )
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Seller with id {seller_id} was not found")))?;

    info!(
        seller_id = %seller.id,
        city_id = ?seller.city_id.as_ref().map(|id| id.as_str()),
        neighborhood_id = ?seller.neighborhood_id.as_ref().map(|id| id.as_str()),
        "Seller location updated"
    );

    deps.emit(SellerEvent::SellerUpdated {
        id: seller.id.clone(),
    })
    .await;

    Ok(seller)
}

/// Sets the location of the seller the authenticated member acts for.
pub async fn set_my_location(
    member_id: &MemberId,
    input: SetLocationInput,
    deps: &ServerDeps,
) -> DomainResult<Seller> {
    let seller_id = deps
        .actors
        .resolve_seller_id(member_id)
        .await?
        .ok_or_else(|| {
            DomainError::not_found(format!("No seller found for member {member_id}"))
        })?;

    set_seller_location(&seller_id, input, deps).await
}
