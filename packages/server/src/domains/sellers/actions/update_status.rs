use tracing::info;

use crate::common::{DomainError, DomainResult, SellerId};
use crate::domains::sellers::data::UpdateSellerStatusInput;
use crate::domains::sellers::events::SellerEvent;
use crate::domains::sellers::models::Seller;
use crate::kernel::ServerDeps;

/// Writes approval and/or subscription status and emits `SellerUpdated`.
pub async fn update_seller_status(
    seller_id: &SellerId,
    input: UpdateSellerStatusInput,
    deps: &ServerDeps,
) -> DomainResult<Seller> {
    if input.approved.is_none() && input.subscription_status.is_none() {
        return Err(DomainError::validation(
            "approved or subscription_status must be provided",
        ));
    }

    let seller = deps
        .sellers
        .update_status(seller_id, input.approved, input.subscription_status)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Seller with id {seller_id} was not found")))?;

    info!(
        seller_id = %seller.id,
        approved = seller.approved,
        subscription_status = ?seller.subscription_status,
        "Seller status updated"
    );

    deps.emit(SellerEvent::SellerUpdated {
        id: seller.id.clone(),
    })
    .await;

    Ok(seller)
}
