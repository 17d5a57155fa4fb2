use crate::common::{DomainError, DomainResult, Page, SellerId};
use crate::domains::sellers::data::ListSellersQuery;
use crate::domains::sellers::models::{Seller, StoreSeller};
use crate::kernel::ServerDeps;

pub async fn retrieve_seller(id: &SellerId, deps: &ServerDeps) -> DomainResult<Seller> {
    deps.sellers
        .find_seller(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Seller with id {id} was not found")))
}

/// Public listing: approved sellers with an active subscription only.
pub async fn list_published_sellers(
    query: &ListSellersQuery,
    deps: &ServerDeps,
) -> DomainResult<Page<StoreSeller>> {
    let params = query.params().validate()?;
    let (items, count) = deps.sellers.list_published(&query.filter(), params).await?;
    Ok(Page::new(items, count, params).map(StoreSeller::from))
}
