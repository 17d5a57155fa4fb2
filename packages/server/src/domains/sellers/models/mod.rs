pub mod seller;

pub use seller::{
    is_publishable, LocationRef, PublishedSellerFilter, Seller, SellerStatusRecord,
    SellerWithLocation, StoreSeller, StoreStatus, SubscriptionStatus,
};
