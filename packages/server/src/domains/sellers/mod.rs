//! Seller domain - seller location and status workflows

pub mod actions;
pub mod data;
pub mod events;
pub mod models;
pub mod validation;

pub use data::{ListSellersQuery, SetLocationInput, UpdateSellerStatusInput};
pub use events::{EventKind, SellerEvent};
pub use models::{Seller, SellerWithLocation, StoreSeller, StoreStatus, SubscriptionStatus};
pub use validation::{validate_location, validate_location_shape};
