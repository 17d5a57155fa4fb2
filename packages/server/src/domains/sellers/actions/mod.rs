//! Seller domain actions - business logic functions
//!
//! Actions take their collaborators from `ServerDeps`, do the work, and emit
//! fact events after the write.

mod queries;
mod set_location;
mod update_status;

pub use queries::{list_published_sellers, retrieve_seller};
pub use set_location::{set_my_location, set_seller_location};
pub use update_status::update_seller_status;
