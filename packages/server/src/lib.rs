// Marketplace seller core
//
// Seller location validation, seller status administration and the relay
// that keeps the external search index in step with seller state.
// Architecture follows domain-driven design; actions live in domains/*/actions.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
