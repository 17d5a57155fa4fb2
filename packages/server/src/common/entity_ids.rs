//! Typed ID definitions for all marketplace entities.
//!
//! ```rust
//! use b2c_core::common::{CityId, NeighborhoodId};
//!
//! let city: CityId = CityId::new();
//! let nbhd: NeighborhoodId = NeighborhoodId::new();
//! assert!(city.as_str().starts_with("city_"));
//! assert!(nbhd.as_str().starts_with("nbhd_"));
//! // let wrong: CityId = nbhd; // compile error
//! ```

pub use super::id::{Id, IdParseError, IdPrefix};

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for City entities.
pub struct City;

/// Marker type for Neighborhood entities (always inside one city).
pub struct Neighborhood;

/// Marker type for Seller entities (marketplace vendors).
pub struct Seller;

/// Marker type for Member entities (people acting on behalf of a seller).
pub struct Member;

impl IdPrefix for City {
    const PREFIX: &'static str = "city";
}

impl IdPrefix for Neighborhood {
    const PREFIX: &'static str = "nbhd";
}

impl IdPrefix for Seller {
    const PREFIX: &'static str = "sel";
}

impl IdPrefix for Member {
    const PREFIX: &'static str = "mem";
}

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type CityId = Id<City>;

pub type NeighborhoodId = Id<Neighborhood>;

pub type SellerId = Id<Seller>;

/// Authenticated actor id; resolved to a `SellerId` for self-service calls.
pub type MemberId = Id<Member>;
