//! Locations domain - admin-managed cities and their neighborhoods

pub mod actions;
pub mod data;
pub mod models;

pub use actions::*;
pub use data::{
    CreateCityInput, CreateNeighborhoodInput, DeletedRecord, UpdateCityInput,
    UpdateNeighborhoodInput,
};
pub use models::{City, Neighborhood};
