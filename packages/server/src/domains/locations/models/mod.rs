pub mod city;
pub mod neighborhood;

pub use city::City;
pub use neighborhood::Neighborhood;
