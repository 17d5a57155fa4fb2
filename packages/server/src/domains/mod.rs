// Business domains
pub mod locations;
pub mod search;
pub mod sellers;
