pub mod search_seller;

pub use search_seller::SearchSeller;
