pub mod error;
pub mod stock;
pub mod watchlist;
