pub mod watchlist_store;
