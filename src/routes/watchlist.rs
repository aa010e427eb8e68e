use axum::{routing::{get, put}, Router};

use crate::app::AppState;
use crate::handler::watchlist::{add_stock, get_watchlist, refresh_stock, remove_stock};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/watchlist/:user_id", get(get_watchlist))
        .route(
            "/watchlist/:user_id/:symbol",
            put(refresh_stock).post(add_stock).delete(remove_stock),
        )
}
