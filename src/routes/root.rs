use axum::{routing::get, Router};

use crate::app::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
}

async fn root() -> &'static str {
    "watchlist-backend: GET /watchlist/:user_id, PUT|POST|DELETE /watchlist/:user_id/:symbol, GET /stock?symbol="
}

async fn healthz() -> &'static str {
    "ok"
}
