use axum::{routing::get, Router};

use crate::app::AppState;
use crate::handler::stock::search_stocks;

pub fn router() -> Router<AppState> {
    Router::new().route("/stock", get(search_stocks))
}
