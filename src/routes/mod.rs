use axum::Router;

use crate::app::AppState;

mod root;
mod stock;
mod watchlist;

pub fn build_routes() -> Router<AppState> {
    Router::new()
        // 根路径与健康检查
        .merge(root::router())
        .merge(watchlist::router())
        .merge(stock::router())
}
