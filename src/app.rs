use std::sync::Arc;

use axum::Router;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;

use crate::repositories::watchlist_store::WatchlistStore;
use crate::routes;
use crate::services::quote_gateway::QuoteGateway;
use crate::utils::config::ServerConfig;
use crate::utils::middleware;

#[derive(Clone)]
pub struct AppState {
    pub store: WatchlistStore,
    pub gateway: QuoteGateway,
    pub default_symbols: Arc<[String]>,
}

impl AppState {
    pub fn from_config(cfg: &ServerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            store: WatchlistStore::new(),
            gateway: QuoteGateway::from_config(cfg)?,
            default_symbols: cfg.default_symbols.clone().into(),
        })
    }
}

pub fn build_app(cfg: &ServerConfig) -> Result<Router, reqwest::Error> {
    Ok(build_app_with_state(AppState::from_config(cfg)?))
}

pub fn build_app_with_state(state: AppState) -> Router {
    routes::build_routes()
        .with_state(state)
        .layer(middleware::cors_layer())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
