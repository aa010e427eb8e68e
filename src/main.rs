use watchlist_backend::{app, utils};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    utils::logging::init_logging();

    let cfg = utils::config::ServerConfig::from_env().expect("invalid server config");
    let app = app::build_app(&cfg).expect("failed to build http client");

    let listener = tokio::net::TcpListener::bind(cfg.addr)
        .await
        .expect("bind failed");
    tracing::info!(
        "Axum listening on http://{}, quote api {}, default symbols {:?}",
        cfg.addr,
        cfg.quote_api_url,
        cfg.default_symbols
    );
    axum::serve(listener, app).await.expect("server failed");
}
