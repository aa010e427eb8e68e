use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

/// 前端开发服务器默认地址
const DEV_CLIENT_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

pub fn cors_layer() -> CorsLayer {
    let allowed_env = std::env::var("ALLOWED_ORIGINS").unwrap_or_default();
    CorsLayer::new()
        .allow_origin(allowed_origins(&allowed_env))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 逗号分隔的 origin 列表，非法项丢弃；全部为空时回落到开发地址
fn allowed_origins(raw: &str) -> Vec<HeaderValue> {
    let origins: Vec<HeaderValue> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    if origins.is_empty() {
        DEV_CLIENT_ORIGINS
            .into_iter()
            .map(HeaderValue::from_static)
            .collect()
    } else {
        origins
    }
}
