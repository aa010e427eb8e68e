use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::app::AppState;
use crate::handler::error::AppError;
use crate::models::quote::{Quote, Watchlist};

/// 获取用户观察表，首次访问时用默认股票初始化
pub async fn get_watchlist(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Watchlist>, AppError> {
    let watchlist = state
        .store
        .ensure_initialized(&state.gateway, &user_id, &state.default_symbols)
        .await?;
    Ok(Json(watchlist))
}

/// 刷新观察表中已有的单只股票
pub async fn refresh_stock(
    State(state): State<AppState>,
    Path((user_id, symbol)): Path<(String, String)>,
) -> Result<Json<Quote>, AppError> {
    let quote = state.store.refresh(&state.gateway, &user_id, &symbol).await?;
    tracing::info!("刷新观察表股票: user_id={}, symbol={}", user_id, symbol);
    Ok(Json(quote))
}

/// 添加股票到观察表，已存在则覆盖
pub async fn add_stock(
    State(state): State<AppState>,
    Path((user_id, symbol)): Path<(String, String)>,
    payload: Result<Json<Quote>, JsonRejection>,
) -> Result<Json<Quote>, AppError> {
    let Json(payload) = payload?;
    if payload.symbol != symbol {
        return Err(AppError::BadRequest(format!(
            "Symbol {} in body does not match {} in path",
            payload.symbol, symbol
        )));
    }
    let stored = state.store.add(&user_id, payload).await?;
    tracing::info!("添加到观察表: user_id={}, symbol={}", user_id, symbol);
    Ok(Json(stored))
}

/// 从观察表移除股票；不在表中时返回 null
pub async fn remove_stock(
    State(state): State<AppState>,
    Path((user_id, symbol)): Path<(String, String)>,
) -> Result<Json<Option<Quote>>, AppError> {
    let removed = state.store.remove(&user_id, &symbol).await?;
    if removed.is_none() {
        tracing::debug!("观察表中没有该股票: user_id={}, symbol={}", user_id, symbol);
    }
    Ok(Json(removed))
}
