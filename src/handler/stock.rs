use axum::{
    extract::{Query, State},
    Json,
};

use crate::api_models::stock::requested_symbols;
use crate::app::AppState;
use crate::handler::error::AppError;
use crate::models::quote::Quote;

const NO_SYMBOLS_MESSAGE: &str = "No stock symbols provided";

/// 按 symbol 搜索行情，直接透传行情网关的结果
pub async fn search_stocks(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Quote>>, AppError> {
    let symbols = requested_symbols(&params);
    if symbols.is_empty() {
        return Err(AppError::BadRequest(NO_SYMBOLS_MESSAGE.to_string()));
    }

    let quotes = state.gateway.fetch_quotes(&symbols).await?;
    Ok(Json(quotes))
}
