use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::repositories::watchlist_store::StoreError;
use crate::services::quote_gateway::QuoteGatewayError;

const MALFORMED_UPSTREAM_MESSAGE: &str = "Malformed response from quote provider";

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// 上游的状态码与原始响应体透传给调用方
    Upstream { status: StatusCode, body: Value },
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, Json(Value::String(msg))).into_response(),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Json(Value::String(msg))).into_response(),
            AppError::Upstream { status, body } => (status, Json(body)).into_response(),
            AppError::InternalServerError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(Value::String(msg))).into_response()
            }
        }
    }
}

impl From<QuoteGatewayError> for AppError {
    fn from(err: QuoteGatewayError) -> Self {
        tracing::error!("行情网关调用失败: {}", err);
        match err {
            QuoteGatewayError::UpstreamUnavailable {
                status: Some(status),
                body,
                message,
            } => AppError::Upstream {
                status,
                body: body.unwrap_or(Value::String(message)),
            },
            QuoteGatewayError::UpstreamUnavailable {
                status: None,
                message,
                ..
            } => AppError::InternalServerError(message),
            QuoteGatewayError::MalformedUpstreamResponse(_) => {
                AppError::InternalServerError(MALFORMED_UPSTREAM_MESSAGE.to_string())
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Gateway(inner) => inner.into(),
            not_found @ (StoreError::NotFound(_) | StoreError::SymbolNotFound { .. }) => {
                AppError::NotFound(not_found.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("请求体解析失败: {}", rejection.body_text());
        AppError::BadRequest(rejection.body_text())
    }
}
