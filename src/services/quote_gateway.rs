use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::models::quote::{now_millis, Quote};
use crate::utils::config::ServerConfig;

#[derive(Debug, Error)]
pub enum QuoteGatewayError {
    /// 网络不可达或上游返回非 2xx
    #[error("quote provider unavailable: {message}")]
    UpstreamUnavailable {
        status: Option<StatusCode>,
        body: Option<Value>,
        message: String,
    },
    #[error("malformed response from quote provider: {0}")]
    MalformedUpstreamResponse(String),
}

impl From<reqwest::Error> for QuoteGatewayError {
    fn from(err: reqwest::Error) -> Self {
        QuoteGatewayError::UpstreamUnavailable {
            status: err.status(),
            body: None,
            message: err.to_string(),
        }
    }
}

/// 行情网关：每次调用只发一个上游请求，不重试、不缓存
#[derive(Debug, Clone)]
pub struct QuoteGateway {
    client: Client,
    api_url: String,
    api_token: String,
}

impl QuoteGateway {
    pub fn new(client: Client, api_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_token: api_token.into(),
        }
    }

    pub fn from_config(cfg: &ServerConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.quote_timeout_secs))
            .build()?;
        Ok(Self::new(client, cfg.quote_api_url.clone(), cfg.quote_api_token.clone()))
    }

    /// 按 symbol 批量拉取行情，symbol 原样以逗号拼接传给上游
    ///
    /// 上游不认识的 symbol 会被静默忽略，因此返回条数可能少于请求条数。
    pub async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, QuoteGatewayError> {
        let joined = symbols.join(",");
        tracing::debug!("请求上游行情: symbols={}", joined);

        let resp = self
            .client
            .get(&self.api_url)
            .query(&[("api_token", self.api_token.as_str()), ("symbol", joined.as_str())])
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            tracing::warn!("上游行情接口返回非成功状态: status={}, symbols={}", status, joined);
            let body = serde_json::from_str::<Value>(&text)
                .unwrap_or_else(|_| Value::String(text.clone()));
            return Err(QuoteGatewayError::UpstreamUnavailable {
                status: Some(status),
                body: Some(body),
                message: format!("quote provider responded with {status}"),
            });
        }

        let json: Value = serde_json::from_str(&text)
            .map_err(|e| QuoteGatewayError::MalformedUpstreamResponse(e.to_string()))?;
        let data = json
            .get("data")
            .and_then(|v| v.as_array())
            .ok_or_else(|| QuoteGatewayError::MalformedUpstreamResponse("missing data field".to_string()))?;

        let fetched_at = now_millis();
        let mut quotes = Vec::with_capacity(data.len());
        for item in data {
            let mut quote: Quote = serde_json::from_value(item.clone())
                .map_err(|e| QuoteGatewayError::MalformedUpstreamResponse(e.to_string()))?;
            if quote.symbol.is_empty() {
                return Err(QuoteGatewayError::MalformedUpstreamResponse(
                    "empty symbol in data".to_string(),
                ));
            }
            quote.last_updated = fetched_at;
            quotes.push(quote);
        }

        tracing::debug!(
            "上游行情返回: requested={}, returned={}",
            symbols.len(),
            quotes.len()
        );
        Ok(quotes)
    }
}
