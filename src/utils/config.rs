use std::env;
use std::net::SocketAddr;

use thiserror::Error;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_QUOTE_API_URL: &str = "https://api.worldtradingdata.com/api/v1/stock";
const DEFAULT_QUOTE_API_TOKEN: &str = "demo";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_SYMBOLS: [&str; 5] = ["SPY", "DJI", "RUS", "NDX", "TSLA"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无效的监听地址 {0}")]
    InvalidAddr(String),
    #[error("环境变量 {0} 取值无效: {1}")]
    InvalidValue(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub quote_api_url: String,
    pub quote_api_token: String,
    pub quote_timeout_secs: u64,
    pub default_symbols: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 按给定的取值函数解析配置，缺省项使用默认值
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT", raw))?,
            None => DEFAULT_PORT,
        };
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(format!("{}:{}", host, port)))?;

        let quote_api_url =
            lookup("QUOTE_API_URL").unwrap_or_else(|| DEFAULT_QUOTE_API_URL.to_string());
        let quote_api_token =
            lookup("QUOTE_API_TOKEN").unwrap_or_else(|| DEFAULT_QUOTE_API_TOKEN.to_string());
        let quote_timeout_secs = match lookup("QUOTE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidValue("QUOTE_TIMEOUT_SECS", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let default_symbols = match lookup("DEFAULT_SYMBOLS") {
            Some(raw) => {
                let symbols = parse_symbol_list(&raw);
                if symbols.is_empty() {
                    return Err(ConfigError::InvalidValue("DEFAULT_SYMBOLS", raw));
                }
                symbols
            }
            None => DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            addr,
            quote_api_url,
            quote_api_token,
            quote_timeout_secs,
            default_symbols,
        })
    }

    /// 测试和本地调试用，指向给定的上游地址
    pub fn with_quote_api(quote_api_url: impl Into<String>) -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            quote_api_url: quote_api_url.into(),
            quote_api_token: DEFAULT_QUOTE_API_TOKEN.to_string(),
            quote_timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// 逗号分隔的 symbol 列表：去空白、丢弃空项、保序去重
pub fn parse_symbol_list(raw: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let trimmed = part.trim();
        if !trimmed.is_empty() && !symbols.iter().any(|s| s == trimmed) {
            symbols.push(trimmed.to_string());
        }
    }
    symbols
}
