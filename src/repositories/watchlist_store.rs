use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::quote::{now_millis, Quote, Watchlist};
use crate::services::quote_gateway::{QuoteGateway, QuoteGatewayError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No watchlist found for user {0}")]
    NotFound(String),
    #[error("Symbol {symbol} is not in the watchlist of user {user_id}")]
    SymbolNotFound { user_id: String, symbol: String },
    #[error(transparent)]
    Gateway(#[from] QuoteGatewayError),
}

/// 进程内的观察表存储：user_id -> (symbol -> 行情)
///
/// 锁只在内存读写期间持有，调用上游时不持锁；同一用户的并发写入以最后一次为准。
#[derive(Debug, Clone, Default)]
pub struct WatchlistStore {
    db: Arc<RwLock<HashMap<String, Watchlist>>>,
}

impl WatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 首次访问时用默认 symbol 初始化观察表，已存在（即使为空）则原样返回
    pub async fn ensure_initialized(
        &self,
        gateway: &QuoteGateway,
        user_id: &str,
        default_symbols: &[String],
    ) -> Result<Watchlist, StoreError> {
        if let Some(existing) = self.db.read().await.get(user_id) {
            return Ok(existing.clone());
        }

        tracing::info!("初始化用户观察表: user_id={}", user_id);
        let quotes = gateway.fetch_quotes(default_symbols).await?;
        let watchlist = build_default_watchlist(quotes, default_symbols, now_millis());

        let mut db = self.db.write().await;
        // 并发的首次请求中先写入者胜出
        let stored = db.entry(user_id.to_string()).or_insert(watchlist);
        Ok(stored.clone())
    }

    pub async fn get(&self, user_id: &str) -> Result<Watchlist, StoreError> {
        self.db
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))
    }

    /// 按 quote.symbol 覆盖写入
    pub async fn add(&self, user_id: &str, mut quote: Quote) -> Result<Quote, StoreError> {
        let mut db = self.db.write().await;
        let watchlist = db
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;
        quote.touch();
        watchlist.insert(quote.symbol.clone(), quote.clone());
        Ok(quote)
    }

    /// symbol 不存在时不报错，返回 None
    pub async fn remove(&self, user_id: &str, symbol: &str) -> Result<Option<Quote>, StoreError> {
        let mut db = self.db.write().await;
        let watchlist = db
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;
        Ok(watchlist.remove(symbol))
    }

    /// 重新拉取观察表中已有的单个 symbol 并覆盖，不会新增条目
    pub async fn refresh(
        &self,
        gateway: &QuoteGateway,
        user_id: &str,
        symbol: &str,
    ) -> Result<Quote, StoreError> {
        self.check_symbol(user_id, symbol).await?;

        let quotes = gateway.fetch_quotes(&[symbol.to_string()]).await?;
        let mut quote = quotes
            .into_iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
            .unwrap_or_else(|| {
                tracing::warn!("上游未返回 symbol 数据，写入占位记录: symbol={}", symbol);
                Quote::placeholder(symbol, now_millis())
            });
        quote.symbol = symbol.to_string();

        let mut db = self.db.write().await;
        let watchlist = db
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;
        // 拉取期间被并发删除的条目不再写回
        let slot = watchlist
            .get_mut(symbol)
            .ok_or_else(|| symbol_not_found(user_id, symbol))?;
        *slot = quote.clone();
        Ok(quote)
    }

    async fn check_symbol(&self, user_id: &str, symbol: &str) -> Result<(), StoreError> {
        let db = self.db.read().await;
        let watchlist = db
            .get(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;
        if watchlist.contains_key(symbol) {
            Ok(())
        } else {
            Err(symbol_not_found(user_id, symbol))
        }
    }

    #[cfg(test)]
    pub(crate) async fn insert_raw(&self, user_id: &str, watchlist: Watchlist) {
        self.db.write().await.insert(user_id.to_string(), watchlist);
    }
}

fn symbol_not_found(user_id: &str, symbol: &str) -> StoreError {
    StoreError::SymbolNotFound {
        user_id: user_id.to_string(),
        symbol: symbol.to_string(),
    }
}

/// 以返回的行情建表，缺失的默认 symbol 用占位记录补齐
fn build_default_watchlist(quotes: Vec<Quote>, default_symbols: &[String], now: i64) -> Watchlist {
    let mut watchlist: Watchlist = quotes.into_iter().map(|q| (q.symbol.clone(), q)).collect();
    for symbol in default_symbols {
        watchlist
            .entry(symbol.clone())
            .or_insert_with(|| Quote::placeholder(symbol.clone(), now));
    }
    watchlist
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use reqwest::Client;
    use serde_json::json;

    fn defaults() -> Vec<String> {
        ["SPY", "DJI", "RUS", "NDX", "TSLA"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn gateway(url: &str) -> QuoteGateway {
        QuoteGateway::new(Client::new(), format!("{url}/stock"), "token")
    }

    #[test]
    fn backfills_missing_defaults() {
        let mut spy = Quote::placeholder("SPY", 1);
        spy.price = Some("301.00".to_string());

        let watchlist = build_default_watchlist(vec![spy.clone()], &defaults(), 7);

        assert_eq!(watchlist.len(), 5);
        assert_eq!(watchlist["SPY"], spy);
        assert_eq!(watchlist["TSLA"], Quote::placeholder("TSLA", 7));
    }

    #[tokio::test]
    async fn initializes_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/stock")
            .match_query(Matcher::UrlEncoded("symbol".into(), "SPY,DJI,RUS,NDX,TSLA".into()))
            .with_status(200)
            .with_body(json!({ "data": [{ "symbol": "SPY", "price": "301.00" }] }).to_string())
            .expect(1)
            .create_async()
            .await;
        let gateway = gateway(&server.url());
        let store = WatchlistStore::new();

        let first = store.ensure_initialized(&gateway, "u1", &defaults()).await.unwrap();
        let second = store.ensure_initialized(&gateway, "u1", &defaults()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(first, second);
        assert_eq!(first["SPY"].price.as_deref(), Some("301.00"));
        assert_eq!(first["DJI"].price, None);
    }

    #[tokio::test]
    async fn existing_empty_watchlist_is_left_alone() {
        let server = mockito::Server::new_async().await;
        let store = WatchlistStore::new();
        store.insert_raw("u1", Watchlist::new()).await;

        let watchlist = store
            .ensure_initialized(&gateway(&server.url()), "u1", &defaults())
            .await
            .unwrap();

        assert!(watchlist.is_empty());
    }

    #[tokio::test]
    async fn failed_initialization_stores_nothing() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/stock")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
        let store = WatchlistStore::new();

        let err = store
            .ensure_initialized(&gateway(&server.url()), "u1", &defaults())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Gateway(_)));
        assert!(matches!(store.get("u1").await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn operations_require_initialized_watchlist() {
        let server = mockito::Server::new_async().await;
        let store = WatchlistStore::new();

        assert!(matches!(store.get("nobody").await, Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.add("nobody", Quote::placeholder("AAPL", 0)).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(store.remove("nobody", "AAPL").await, Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.refresh(&gateway(&server.url()), "nobody", "AAPL").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn add_overwrites_and_remove_returns_prior_value() {
        let store = WatchlistStore::new();
        store.insert_raw("u1", Watchlist::new()).await;

        let mut quote = Quote::placeholder("AAPL", 0);
        quote.price = Some("200.00".to_string());
        store.add("u1", quote.clone()).await.unwrap();
        quote.price = Some("210.00".to_string());
        let stored = store.add("u1", quote).await.unwrap();

        assert!(stored.last_updated > 0);
        let watchlist = store.get("u1").await.unwrap();
        assert_eq!(watchlist.len(), 1);
        assert_eq!(watchlist["AAPL"].price.as_deref(), Some("210.00"));

        let removed = store.remove("u1", "AAPL").await.unwrap();
        assert_eq!(removed, Some(stored));
        assert!(store.get("u1").await.unwrap().is_empty());
        assert_eq!(store.remove("u1", "AAPL").await.unwrap(), None);
    }

    #[tokio::test]
    async fn refresh_overwrites_single_symbol() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/stock")
            .match_query(Matcher::UrlEncoded("symbol".into(), "TSLA".into()))
            .with_status(200)
            .with_body(json!({ "data": [{ "symbol": "TSLA", "price": "250.00" }] }).to_string())
            .create_async()
            .await;
        let store = WatchlistStore::new();
        let mut watchlist = Watchlist::new();
        watchlist.insert("TSLA".to_string(), Quote::placeholder("TSLA", 1));
        store.insert_raw("u1", watchlist).await;

        let refreshed = store
            .refresh(&gateway(&server.url()), "u1", "TSLA")
            .await
            .unwrap();

        assert_eq!(refreshed.price.as_deref(), Some("250.00"));
        assert!(refreshed.last_updated > 1);
        assert_eq!(store.get("u1").await.unwrap()["TSLA"], refreshed);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_old_record() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/stock")
            .match_query(Matcher::Any)
            .with_status(502)
            .create_async()
            .await;
        let store = WatchlistStore::new();
        let mut watchlist = Watchlist::new();
        watchlist.insert("TSLA".to_string(), Quote::placeholder("TSLA", 1));
        store.insert_raw("u1", watchlist.clone()).await;

        let result = store.refresh(&gateway(&server.url()), "u1", "TSLA").await;

        assert!(matches!(result, Err(StoreError::Gateway(_))));
        assert_eq!(store.get("u1").await.unwrap(), watchlist);
    }

    #[tokio::test]
    async fn refresh_of_unlisted_symbol_changes_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/stock")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "data": [{ "symbol": "BOGUS" }] }).to_string())
            .expect(0)
            .create_async()
            .await;
        let store = WatchlistStore::new();
        let mut watchlist = Watchlist::new();
        watchlist.insert("TSLA".to_string(), Quote::placeholder("TSLA", 1));
        store.insert_raw("u1", watchlist.clone()).await;

        let result = store.refresh(&gateway(&server.url()), "u1", "BOGUS").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(StoreError::SymbolNotFound { .. })));
        assert_eq!(store.get("u1").await.unwrap(), watchlist);
    }

    #[tokio::test]
    async fn refresh_without_upstream_record_stores_placeholder() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/stock")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "data": [] }).to_string())
            .create_async()
            .await;
        let store = WatchlistStore::new();
        let mut stale = Quote::placeholder("TSLA", 1);
        stale.price = Some("240.00".to_string());
        let mut watchlist = Watchlist::new();
        watchlist.insert("TSLA".to_string(), stale);
        store.insert_raw("u1", watchlist).await;

        let refreshed = store
            .refresh(&gateway(&server.url()), "u1", "TSLA")
            .await
            .unwrap();

        assert_eq!(refreshed.symbol, "TSLA");
        assert_eq!(refreshed.price, None);
        assert_eq!(store.get("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn racing_first_requests_share_one_watchlist() {
        let mut first_server = mockito::Server::new_async().await;
        let _first = first_server
            .mock("GET", "/stock")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "data": [{ "symbol": "SPY", "price": "100.00" }] }).to_string())
            .create_async()
            .await;
        let mut second_server = mockito::Server::new_async().await;
        let _second = second_server
            .mock("GET", "/stock")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "data": [{ "symbol": "SPY", "price": "200.00" }] }).to_string())
            .create_async()
            .await;
        let first_gateway = gateway(&first_server.url());
        let second_gateway = gateway(&second_server.url());
        let store = WatchlistStore::new();
        let symbols = defaults();

        let (a, b) = tokio::join!(
            store.ensure_initialized(&first_gateway, "u1", &symbols),
            store.ensure_initialized(&second_gateway, "u1", &symbols),
        );

        let a = a.unwrap();
        let b = b.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.get("u1").await.unwrap(), a);
        let price = a["SPY"].price.as_deref();
        assert!(price == Some("100.00") || price == Some("200.00"));
    }
}
