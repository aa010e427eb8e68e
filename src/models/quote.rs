use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 一只股票最近一次的行情快照
///
/// 上游没有提供的字段一律序列化为 `null`，不会省略键。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub price_open: Option<String>,
    #[serde(default)]
    pub day_high: Option<String>,
    #[serde(default)]
    pub day_low: Option<String>,
    #[serde(default, rename = "52_week_high")]
    pub week_52_high: Option<String>,
    #[serde(default, rename = "52_week_low")]
    pub week_52_low: Option<String>,
    #[serde(default)]
    pub day_change: Option<String>,
    #[serde(default)]
    pub change_pct: Option<String>,
    #[serde(default)]
    pub close_yesterday: Option<String>,
    #[serde(default)]
    pub market_cap: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub volume_avg: Option<String>,
    #[serde(default)]
    pub shares: Option<String>,
    #[serde(default)]
    pub stock_exchange_long: Option<String>,
    #[serde(default)]
    pub stock_exchange_short: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub timezone_name: Option<String>,
    #[serde(default)]
    pub gmt_offset: Option<String>,
    #[serde(default)]
    pub last_trade_time: Option<String>,
    #[serde(default)]
    pub pe: Option<String>,
    #[serde(default)]
    pub eps: Option<String>,
    /// 毫秒时间戳，每次写入时刷新
    #[serde(default, rename = "lastUpdated")]
    pub last_updated: i64,
}

/// symbol -> 行情
pub type Watchlist = BTreeMap<String, Quote>;

impl Quote {
    /// 上游没有返回数据时使用的占位记录，只有 symbol 和时间戳
    pub fn placeholder(symbol: impl Into<String>, last_updated: i64) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            currency: None,
            price: None,
            price_open: None,
            day_high: None,
            day_low: None,
            week_52_high: None,
            week_52_low: None,
            day_change: None,
            change_pct: None,
            close_yesterday: None,
            market_cap: None,
            volume: None,
            volume_avg: None,
            shares: None,
            stock_exchange_long: None,
            stock_exchange_short: None,
            timezone: None,
            timezone_name: None,
            gmt_offset: None,
            last_trade_time: None,
            pe: None,
            eps: None,
            last_updated,
        }
    }

    pub fn touch(&mut self) {
        self.last_updated = now_millis();
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
