//! Canonical market-data shapes: depth, ticker, klines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::zero;

/// One price level as carried on the wire (strings, not decimals).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: String,
    pub qty: String,
}

impl PriceLevel {
    pub fn price_decimal(&self) -> Option<Decimal> {
        self.price.parse().ok()
    }

    pub fn qty_decimal(&self) -> Option<Decimal> {
        self.qty.parse().ok()
    }
}

/// Order-book snapshot for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Depth {
    pub symbol: String,
    #[serde(default)]
    pub last_update_id: i64,
    #[serde(default)]
    pub event_time: i64,
    #[serde(default)]
    pub bids: Vec<PriceLevel>,
    #[serde(default)]
    pub asks: Vec<PriceLevel>,
}

impl Depth {
    /// Highest bid price, if the book has a parseable bid.
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().and_then(PriceLevel::price_decimal)
    }

    /// Lowest ask price, if the book has a parseable ask.
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().and_then(PriceLevel::price_decimal)
    }
}

/// 24h ticker snapshot for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub symbol: String,
    #[serde(default = "zero")]
    pub last_price: String,
    #[serde(default = "zero")]
    pub open_price: String,
    #[serde(default = "zero")]
    pub high_price: String,
    #[serde(default = "zero")]
    pub low_price: String,
    #[serde(default = "zero")]
    pub volume: String,
    #[serde(default = "zero")]
    pub quote_volume: String,
    #[serde(default)]
    pub event_time: i64,
}

impl Ticker {
    pub fn last_price_decimal(&self) -> Option<Decimal> {
        self.last_price.parse().ok()
    }
}

/// One candlestick, keyed by symbol and interval at the subscription level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kline {
    #[serde(default)]
    pub open_time: i64,
    #[serde(default)]
    pub close_time: i64,
    #[serde(default)]
    pub interval: String,
    #[serde(default = "zero")]
    pub open: String,
    #[serde(default = "zero")]
    pub high: String,
    #[serde(default = "zero")]
    pub low: String,
    #[serde(default = "zero")]
    pub close: String,
    #[serde(default = "zero")]
    pub volume: String,
    #[serde(default)]
    pub trades: i64,
}

impl Kline {
    pub fn close_decimal(&self) -> Option<Decimal> {
        self.close.parse().ok()
    }
}
