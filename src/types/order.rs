//! Canonical order shapes and order-entry parameters.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::zero;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Canonical order type across backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    Market,
    Stop,
    StopMarket,
    TakeProfit,
    TakeProfitMarket,
    TrailingStopMarket,
}

/// Canonical order lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
}

/// Time-in-force for limit orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    Gtc,
    Ioc,
    Fok,
    Gtx,
}

/// Position side for hedged accounts; `Both` on one-way accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionSide {
    #[default]
    Both,
    Long,
    Short,
}

/// Exchange-neutral order representation.
///
/// `order_id` is always a string; gateways stringify backends that use
/// numeric identifiers. Price and quantity fields are decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    #[serde(default)]
    pub client_order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default = "zero")]
    pub price: String,
    #[serde(default = "zero")]
    pub orig_qty: String,
    #[serde(default = "zero")]
    pub executed_qty: String,
    #[serde(default = "zero")]
    pub avg_price: String,
    #[serde(default = "zero")]
    pub cum_quote: String,
    #[serde(default = "zero")]
    pub stop_price: String,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub update_time: i64,
    #[serde(default)]
    pub reduce_only: bool,
    #[serde(default)]
    pub close_position: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_rate: Option<String>,
    #[serde(default)]
    pub position_side: PositionSide,
}

/// Canonical order-entry parameters.
///
/// `symbol` may be left empty when the order goes through a symbol-bound
/// adapter, which fills in its own trading symbol.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderParams {
    pub symbol: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_position: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
}

impl CreateOrderParams {
    /// Limit order at `price` for `quantity`, GTC.
    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            quantity: Some(quantity.into()),
            price: Some(price.into()),
            stop_price: None,
            activation_price: None,
            callback_rate: None,
            time_in_force: Some(TimeInForce::Gtc),
            reduce_only: None,
            close_position: None,
            client_order_id: None,
        }
    }

    /// Market order for `quantity`.
    pub fn market(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity: Some(quantity.into()),
            price: None,
            stop_price: None,
            activation_price: None,
            callback_rate: None,
            time_in_force: None,
            reduce_only: None,
            close_position: None,
            client_order_id: None,
        }
    }

    /// The caller-supplied client order id, or a freshly generated one.
    pub fn client_order_id_or_generated(&self) -> String {
        self.client_order_id
            .clone()
            .unwrap_or_else(generate_client_order_id)
    }
}

/// Generate a client order id in the form exchanges accept (alphanumeric,
/// under 36 chars).
pub fn generate_client_order_id() -> String {
    format!("x{}", Uuid::new_v4().simple())
}
