//! GRVT wire shapes and their canonical mapping.
//!
//! GRVT wraps every response in a `result` envelope and speaks snake_case
//! with lowercase enum values ("buy", "cancelled", "gtc"). The mapping here
//! translates that vocabulary into the canonical one, including the
//! British/American spelling shift for cancelled orders.

use serde::{Deserialize, Serialize};

use crate::types::{
    now_millis, zero, AccountSnapshot, AssetBalance, CreateOrderParams, Order, OrderSide,
    OrderStatus, OrderType, Position, PositionSide, TimeInForce,
};

/// Response envelope every GRVT endpoint uses.
#[derive(Debug, Deserialize)]
pub(super) struct GrvtEnvelope<T> {
    pub result: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(super) enum GrvtSide {
    Buy,
    Sell,
}

impl From<OrderSide> for GrvtSide {
    fn from(side: OrderSide) -> Self {
        match side {
            OrderSide::Buy => Self::Buy,
            OrderSide::Sell => Self::Sell,
        }
    }
}

impl From<GrvtSide> for OrderSide {
    fn from(side: GrvtSide) -> Self {
        match side {
            GrvtSide::Buy => Self::Buy,
            GrvtSide::Sell => Self::Sell,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(super) enum GrvtOrderType {
    Limit,
    Market,
    Stop,
    StopMarket,
    TakeProfit,
    TakeProfitMarket,
    TrailingStopMarket,
}

impl From<OrderType> for GrvtOrderType {
    fn from(value: OrderType) -> Self {
        match value {
            OrderType::Limit => Self::Limit,
            OrderType::Market => Self::Market,
            OrderType::Stop => Self::Stop,
            OrderType::StopMarket => Self::StopMarket,
            OrderType::TakeProfit => Self::TakeProfit,
            OrderType::TakeProfitMarket => Self::TakeProfitMarket,
            OrderType::TrailingStopMarket => Self::TrailingStopMarket,
        }
    }
}

impl From<GrvtOrderType> for OrderType {
    fn from(value: GrvtOrderType) -> Self {
        match value {
            GrvtOrderType::Limit => Self::Limit,
            GrvtOrderType::Market => Self::Market,
            GrvtOrderType::Stop => Self::Stop,
            GrvtOrderType::StopMarket => Self::StopMarket,
            GrvtOrderType::TakeProfit => Self::TakeProfit,
            GrvtOrderType::TakeProfitMarket => Self::TakeProfitMarket,
            GrvtOrderType::TrailingStopMarket => Self::TrailingStopMarket,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(super) enum GrvtOrderState {
    #[default]
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
    Expired,
}

impl From<GrvtOrderState> for OrderStatus {
    fn from(state: GrvtOrderState) -> Self {
        match state {
            GrvtOrderState::Open => Self::New,
            GrvtOrderState::PartiallyFilled => Self::PartiallyFilled,
            GrvtOrderState::Filled => Self::Filled,
            GrvtOrderState::Cancelled => Self::Canceled,
            GrvtOrderState::Rejected => Self::Rejected,
            GrvtOrderState::Expired => Self::Expired,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(super) enum GrvtTimeInForce {
    Gtc,
    Ioc,
    Fok,
    Gtx,
}

impl From<TimeInForce> for GrvtTimeInForce {
    fn from(value: TimeInForce) -> Self {
        match value {
            TimeInForce::Gtc => Self::Gtc,
            TimeInForce::Ioc => Self::Ioc,
            TimeInForce::Fok => Self::Fok,
            TimeInForce::Gtx => Self::Gtx,
        }
    }
}

impl From<GrvtTimeInForce> for TimeInForce {
    fn from(value: GrvtTimeInForce) -> Self {
        match value {
            GrvtTimeInForce::Gtc => Self::Gtc,
            GrvtTimeInForce::Ioc => Self::Ioc,
            GrvtTimeInForce::Fok => Self::Fok,
            GrvtTimeInForce::Gtx => Self::Gtx,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct GrvtAccountSummary {
    #[serde(default)]
    pub total_equity: Option<String>,
    #[serde(default)]
    pub unrealized_pnl: Option<String>,
    #[serde(default)]
    pub initial_margin: Option<String>,
    #[serde(default)]
    pub maintenance_margin: Option<String>,
    #[serde(default)]
    pub available_balance: Option<String>,
    #[serde(default)]
    pub spot_balances: Vec<GrvtBalance>,
    #[serde(default)]
    pub positions: Vec<GrvtPosition>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GrvtBalance {
    pub currency: String,
    #[serde(default = "zero")]
    pub balance: String,
    #[serde(default = "zero")]
    pub available: String,
    #[serde(default = "zero")]
    pub unrealized_pnl: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct GrvtPosition {
    pub instrument: String,
    #[serde(default = "zero")]
    pub size: String,
    #[serde(default = "zero")]
    pub entry_price: String,
    #[serde(default = "zero")]
    pub unrealized_pnl: String,
    #[serde(default = "zero")]
    pub initial_margin: String,
    #[serde(default = "zero")]
    pub maintenance_margin: String,
    #[serde(default = "zero")]
    pub leverage: String,
}

impl GrvtAccountSummary {
    /// GRVT has no deposit/withdraw gating on trading accounts, so the
    /// permission flags stay permissive. Total equity doubles as wallet and
    /// margin balance; the finer-grained canonical fields default to "0".
    pub fn into_snapshot(self) -> AccountSnapshot {
        let total_equity = self.total_equity.unwrap_or_else(zero);
        let now = now_millis();
        AccountSnapshot {
            update_time: now,
            total_wallet_balance: total_equity.clone(),
            total_margin_balance: total_equity,
            total_unrealized_profit: self.unrealized_pnl.unwrap_or_else(zero),
            total_initial_margin: self.initial_margin.unwrap_or_else(zero),
            total_maint_margin: self.maintenance_margin.unwrap_or_else(zero),
            available_balance: self.available_balance.clone().unwrap_or_else(zero),
            max_withdraw_amount: self.available_balance.unwrap_or_else(zero),
            assets: self
                .spot_balances
                .into_iter()
                .map(|b| b.into_balance(now))
                .collect(),
            positions: self
                .positions
                .into_iter()
                .map(|p| p.into_position(now))
                .collect(),
            ..AccountSnapshot::empty()
        }
    }
}

impl GrvtBalance {
    fn into_balance(self, update_time: i64) -> AssetBalance {
        AssetBalance {
            asset: self.currency,
            wallet_balance: self.balance.clone(),
            unrealized_profit: self.unrealized_pnl,
            margin_balance: self.balance,
            available_balance: self.available,
            update_time,
        }
    }
}

impl GrvtPosition {
    fn into_position(self, update_time: i64) -> Position {
        Position {
            symbol: self.instrument,
            position_amt: self.size,
            entry_price: self.entry_price,
            unrealized_profit: self.unrealized_pnl,
            initial_margin: self.initial_margin,
            maint_margin: self.maintenance_margin,
            leverage: self.leverage,
            position_side: PositionSide::Both,
            update_time,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct GrvtOrder {
    pub order_id: String,
    #[serde(default)]
    pub client_order_id: String,
    pub instrument: String,
    pub side: GrvtSide,
    pub order_type: GrvtOrderType,
    #[serde(default)]
    pub state: GrvtOrderState,
    #[serde(default = "zero")]
    pub limit_price: String,
    #[serde(default = "zero")]
    pub size: String,
    #[serde(default = "zero")]
    pub filled_size: String,
    #[serde(default = "zero")]
    pub avg_fill_price: String,
    #[serde(default = "zero")]
    pub trigger_price: String,
    #[serde(default)]
    pub reduce_only: bool,
    #[serde(default)]
    pub time_in_force: Option<GrvtTimeInForce>,
    #[serde(default)]
    pub create_time_ms: i64,
    #[serde(default)]
    pub update_time_ms: i64,
}

impl GrvtOrder {
    pub fn into_order(self) -> Order {
        Order {
            order_id: self.order_id,
            client_order_id: self.client_order_id,
            symbol: self.instrument,
            side: self.side.into(),
            order_type: self.order_type.into(),
            status: self.state.into(),
            price: self.limit_price,
            orig_qty: self.size,
            executed_qty: self.filled_size,
            avg_price: self.avg_fill_price,
            cum_quote: zero(),
            stop_price: self.trigger_price,
            time: self.create_time_ms,
            update_time: self.update_time_ms,
            reduce_only: self.reduce_only,
            close_position: false,
            time_in_force: self.time_in_force.map(TimeInForce::from),
            activation_price: None,
            callback_rate: None,
            position_side: PositionSide::Both,
        }
    }
}

/// Order request body for `POST /api/v1/create_order` (signed).
#[derive(Debug, Serialize)]
pub(super) struct GrvtCreateOrder<'a> {
    pub instrument: &'a str,
    pub side: GrvtSide,
    pub order_type: GrvtOrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_price: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<GrvtTimeInForce>,
    pub reduce_only: bool,
    pub close_position: bool,
    pub client_order_id: &'a str,
}

impl<'a> GrvtCreateOrder<'a> {
    pub fn from_params(params: &'a CreateOrderParams, client_order_id: &'a str) -> Self {
        Self {
            instrument: &params.symbol,
            side: params.side.into(),
            order_type: params.order_type.into(),
            size: params.quantity.as_ref(),
            limit_price: params.price.as_ref(),
            trigger_price: params.stop_price.as_ref(),
            time_in_force: params.time_in_force.map(GrvtTimeInForce::from),
            reduce_only: params.reduce_only.unwrap_or(false),
            close_position: params.close_position.unwrap_or(false),
            client_order_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct GrvtCancelOrder<'a> {
    pub instrument: &'a str,
    pub order_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct GrvtCancelOrders<'a> {
    pub instrument: &'a str,
    pub order_ids: &'a [String],
}

#[derive(Debug, Serialize)]
pub(super) struct GrvtCancelAll<'a> {
    pub instrument: &'a str,
}
