//! Hyperliquid wire shapes and their canonical mapping.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{
    now_millis, zero, AccountSnapshot, AssetBalance, CreateOrderParams, Order, OrderSide,
    OrderStatus, OrderType, Position, PositionSide, TimeInForce,
};

/// Account payload from `GET /info`. Field names already match the
/// canonical snapshot; normalization fills whatever is absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HlAccountInfo {
    #[serde(default)]
    pub total_wallet_balance: Option<String>,
    #[serde(default)]
    pub total_unrealized_profit: Option<String>,
    #[serde(default)]
    pub total_margin_balance: Option<String>,
    #[serde(default)]
    pub total_initial_margin: Option<String>,
    #[serde(default)]
    pub total_maint_margin: Option<String>,
    #[serde(default)]
    pub total_position_initial_margin: Option<String>,
    #[serde(default)]
    pub total_open_order_initial_margin: Option<String>,
    #[serde(default)]
    pub total_cross_wallet_balance: Option<String>,
    #[serde(default)]
    pub total_cross_un_pnl: Option<String>,
    #[serde(default)]
    pub available_balance: Option<String>,
    #[serde(default)]
    pub max_withdraw_amount: Option<String>,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub assets: Vec<AssetBalance>,
}

impl HlAccountInfo {
    /// Hyperliquid always allows trade/deposit/withdraw on a live account,
    /// so the permission flags stay permissive.
    pub fn into_snapshot(self) -> AccountSnapshot {
        AccountSnapshot {
            update_time: now_millis(),
            total_wallet_balance: self.total_wallet_balance.unwrap_or_else(zero),
            total_unrealized_profit: self.total_unrealized_profit.unwrap_or_else(zero),
            total_margin_balance: self.total_margin_balance.unwrap_or_else(zero),
            total_initial_margin: self.total_initial_margin.unwrap_or_else(zero),
            total_maint_margin: self.total_maint_margin.unwrap_or_else(zero),
            total_position_initial_margin: self.total_position_initial_margin.unwrap_or_else(zero),
            total_open_order_initial_margin: self
                .total_open_order_initial_margin
                .unwrap_or_else(zero),
            total_cross_wallet_balance: self.total_cross_wallet_balance.unwrap_or_else(zero),
            total_cross_un_pnl: self.total_cross_un_pnl.unwrap_or_else(zero),
            available_balance: self.available_balance.unwrap_or_else(zero),
            max_withdraw_amount: self.max_withdraw_amount.unwrap_or_else(zero),
            positions: self.positions,
            assets: self.assets,
            ..AccountSnapshot::empty()
        }
    }
}

/// Open order from `GET /orders`. The id arrives as either `orderId` or
/// `id`, numeric or string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HlOrder {
    #[serde(default)]
    pub order_id: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
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
    pub quantity: String,
    #[serde(default = "zero")]
    pub executed_qty: String,
    #[serde(default = "zero")]
    pub avg_price: String,
    #[serde(default = "zero")]
    pub stop_price: String,
    #[serde(default)]
    pub reduce_only: bool,
    #[serde(default)]
    pub close_position: bool,
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub update_time: i64,
}

impl HlOrder {
    pub fn into_order(self) -> Order {
        let order_id = id_string(self.order_id.as_ref())
            .or_else(|| id_string(self.id.as_ref()))
            .unwrap_or_default();
        Order {
            order_id,
            client_order_id: self.client_order_id,
            symbol: self.symbol,
            side: self.side,
            order_type: self.order_type,
            status: self.status,
            price: self.price,
            orig_qty: self.quantity,
            executed_qty: self.executed_qty,
            avg_price: self.avg_price,
            cum_quote: zero(),
            stop_price: self.stop_price,
            time: self.time,
            update_time: self.update_time,
            reduce_only: self.reduce_only,
            close_position: self.close_position,
            time_in_force: self.time_in_force,
            activation_price: None,
            callback_rate: None,
            position_side: PositionSide::Both,
        }
    }
}

/// Ack for `POST /order`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HlOrderAck {
    #[serde(default)]
    pub order_id: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub client_order_id: Option<String>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// Order request body for `POST /order` (signed).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HlOrderRequest<'a> {
    pub symbol: &'a str,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_price: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_rate: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    pub reduce_only: bool,
    pub close_position: bool,
    pub client_order_id: &'a str,
}

impl<'a> HlOrderRequest<'a> {
    pub fn from_params(params: &'a CreateOrderParams, client_order_id: &'a str) -> Self {
        Self {
            symbol: &params.symbol,
            side: params.side,
            order_type: params.order_type,
            quantity: params.quantity.as_ref(),
            price: params.price.as_ref(),
            stop_price: params.stop_price.as_ref(),
            activation_price: params.activation_price.as_ref(),
            callback_rate: params.callback_rate.as_ref(),
            time_in_force: params.time_in_force,
            reduce_only: params.reduce_only.unwrap_or(false),
            close_position: params.close_position.unwrap_or(false),
            client_order_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HlCancelOrder<'a> {
    pub symbol: &'a str,
    pub order_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HlCancelOrders<'a> {
    pub symbol: &'a str,
    pub order_id_list: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HlCancelAll<'a> {
    pub symbol: &'a str,
}

/// Canonical order assembled from the request parameters and the ack, the
/// same way the exchange echoes a fresh order back.
pub(super) fn order_from_ack(
    params: &CreateOrderParams,
    client_order_id: &str,
    ack: HlOrderAck,
) -> Order {
    let now = now_millis();
    Order {
        order_id: id_string(ack.order_id.as_ref())
            .or_else(|| id_string(ack.id.as_ref()))
            .unwrap_or_default(),
        client_order_id: ack
            .client_order_id
            .unwrap_or_else(|| client_order_id.to_owned()),
        symbol: params.symbol.clone(),
        side: params.side,
        order_type: params.order_type,
        status: ack.status.unwrap_or_default(),
        price: params.price.clone().unwrap_or_else(zero),
        orig_qty: params.quantity.clone().unwrap_or_else(zero),
        executed_qty: zero(),
        avg_price: zero(),
        cum_quote: zero(),
        stop_price: params.stop_price.clone().unwrap_or_else(zero),
        time: now,
        update_time: now,
        reduce_only: params.reduce_only.unwrap_or(false),
        close_position: params.close_position.unwrap_or(false),
        time_in_force: params.time_in_force,
        activation_price: params.activation_price.clone(),
        callback_rate: params.callback_rate.clone(),
        position_side: PositionSide::Both,
    }
}

fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_normalization_fills_defaults() {
        let native: HlAccountInfo =
            serde_json::from_str(r#"{"totalWalletBalance": "812.4"}"#).unwrap();
        let snapshot = native.into_snapshot();

        assert_eq!(snapshot.total_wallet_balance, "812.4");
        assert_eq!(snapshot.total_unrealized_profit, "0");
        assert_eq!(snapshot.available_balance, "0");
        assert!(snapshot.can_trade);
        assert!(snapshot.update_time > 0);
    }

    #[test]
    fn order_id_accepts_number_or_string() {
        let native: HlOrder = serde_json::from_str(
            r#"{"orderId": 9912, "symbol": "BTCUSD", "side": "BUY", "type": "LIMIT"}"#,
        )
        .unwrap();
        assert_eq!(native.into_order().order_id, "9912");

        let native: HlOrder = serde_json::from_str(
            r#"{"id": "abc-1", "symbol": "BTCUSD", "side": "BUY", "type": "LIMIT"}"#,
        )
        .unwrap();
        assert_eq!(native.into_order().order_id, "abc-1");
    }

    #[test]
    fn ack_order_reflects_request_parameters() {
        let params = CreateOrderParams::limit("BTCUSD", OrderSide::Sell, "0.25", "64100");
        let ack: HlOrderAck = serde_json::from_str(r#"{"orderId": 7, "status": "NEW"}"#).unwrap();

        let order = order_from_ack(&params, "client-9", ack);
        assert_eq!(order.order_id, "7");
        assert_eq!(order.client_order_id, "client-9");
        assert_eq!(order.orig_qty, "0.25");
        assert_eq!(order.price, "64100");
        assert_eq!(order.executed_qty, "0");
        assert_eq!(order.status, OrderStatus::New);
    }
}
