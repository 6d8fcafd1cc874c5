//! AsterDex wire shapes and their canonical mapping.
//!
//! Aster speaks a Binance-futures dialect: camelCase fields, numeric order
//! ids, trailing-stop parameters named `activatePrice`/`priceRate`.

use serde::{Deserialize, Serialize};

use crate::types::{
    now_millis, zero, AccountSnapshot, AssetBalance, CreateOrderParams, Order, OrderSide,
    OrderStatus, OrderType, Position, PositionSide, TimeInForce,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AsterAccountInfo {
    #[serde(default)]
    pub can_trade: Option<bool>,
    #[serde(default)]
    pub can_deposit: Option<bool>,
    #[serde(default)]
    pub can_withdraw: Option<bool>,
    #[serde(default)]
    pub update_time: i64,
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
    pub assets: Vec<AsterAsset>,
    #[serde(default)]
    pub positions: Vec<AsterPosition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AsterAsset {
    pub asset: String,
    #[serde(default = "zero")]
    pub wallet_balance: String,
    #[serde(default = "zero")]
    pub unrealized_profit: String,
    #[serde(default = "zero")]
    pub margin_balance: String,
    #[serde(default = "zero")]
    pub available_balance: String,
    #[serde(default)]
    pub update_time: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AsterPosition {
    pub symbol: String,
    #[serde(default = "zero")]
    pub position_amt: String,
    #[serde(default = "zero")]
    pub entry_price: String,
    #[serde(default = "zero")]
    pub unrealized_profit: String,
    #[serde(default = "zero")]
    pub initial_margin: String,
    #[serde(default = "zero")]
    pub maint_margin: String,
    #[serde(default = "zero")]
    pub leverage: String,
    #[serde(default)]
    pub position_side: PositionSide,
    #[serde(default)]
    pub update_time: i64,
}

impl AsterAccountInfo {
    pub fn into_snapshot(self) -> AccountSnapshot {
        AccountSnapshot {
            can_trade: self.can_trade.unwrap_or(true),
            can_deposit: self.can_deposit.unwrap_or(true),
            can_withdraw: self.can_withdraw.unwrap_or(true),
            update_time: if self.update_time > 0 {
                self.update_time
            } else {
                now_millis()
            },
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
            assets: self.assets.into_iter().map(AsterAsset::into_balance).collect(),
            positions: self
                .positions
                .into_iter()
                .map(AsterPosition::into_position)
                .collect(),
        }
    }
}

impl AsterAsset {
    fn into_balance(self) -> AssetBalance {
        AssetBalance {
            asset: self.asset,
            wallet_balance: self.wallet_balance,
            unrealized_profit: self.unrealized_profit,
            margin_balance: self.margin_balance,
            available_balance: self.available_balance,
            update_time: self.update_time,
        }
    }
}

impl AsterPosition {
    fn into_position(self) -> Position {
        Position {
            symbol: self.symbol,
            position_amt: self.position_amt,
            entry_price: self.entry_price,
            unrealized_profit: self.unrealized_profit,
            initial_margin: self.initial_margin,
            maint_margin: self.maint_margin,
            leverage: self.leverage,
            position_side: self.position_side,
            update_time: self.update_time,
        }
    }
}

/// Order entry as Aster returns it, for both open-order listings and the
/// `POST /fapi/v1/order` ack.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AsterOrder {
    pub order_id: i64,
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
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    #[serde(default)]
    pub activate_price: Option<String>,
    #[serde(default)]
    pub price_rate: Option<String>,
    #[serde(default)]
    pub position_side: PositionSide,
}

impl AsterOrder {
    pub fn into_order(self) -> Order {
        Order {
            order_id: self.order_id.to_string(),
            client_order_id: self.client_order_id,
            symbol: self.symbol,
            side: self.side,
            order_type: self.order_type,
            status: self.status,
            price: self.price,
            orig_qty: self.orig_qty,
            executed_qty: self.executed_qty,
            avg_price: self.avg_price,
            cum_quote: self.cum_quote,
            stop_price: self.stop_price,
            time: self.time,
            update_time: self.update_time,
            reduce_only: self.reduce_only,
            close_position: self.close_position,
            time_in_force: self.time_in_force,
            activation_price: self.activate_price,
            callback_rate: self.price_rate,
            position_side: self.position_side,
        }
    }
}

/// Order request body for `POST /fapi/v1/order` (signed).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AsterOrderRequest<'a> {
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
    pub activate_price: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_rate: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduce_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_position: Option<bool>,
    pub new_client_order_id: &'a str,
}

impl<'a> AsterOrderRequest<'a> {
    pub fn from_params(params: &'a CreateOrderParams, client_order_id: &'a str) -> Self {
        Self {
            symbol: &params.symbol,
            side: params.side,
            order_type: params.order_type,
            quantity: params.quantity.as_ref(),
            price: params.price.as_ref(),
            stop_price: params.stop_price.as_ref(),
            activate_price: params.activation_price.as_ref(),
            price_rate: params.callback_rate.as_ref(),
            time_in_force: params.time_in_force,
            reduce_only: params.reduce_only,
            close_position: params.close_position,
            new_client_order_id: client_order_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AsterCancelOrder<'a> {
    pub symbol: &'a str,
    pub order_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AsterCancelOrders<'a> {
    pub symbol: &'a str,
    pub order_id_list: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AsterCancelAll<'a> {
    pub symbol: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_normalization_maps_nested_entries() {
        let native: AsterAccountInfo = serde_json::from_str(
            r#"{
                "canTrade": true,
                "canWithdraw": false,
                "totalWalletBalance": "5000",
                "assets": [{"asset": "USDT", "walletBalance": "5000"}],
                "positions": [{"symbol": "BTCUSD", "positionAmt": "-0.2", "leverage": "10"}]
            }"#,
        )
        .unwrap();

        let snapshot = native.into_snapshot();
        assert!(snapshot.can_trade);
        assert!(!snapshot.can_withdraw);
        assert_eq!(snapshot.total_wallet_balance, "5000");
        assert_eq!(snapshot.total_margin_balance, "0");
        assert_eq!(snapshot.assets[0].asset, "USDT");
        assert_eq!(snapshot.assets[0].margin_balance, "0");
        assert_eq!(snapshot.positions[0].position_amt, "-0.2");
        assert_eq!(snapshot.positions[0].entry_price, "0");
    }

    #[test]
    fn numeric_order_id_is_stringified() {
        let native: AsterOrder = serde_json::from_str(
            r#"{
                "orderId": 123456789,
                "clientOrderId": "xabc",
                "symbol": "BTCUSD",
                "side": "BUY",
                "type": "TRAILING_STOP_MARKET",
                "status": "NEW",
                "activatePrice": "60000",
                "priceRate": "0.5"
            }"#,
        )
        .unwrap();

        let order = native.into_order();
        assert_eq!(order.order_id, "123456789");
        assert_eq!(order.activation_price.as_deref(), Some("60000"));
        assert_eq!(order.callback_rate.as_deref(), Some("0.5"));
    }

    #[test]
    fn order_request_uses_aster_field_names() {
        let mut params = CreateOrderParams::limit("BTCUSD", OrderSide::Buy, "1", "64000");
        params.activation_price = Some("63000".into());
        params.callback_rate = Some("1".into());

        let request = AsterOrderRequest::from_params(&params, "xid");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["newClientOrderId"], "xid");
        assert_eq!(json["activatePrice"], "63000");
        assert_eq!(json["priceRate"], "1");
        assert!(json.get("activationPrice").is_none());
    }
}
