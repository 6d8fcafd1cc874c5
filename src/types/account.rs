//! Canonical account snapshot.

use serde::{Deserialize, Serialize};

use super::{now_millis, permissive, zero, PositionSide};

/// Exchange-neutral account state: permissions, balances, and open positions.
///
/// Every field is present even when the source exchange omits it; see the
/// module docs for the defaulting rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    #[serde(default = "permissive")]
    pub can_trade: bool,
    #[serde(default = "permissive")]
    pub can_deposit: bool,
    #[serde(default = "permissive")]
    pub can_withdraw: bool,
    #[serde(default)]
    pub update_time: i64,
    #[serde(default = "zero")]
    pub total_wallet_balance: String,
    #[serde(default = "zero")]
    pub total_unrealized_profit: String,
    #[serde(default = "zero")]
    pub total_margin_balance: String,
    #[serde(default = "zero")]
    pub total_initial_margin: String,
    #[serde(default = "zero")]
    pub total_maint_margin: String,
    #[serde(default = "zero")]
    pub total_position_initial_margin: String,
    #[serde(default = "zero")]
    pub total_open_order_initial_margin: String,
    #[serde(default = "zero")]
    pub total_cross_wallet_balance: String,
    #[serde(default = "zero")]
    pub total_cross_un_pnl: String,
    #[serde(default = "zero")]
    pub available_balance: String,
    #[serde(default = "zero")]
    pub max_withdraw_amount: String,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub assets: Vec<AssetBalance>,
}

impl AccountSnapshot {
    /// A fully-defaulted snapshot stamped with the current time.
    ///
    /// Gateways build normalized snapshots with struct-update syntax on top
    /// of this so unmapped fields keep their canonical defaults.
    pub fn empty() -> Self {
        Self {
            can_trade: true,
            can_deposit: true,
            can_withdraw: true,
            update_time: now_millis(),
            total_wallet_balance: zero(),
            total_unrealized_profit: zero(),
            total_margin_balance: zero(),
            total_initial_margin: zero(),
            total_maint_margin: zero(),
            total_position_initial_margin: zero(),
            total_open_order_initial_margin: zero(),
            total_cross_wallet_balance: zero(),
            total_cross_un_pnl: zero(),
            available_balance: zero(),
            max_withdraw_amount: zero(),
            positions: Vec::new(),
            assets: Vec::new(),
        }
    }
}

/// A single open position within an account snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
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

/// Per-asset balance within an account snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBalance {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_defaults_fill_missing_fields() {
        let snapshot: AccountSnapshot = serde_json::from_str("{}").unwrap();

        assert!(snapshot.can_trade);
        assert!(snapshot.can_deposit);
        assert!(snapshot.can_withdraw);
        assert_eq!(snapshot.total_wallet_balance, "0");
        assert_eq!(snapshot.available_balance, "0");
        assert!(snapshot.positions.is_empty());
        assert!(snapshot.assets.is_empty());
    }

    #[test]
    fn snapshot_keeps_provided_fields() {
        let snapshot: AccountSnapshot = serde_json::from_str(
            r#"{
                "canTrade": false,
                "totalWalletBalance": "1250.5",
                "positions": [{"symbol": "BTCUSD", "positionAmt": "0.4"}]
            }"#,
        )
        .unwrap();

        assert!(!snapshot.can_trade);
        assert_eq!(snapshot.total_wallet_balance, "1250.5");
        assert_eq!(snapshot.positions.len(), 1);
        assert_eq!(snapshot.positions[0].symbol, "BTCUSD");
        assert_eq!(snapshot.positions[0].position_amt, "0.4");
        assert_eq!(snapshot.positions[0].entry_price, "0");
    }

    #[test]
    fn empty_snapshot_is_stamped() {
        let snapshot = AccountSnapshot::empty();
        assert!(snapshot.update_time > 0);
        assert_eq!(snapshot.total_margin_balance, "0");
    }
}
