//! Canonical shapes shared by every exchange gateway.
//!
//! Price and quantity fields are decimal strings so no precision is lost in
//! transit; market-data types expose parsed [`rust_decimal::Decimal`]
//! accessors for calling trading logic. Gateways must always populate these
//! shapes fully: numeric fields missing from an exchange payload default to
//! `"0"`, and permission flags default to `true` only where the source
//! exchange always allows the operation.

mod account;
mod market;
mod order;

pub use account::{AccountSnapshot, AssetBalance, Position};
pub use market::{Depth, Kline, PriceLevel, Ticker};
pub use order::{
    CreateOrderParams, Order, OrderSide, OrderStatus, OrderType, PositionSide, TimeInForce,
};

/// Serde default for decimal-string fields.
pub(crate) fn zero() -> String {
    "0".to_owned()
}

pub(crate) fn permissive() -> bool {
    true
}

/// Current wall-clock time in milliseconds, the unit every exchange uses.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
