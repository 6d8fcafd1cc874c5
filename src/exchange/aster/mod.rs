//! AsterDex backend: Binance-style wire shapes, HMAC-SHA256 API-key signing.

mod adapter;
mod gateway;
mod messages;

pub use adapter::AsterAdapter;
pub use gateway::{AsterCredentials, AsterGateway, AsterGatewayOptions};
