//! Hyperliquid backend: flat JSON wire shapes, EVM wallet signing.

mod adapter;
mod gateway;
mod messages;

pub use adapter::HyperliquidAdapter;
pub use gateway::{HyperliquidCredentials, HyperliquidGateway, HyperliquidGatewayOptions};
