//! Crossdex - Exchange-agnostic trading gateway.
//!
//! This crate gives trading logic a single interface for account, order, and
//! market-data operations across perpetual crypto exchanges that each expose
//! different REST and WebSocket protocols.
//!
//! # Architecture
//!
//! Every supported exchange is wrapped by a *gateway* that owns the network
//! connections, request signing, and payload normalization for that backend.
//! A thin *adapter* exposes the shared capability set on top of its gateway:
//!
//! - **[`exchange`]** - The [`ExchangeAdapter`] trait, the adapter factory,
//!   and one module per backend (`aster`, `grvt`, `hyperliquid`)
//! - **[`types`]** - Canonical shapes: account snapshot, orders, depth,
//!   ticker, klines
//! - **[`error`]** - Error taxonomy for the crate
//!
//! Callers obtain an adapter from [`create_adapter`] and never depend on
//! exchange-specific details; the factory resolves the target backend from an
//! explicit argument, the `EXCHANGE`/`TRADE_EXCHANGE` environment variables,
//! or the default.
//!
//! REST calls return normalized data directly. Market data arrives over one
//! persistent WebSocket connection per gateway; callbacks registered through
//! the `subscribe_*` methods are invoked as frames arrive, and the connection
//! reconnects on a fixed delay after a drop until the adapter is destroyed.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use crossdex::{create_adapter, AdapterOptions};
//! use crossdex::exchange::hyperliquid::HyperliquidCredentials;
//! use crossdex::types::Depth;
//!
//! # async fn demo() -> crossdex::Result<()> {
//! let adapter = create_adapter(AdapterOptions {
//!     symbol: "BTCUSD".into(),
//!     exchange: Some("hyperliquid".into()),
//!     hyperliquid: Some(HyperliquidCredentials {
//!         wallet_address: Some("0x...".into()),
//!         private_key: Some("0x...".into()),
//!     }),
//!     ..Default::default()
//! })?;
//!
//! adapter.initialize().await?;
//! adapter.subscribe_depth(Arc::new(|depth: &Depth| {
//!     println!("best bid: {:?}", depth.best_bid());
//! }));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod exchange;
pub mod types;

pub use error::{ConfigError, Error, Result};
pub use exchange::{
    create_adapter, display_name, resolve_exchange_id, AdapterOptions, ExchangeAdapter,
    ExchangeId, SubscriptionToken,
};
