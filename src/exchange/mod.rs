//! Exchange abstraction layer.
//!
//! ## Adding a New Exchange
//!
//! 1. Create a module under `exchange/<name>/` with a gateway owning the
//!    HTTP client, WebSocket stream, signing identity, and listener registry
//! 2. Implement [`ExchangeAdapter`] as a thin symbol-bound wrapper over the
//!    gateway
//! 3. Add the identifier to [`ExchangeId`] and the adapter to the factory
//!
//! Callers only see `Box<dyn ExchangeAdapter>` from [`create_adapter`], so
//! nothing outside this module can depend on exchange-specific details.

pub mod aster;
mod factory;
pub mod grvt;
mod http;
pub mod hyperliquid;
mod stream;
mod subscription;

pub use factory::{create_adapter, display_name, resolve_exchange_id, AdapterOptions};
pub use stream::StreamFrame;
pub use subscription::SubscriptionToken;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AccountSnapshot, CreateOrderParams, Depth, Kline, Order, Ticker};

/// Identifier of a supported exchange backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeId {
    Aster,
    Grvt,
    Hyperliquid,
}

impl ExchangeId {
    /// The lower-case identifier used in configuration and environment
    /// variables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aster => "aster",
            Self::Grvt => "grvt",
            Self::Hyperliquid => "hyperliquid",
        }
    }

    /// Parse a normalized (trimmed, lower-case) identifier.
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "aster" => Some(Self::Aster),
            "grvt" => Some(Self::Grvt),
            "hyperliquid" => Some(Self::Hyperliquid),
            _ => None,
        }
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback invoked with each account snapshot pushed over the stream.
pub type AccountCallback = Arc<dyn Fn(&AccountSnapshot) + Send + Sync>;
/// Callback invoked with each order-update batch pushed over the stream.
pub type OrdersCallback = Arc<dyn Fn(&[Order]) + Send + Sync>;
/// Callback invoked with each depth snapshot for a subscribed symbol.
pub type DepthCallback = Arc<dyn Fn(&Depth) + Send + Sync>;
/// Callback invoked with each ticker for a subscribed symbol.
pub type TickerCallback = Arc<dyn Fn(&Ticker) + Send + Sync>;
/// Callback invoked with each kline batch for a subscribed symbol+interval.
pub type KlinesCallback = Arc<dyn Fn(&[Kline]) + Send + Sync>;

/// The shared capability set every exchange backend provides.
///
/// Adapters are bound to one trading symbol at construction; REST operations
/// and subscriptions apply to that symbol unless a parameter says otherwise.
/// All write operations require a signing identity and fail with a
/// [`crate::ConfigError`] before any network activity when none is
/// configured.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync {
    /// Which backend this adapter targets.
    fn id(&self) -> ExchangeId;

    /// The trading symbol this adapter is bound to.
    fn symbol(&self) -> &str;

    /// Idempotent readiness probe: one account-info fetch on first use, a
    /// no-op afterwards. A failure leaves the adapter not-ready; callers
    /// retry explicitly.
    async fn initialize(&self) -> Result<()>;

    /// Fetch the normalized account snapshot.
    async fn account(&self) -> Result<AccountSnapshot>;

    /// Fetch open orders for the bound symbol.
    async fn open_orders(&self) -> Result<Vec<Order>>;

    /// Place an order. An empty `params.symbol` is replaced with the bound
    /// symbol.
    async fn create_order(&self, params: CreateOrderParams) -> Result<Order>;

    /// Cancel one order by exchange order id.
    async fn cancel_order(&self, order_id: &str) -> Result<()>;

    /// Cancel a batch of orders by exchange order id.
    async fn cancel_orders(&self, order_ids: &[String]) -> Result<()>;

    /// Cancel every open order on the bound symbol.
    async fn cancel_all_orders(&self) -> Result<()>;

    /// Register for account snapshots pushed over the stream.
    fn subscribe_account(&self, callback: AccountCallback) -> SubscriptionToken;

    /// Register for order updates pushed over the stream.
    fn subscribe_orders(&self, callback: OrdersCallback) -> SubscriptionToken;

    /// Register for depth snapshots on the bound symbol.
    fn subscribe_depth(&self, callback: DepthCallback) -> SubscriptionToken;

    /// Register for tickers on the bound symbol.
    fn subscribe_ticker(&self, callback: TickerCallback) -> SubscriptionToken;

    /// Register for klines on the bound symbol at `interval`.
    fn subscribe_klines(&self, interval: &str, callback: KlinesCallback) -> SubscriptionToken;

    /// Remove a registration. Returns `false` if the token was already gone.
    fn unsubscribe(&self, token: SubscriptionToken) -> bool;

    /// Idempotent teardown: stops reconnection, closes the stream, clears
    /// the ready flag. In-flight REST calls still return to their callers.
    fn destroy(&self);
}
