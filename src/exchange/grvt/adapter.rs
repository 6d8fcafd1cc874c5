//! Symbol-bound adapter over the GRVT gateway.

use async_trait::async_trait;

use super::gateway::{GrvtCredentials, GrvtGateway, GrvtGatewayOptions};
use crate::error::Result;
use crate::exchange::{
    AccountCallback, DepthCallback, ExchangeAdapter, ExchangeId, KlinesCallback, OrdersCallback,
    SubscriptionToken, TickerCallback,
};
use crate::types::{AccountSnapshot, CreateOrderParams, Order};

pub struct GrvtAdapter {
    gateway: GrvtGateway,
    symbol: String,
}

impl GrvtAdapter {
    pub fn new(symbol: impl Into<String>, credentials: GrvtCredentials) -> Result<Self> {
        Self::with_options(
            symbol,
            GrvtGatewayOptions {
                credentials,
                ..Default::default()
            },
        )
    }

    pub fn with_options(symbol: impl Into<String>, options: GrvtGatewayOptions) -> Result<Self> {
        Ok(Self {
            gateway: GrvtGateway::new(options)?,
            symbol: symbol.into(),
        })
    }

    pub fn gateway(&self) -> &GrvtGateway {
        &self.gateway
    }
}

#[async_trait]
impl ExchangeAdapter for GrvtAdapter {
    fn id(&self) -> ExchangeId {
        ExchangeId::Grvt
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    async fn initialize(&self) -> Result<()> {
        self.gateway.ensure_initialized(&self.symbol).await
    }

    async fn account(&self) -> Result<AccountSnapshot> {
        self.gateway.get_account_info().await
    }

    async fn open_orders(&self) -> Result<Vec<Order>> {
        self.gateway.get_open_orders(&self.symbol).await
    }

    async fn create_order(&self, mut params: CreateOrderParams) -> Result<Order> {
        if params.symbol.is_empty() {
            params.symbol = self.symbol.clone();
        }
        self.gateway.create_order(&params).await
    }

    async fn cancel_order(&self, order_id: &str) -> Result<()> {
        self.gateway.cancel_order(&self.symbol, order_id).await
    }

    async fn cancel_orders(&self, order_ids: &[String]) -> Result<()> {
        self.gateway.cancel_orders(&self.symbol, order_ids).await
    }

    async fn cancel_all_orders(&self) -> Result<()> {
        self.gateway.cancel_all_orders(&self.symbol).await
    }

    fn subscribe_account(&self, callback: AccountCallback) -> SubscriptionToken {
        self.gateway.on_account(callback)
    }

    fn subscribe_orders(&self, callback: OrdersCallback) -> SubscriptionToken {
        self.gateway.on_orders(callback)
    }

    fn subscribe_depth(&self, callback: DepthCallback) -> SubscriptionToken {
        self.gateway.on_depth(&self.symbol, callback)
    }

    fn subscribe_ticker(&self, callback: TickerCallback) -> SubscriptionToken {
        self.gateway.on_ticker(&self.symbol, callback)
    }

    fn subscribe_klines(&self, interval: &str, callback: KlinesCallback) -> SubscriptionToken {
        self.gateway.on_klines(&self.symbol, interval, callback)
    }

    fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        self.gateway.unsubscribe(token)
    }

    fn destroy(&self) {
        self.gateway.destroy();
    }
}
