//! Hyperliquid gateway: REST client, WebSocket stream, wallet signing.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use super::messages::{
    order_from_ack, HlAccountInfo, HlCancelAll, HlCancelOrder, HlCancelOrders, HlOrder, HlOrderAck,
    HlOrderRequest,
};
use crate::error::{ConfigError, Error, Result};
use crate::exchange::http::{decode_response, expect_success};
use crate::exchange::stream::{MarketStream, RECONNECT_DELAY};
use crate::exchange::subscription::ListenerRegistry;
use crate::exchange::{
    AccountCallback, DepthCallback, KlinesCallback, OrdersCallback, SubscriptionToken,
    TickerCallback,
};
use crate::types::{AccountSnapshot, CreateOrderParams, Order};

const EXCHANGE: &str = "hyperliquid";
const DEFAULT_BASE_URL: &str = "https://api.hyperliquid.xyz";
const DEFAULT_WS_URL: &str = "wss://api.hyperliquid.xyz/ws";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Wallet credentials. The private key is the signing identity for every
/// authenticated write.
#[derive(Clone, Default)]
pub struct HyperliquidCredentials {
    pub wallet_address: Option<String>,
    pub private_key: Option<String>,
}

impl fmt::Debug for HyperliquidCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperliquidCredentials")
            .field("wallet_address", &self.wallet_address)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Construction options; URL and delay overrides exist for tests.
#[derive(Debug, Clone, Default)]
pub struct HyperliquidGatewayOptions {
    pub credentials: HyperliquidCredentials,
    pub base_url: Option<String>,
    pub ws_url: Option<String>,
    pub reconnect_delay: Option<Duration>,
}

pub struct HyperliquidGateway {
    http: reqwest::Client,
    base_url: String,
    credentials: HyperliquidCredentials,
    signer: Option<PrivateKeySigner>,
    ready: Arc<AtomicBool>,
    registry: Arc<ListenerRegistry>,
    stream: MarketStream,
}

impl HyperliquidGateway {
    /// Build the gateway. Derives the signing identity when a private key
    /// is supplied; does not open the WebSocket connection.
    pub fn new(options: HyperliquidGatewayOptions) -> Result<Self> {
        let signer = options
            .credentials
            .private_key
            .as_deref()
            .map(|key| {
                PrivateKeySigner::from_str(key).map_err(|e| ConfigError::InvalidValue {
                    field: "private_key",
                    reason: e.to_string(),
                })
            })
            .transpose()?;
        if let Some(signer) = &signer {
            info!(exchange = EXCHANGE, address = %signer.address(), "signing identity ready");
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        let base_url = options
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let ws_url = options.ws_url.unwrap_or_else(|| DEFAULT_WS_URL.to_owned());

        let ready = Arc::new(AtomicBool::new(false));
        let registry = Arc::new(ListenerRegistry::new(EXCHANGE));
        let stream = MarketStream::new(
            EXCHANGE,
            ws_url,
            options.reconnect_delay.unwrap_or(RECONNECT_DELAY),
            Arc::clone(&ready),
            Arc::clone(&registry),
        );

        Ok(Self {
            http,
            base_url,
            credentials: options.credentials,
            signer,
            ready,
            registry,
            stream,
        })
    }

    pub fn has_signing_identity(&self) -> bool {
        self.signer.is_some()
    }

    /// Address derived from the signing key, when one is configured.
    pub fn signer_address(&self) -> Option<alloy_primitives::Address> {
        self.signer.as_ref().map(PrivateKeySigner::address)
    }

    pub fn wallet_address(&self) -> Option<&str> {
        self.credentials.wallet_address.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Idempotent readiness probe: one account-info fetch on first use.
    /// A failure leaves the ready flag unset; the caller retries explicitly.
    pub async fn ensure_initialized(&self, symbol: &str) -> Result<()> {
        if self.ready.load(Ordering::SeqCst) {
            return Ok(());
        }
        match self.get_account_info().await {
            Ok(_) => {
                self.ready.store(true, Ordering::SeqCst);
                info!(exchange = EXCHANGE, symbol, "gateway initialized");
                Ok(())
            }
            Err(e) => {
                error!(exchange = EXCHANGE, symbol, error = %e, "initialization failed");
                Err(e)
            }
        }
    }

    pub async fn get_account_info(&self) -> Result<AccountSnapshot> {
        logged("get_account_info", async {
            let url = format!("{}/info", self.base_url);
            let response = self.http.get(&url).send().await?;
            let native: HlAccountInfo =
                decode_response(EXCHANGE, "get_account_info", response).await?;
            Ok(native.into_snapshot())
        })
        .await
    }

    pub async fn get_open_orders(&self, symbol: &str) -> Result<Vec<Order>> {
        logged("get_open_orders", async {
            let url = format!("{}/orders?symbol={}", self.base_url, symbol);
            let response = self.http.get(&url).send().await?;
            let native: Vec<HlOrder> =
                decode_response(EXCHANGE, "get_open_orders", response).await?;
            Ok(native.into_iter().map(HlOrder::into_order).collect())
        })
        .await
    }

    pub async fn create_order(&self, params: &CreateOrderParams) -> Result<Order> {
        logged("create_order", async {
            let client_order_id = params.client_order_id_or_generated();
            let request = HlOrderRequest::from_params(params, &client_order_id);
            let response = self.signed_post("create_order", "/order", &request).await?;
            let ack: HlOrderAck = decode_response(EXCHANGE, "create_order", response).await?;
            Ok(order_from_ack(params, &client_order_id, ack))
        })
        .await
    }

    pub async fn cancel_order(&self, symbol: &str, order_id: &str) -> Result<()> {
        logged("cancel_order", async {
            let body = HlCancelOrder { symbol, order_id };
            let response = self.signed_post("cancel_order", "/cancel-order", &body).await?;
            expect_success(EXCHANGE, "cancel_order", response).await
        })
        .await
    }

    pub async fn cancel_orders(&self, symbol: &str, order_ids: &[String]) -> Result<()> {
        logged("cancel_orders", async {
            let body = HlCancelOrders {
                symbol,
                order_id_list: order_ids,
            };
            let response = self
                .signed_post("cancel_orders", "/cancel-orders", &body)
                .await?;
            expect_success(EXCHANGE, "cancel_orders", response).await
        })
        .await
    }

    pub async fn cancel_all_orders(&self, symbol: &str) -> Result<()> {
        logged("cancel_all_orders", async {
            let body = HlCancelAll { symbol };
            let response = self
                .signed_post("cancel_all_orders", "/cancel-all-orders", &body)
                .await?;
            expect_success(EXCHANGE, "cancel_all_orders", response).await
        })
        .await
    }

    /// Sign the canonical JSON encoding of `body` with the wallet key and
    /// POST it with the signature appended. Fails with a configuration
    /// error before any network activity when no identity is configured.
    async fn signed_post<B: Serialize>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let signer = self.signer.as_ref().ok_or(ConfigError::SignerUnavailable {
            exchange: EXCHANGE,
            operation,
        })?;

        let canonical = serde_json::to_string(body)?;
        let signature = signer
            .sign_message_sync(canonical.as_bytes())
            .map_err(|e| Error::Signing(e.to_string()))?;

        let mut payload = serde_json::to_value(body)?;
        let Some(object) = payload.as_object_mut() else {
            return Err(Error::Signing("request body must be a JSON object".into()));
        };
        object.insert(
            "signature".into(),
            json!(format!("0x{}", hex::encode(signature.as_bytes()))),
        );

        let url = format!("{}{}", self.base_url, path);
        Ok(self.http.post(&url).json(&payload).send().await?)
    }

    // --- Subscriptions ---

    pub fn on_account(&self, callback: AccountCallback) -> SubscriptionToken {
        let token = self.registry.on_account(callback);
        self.stream.connect();
        token
    }

    pub fn on_orders(&self, callback: OrdersCallback) -> SubscriptionToken {
        let token = self.registry.on_orders(callback);
        self.stream.connect();
        token
    }

    pub fn on_depth(&self, symbol: &str, callback: DepthCallback) -> SubscriptionToken {
        let token = self.registry.on_depth(symbol, callback);
        self.stream.connect();
        token
    }

    pub fn on_ticker(&self, symbol: &str, callback: TickerCallback) -> SubscriptionToken {
        let token = self.registry.on_ticker(symbol, callback);
        self.stream.connect();
        token
    }

    pub fn on_klines(
        &self,
        symbol: &str,
        interval: &str,
        callback: KlinesCallback,
    ) -> SubscriptionToken {
        let token = self.registry.on_klines(symbol, interval, callback);
        self.stream.connect();
        token
    }

    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        self.registry.unsubscribe(token)
    }

    /// Open the WebSocket connection without registering a listener.
    pub fn connect(&self) {
        self.stream.connect();
    }

    /// Idempotent teardown; see [`crate::exchange::ExchangeAdapter::destroy`].
    pub fn destroy(&self) {
        self.stream.destroy();
    }
}

async fn logged<T>(operation: &'static str, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match fut.await {
        Ok(value) => Ok(value),
        Err(e) => {
            error!(exchange = EXCHANGE, operation, error = %e, "operation failed");
            Err(e)
        }
    }
}
