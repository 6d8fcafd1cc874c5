//! AsterDex gateway: REST client, WebSocket stream, HMAC-SHA256 signing.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use serde_json::json;
use sha2::Sha256;
use tracing::{error, info};

use super::messages::{
    AsterAccountInfo, AsterCancelAll, AsterCancelOrder, AsterCancelOrders, AsterOrder,
    AsterOrderRequest,
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

const EXCHANGE: &str = "aster";
const DEFAULT_BASE_URL: &str = "https://fapi.asterdex.com";
const DEFAULT_WS_URL: &str = "wss://fstream.asterdex.com/ws";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const API_KEY_HEADER: &str = "x-mbx-apikey";

type HmacSha256 = Hmac<Sha256>;

/// API-key credentials. Both key and secret are needed to sign writes; the
/// key alone authenticates read endpoints.
#[derive(Clone, Default)]
pub struct AsterCredentials {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

impl fmt::Debug for AsterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsterCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Construction options; URL and delay overrides exist for tests.
#[derive(Debug, Clone, Default)]
pub struct AsterGatewayOptions {
    pub credentials: AsterCredentials,
    pub base_url: Option<String>,
    pub ws_url: Option<String>,
    pub reconnect_delay: Option<Duration>,
}

/// HMAC signing identity derived from the API secret.
struct HmacIdentity {
    secret: String,
}

impl HmacIdentity {
    fn sign(&self, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

pub struct AsterGateway {
    http: reqwest::Client,
    base_url: String,
    identity: Option<HmacIdentity>,
    ready: Arc<AtomicBool>,
    registry: Arc<ListenerRegistry>,
    stream: MarketStream,
}

impl AsterGateway {
    /// Build the gateway. The API key, when present, rides along as a
    /// default header on every request; the secret becomes the signing
    /// identity. The WebSocket is not opened here.
    pub fn new(options: AsterGatewayOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(api_key) = options.credentials.api_key.as_deref() {
            let value = HeaderValue::from_str(api_key).map_err(|e| ConfigError::InvalidValue {
                field: "api_key",
                reason: e.to_string(),
            })?;
            headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        let identity = match (
            options.credentials.api_key.as_deref(),
            options.credentials.api_secret.clone(),
        ) {
            (Some(_), Some(secret)) => Some(HmacIdentity { secret }),
            _ => None,
        };

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
            identity,
            ready,
            registry,
            stream,
        })
    }

    pub fn has_signing_identity(&self) -> bool {
        self.identity.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Idempotent readiness probe; see the module docs.
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
            let url = format!("{}/fapi/v2/account", self.base_url);
            let response = self.http.get(&url).send().await?;
            let native: AsterAccountInfo =
                decode_response(EXCHANGE, "get_account_info", response).await?;
            Ok(native.into_snapshot())
        })
        .await
    }

    pub async fn get_open_orders(&self, symbol: &str) -> Result<Vec<Order>> {
        logged("get_open_orders", async {
            let url = format!("{}/fapi/v1/openOrders?symbol={}", self.base_url, symbol);
            let response = self.http.get(&url).send().await?;
            let native: Vec<AsterOrder> =
                decode_response(EXCHANGE, "get_open_orders", response).await?;
            Ok(native.into_iter().map(AsterOrder::into_order).collect())
        })
        .await
    }

    pub async fn create_order(&self, params: &CreateOrderParams) -> Result<Order> {
        logged("create_order", async {
            let client_order_id = params.client_order_id_or_generated();
            let request = AsterOrderRequest::from_params(params, &client_order_id);
            let response = self
                .signed_post("create_order", "/fapi/v1/order", &request)
                .await?;
            let ack: AsterOrder = decode_response(EXCHANGE, "create_order", response).await?;
            Ok(ack.into_order())
        })
        .await
    }

    pub async fn cancel_order(&self, symbol: &str, order_id: &str) -> Result<()> {
        logged("cancel_order", async {
            let body = AsterCancelOrder { symbol, order_id };
            let response = self
                .signed_post("cancel_order", "/fapi/v1/cancelOrder", &body)
                .await?;
            expect_success(EXCHANGE, "cancel_order", response).await
        })
        .await
    }

    pub async fn cancel_orders(&self, symbol: &str, order_ids: &[String]) -> Result<()> {
        logged("cancel_orders", async {
            let body = AsterCancelOrders {
                symbol,
                order_id_list: order_ids,
            };
            let response = self
                .signed_post("cancel_orders", "/fapi/v1/cancelBatchOrders", &body)
                .await?;
            expect_success(EXCHANGE, "cancel_orders", response).await
        })
        .await
    }

    pub async fn cancel_all_orders(&self, symbol: &str) -> Result<()> {
        logged("cancel_all_orders", async {
            let body = AsterCancelAll { symbol };
            let response = self
                .signed_post("cancel_all_orders", "/fapi/v1/cancelAllOpenOrders", &body)
                .await?;
            expect_success(EXCHANGE, "cancel_all_orders", response).await
        })
        .await
    }

    /// HMAC-SHA256 over the canonical JSON body, hex-encoded and appended
    /// as `signature`. Fails before any network activity when the gateway
    /// has no signing identity.
    async fn signed_post<B: Serialize>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let identity = self.identity.as_ref().ok_or(ConfigError::SignerUnavailable {
            exchange: EXCHANGE,
            operation,
        })?;

        let canonical = serde_json::to_string(body)?;
        let signature = identity.sign(&canonical);

        let mut payload = serde_json::to_value(body)?;
        let Some(object) = payload.as_object_mut() else {
            return Err(Error::Signing("request body must be a JSON object".into()));
        };
        object.insert("signature".into(), json!(signature));

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

    pub fn connect(&self) {
        self.stream.connect();
    }

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_signature_is_stable_hex() {
        let identity = HmacIdentity {
            secret: "top-secret".into(),
        };
        let first = identity.sign(r#"{"symbol":"BTCUSD"}"#);
        let second = identity.sign(r#"{"symbol":"BTCUSD"}"#);

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, identity.sign(r#"{"symbol":"ETHUSD"}"#));
    }

    #[test]
    fn identity_requires_both_key_and_secret() {
        let gateway = AsterGateway::new(AsterGatewayOptions {
            credentials: AsterCredentials {
                api_key: Some("key".into()),
                api_secret: None,
            },
            ..Default::default()
        })
        .unwrap();
        assert!(!gateway.has_signing_identity());

        let gateway = AsterGateway::new(AsterGatewayOptions {
            credentials: AsterCredentials {
                api_key: Some("key".into()),
                api_secret: Some("secret".into()),
            },
            ..Default::default()
        })
        .unwrap();
        assert!(gateway.has_signing_identity());
    }
}
