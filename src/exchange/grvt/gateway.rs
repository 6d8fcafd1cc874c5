//! GRVT gateway: REST client, WebSocket stream, API-key + EVM signing.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use super::messages::{
    GrvtAccountSummary, GrvtCancelAll, GrvtCancelOrder, GrvtCancelOrders, GrvtCreateOrder,
    GrvtEnvelope, GrvtOrder,
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

const EXCHANGE: &str = "grvt";
const DEFAULT_BASE_URL: &str = "https://trades.grvt.io";
const DEFAULT_WS_URL: &str = "wss://market-data.grvt.io/ws";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const API_KEY_HEADER: &str = "x-grvt-api-key";

/// API key plus the EVM private key used to sign writes.
#[derive(Clone, Default)]
pub struct GrvtCredentials {
    pub api_key: Option<String>,
    pub private_key: Option<String>,
}

impl fmt::Debug for GrvtCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrvtCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Construction options; URL and delay overrides exist for tests.
#[derive(Debug, Clone, Default)]
pub struct GrvtGatewayOptions {
    pub credentials: GrvtCredentials,
    pub base_url: Option<String>,
    pub ws_url: Option<String>,
    pub reconnect_delay: Option<Duration>,
}

pub struct GrvtGateway {
    http: reqwest::Client,
    base_url: String,
    signer: Option<PrivateKeySigner>,
    ready: Arc<AtomicBool>,
    registry: Arc<ListenerRegistry>,
    stream: MarketStream,
}

impl GrvtGateway {
    /// Build the gateway. The API key, when present, rides along as a
    /// default header; the private key becomes the signing identity. The
    /// WebSocket is not opened here.
    pub fn new(options: GrvtGatewayOptions) -> Result<Self> {
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
            signer,
            ready,
            registry,
            stream,
        })
    }

    pub fn has_signing_identity(&self) -> bool {
        self.signer.is_some()
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
            let url = format!("{}/api/v1/account", self.base_url);
            let response = self.http.get(&url).send().await?;
            let envelope: GrvtEnvelope<GrvtAccountSummary> =
                decode_response(EXCHANGE, "get_account_info", response).await?;
            Ok(envelope.result.into_snapshot())
        })
        .await
    }

    pub async fn get_open_orders(&self, symbol: &str) -> Result<Vec<Order>> {
        logged("get_open_orders", async {
            let url = format!("{}/api/v1/open_orders?instrument={}", self.base_url, symbol);
            let response = self.http.get(&url).send().await?;
            let envelope: GrvtEnvelope<Vec<GrvtOrder>> =
                decode_response(EXCHANGE, "get_open_orders", response).await?;
            Ok(envelope
                .result
                .into_iter()
                .map(GrvtOrder::into_order)
                .collect())
        })
        .await
    }

    pub async fn create_order(&self, params: &CreateOrderParams) -> Result<Order> {
        logged("create_order", async {
            let client_order_id = params.client_order_id_or_generated();
            let request = GrvtCreateOrder::from_params(params, &client_order_id);
            let response = self
                .signed_post("create_order", "/api/v1/create_order", &request)
                .await?;
            let envelope: GrvtEnvelope<GrvtOrder> =
                decode_response(EXCHANGE, "create_order", response).await?;
            Ok(envelope.result.into_order())
        })
        .await
    }

    pub async fn cancel_order(&self, symbol: &str, order_id: &str) -> Result<()> {
        logged("cancel_order", async {
            let body = GrvtCancelOrder {
                instrument: symbol,
                order_id,
            };
            let response = self
                .signed_post("cancel_order", "/api/v1/cancel_order", &body)
                .await?;
            expect_success(EXCHANGE, "cancel_order", response).await
        })
        .await
    }

    pub async fn cancel_orders(&self, symbol: &str, order_ids: &[String]) -> Result<()> {
        logged("cancel_orders", async {
            let body = GrvtCancelOrders {
                instrument: symbol,
                order_ids,
            };
            let response = self
                .signed_post("cancel_orders", "/api/v1/cancel_orders", &body)
                .await?;
            expect_success(EXCHANGE, "cancel_orders", response).await
        })
        .await
    }

    pub async fn cancel_all_orders(&self, symbol: &str) -> Result<()> {
        logged("cancel_all_orders", async {
            let body = GrvtCancelAll { instrument: symbol };
            let response = self
                .signed_post("cancel_all_orders", "/api/v1/cancel_all_orders", &body)
                .await?;
            expect_success(EXCHANGE, "cancel_all_orders", response).await
        })
        .await
    }

    /// Sign the canonical JSON encoding of `body` with the EVM key and POST
    /// it with the signature appended. Fails with a configuration error
    /// before any network activity when no identity is configured.
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
