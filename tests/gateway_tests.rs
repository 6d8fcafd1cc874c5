//! Gateway REST behavior against a canned local HTTP server.

mod support;

use crossdex::error::{ConfigError, Error};
use crossdex::exchange::aster::{AsterCredentials, AsterGateway, AsterGatewayOptions};
use crossdex::exchange::grvt::{GrvtGateway, GrvtGatewayOptions};
use crossdex::exchange::hyperliquid::{
    HyperliquidCredentials, HyperliquidGateway, HyperliquidGatewayOptions,
};
use crossdex::types::{CreateOrderParams, OrderSide};

const TEST_PRIVATE_KEY: &str =
    "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

fn hyperliquid_gateway(base_url: &str, private_key: Option<&str>) -> HyperliquidGateway {
    HyperliquidGateway::new(HyperliquidGatewayOptions {
        credentials: HyperliquidCredentials {
            wallet_address: None,
            private_key: private_key.map(str::to_owned),
        },
        base_url: Some(base_url.to_owned()),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn ensure_initialized_probes_exactly_once() {
    let stub = support::http::spawn(200, r#"{"totalWalletBalance": "100.5"}"#).await;
    let gateway = hyperliquid_gateway(&stub.base_url, None);

    assert!(!gateway.is_ready());
    gateway.ensure_initialized("BTCUSD").await.unwrap();
    gateway.ensure_initialized("BTCUSD").await.unwrap();

    assert!(gateway.is_ready());
    assert_eq!(stub.hit_count(), 1);
}

#[tokio::test]
async fn failed_probe_leaves_gateway_not_ready() {
    let stub = support::http::spawn(503, r#"{"code": 5, "msg": "maintenance"}"#).await;
    let gateway = hyperliquid_gateway(&stub.base_url, None);

    assert!(gateway.ensure_initialized("BTCUSD").await.is_err());
    assert!(!gateway.is_ready());

    // No implicit retry: the next call probes again.
    assert!(gateway.ensure_initialized("BTCUSD").await.is_err());
    assert_eq!(stub.hit_count(), 2);
}

#[tokio::test]
async fn unsigned_create_order_fails_before_any_request() {
    let stub = support::http::spawn(200, "{}").await;
    let gateway = hyperliquid_gateway(&stub.base_url, None);

    let err = gateway
        .create_order(&CreateOrderParams::limit("BTCUSD", OrderSide::Buy, "1", "64000"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::SignerUnavailable { .. })
    ));
    assert_eq!(stub.hit_count(), 0);
}

#[tokio::test]
async fn unsigned_cancel_all_fails_before_any_request() {
    let stub = support::http::spawn(200, "{}").await;
    let gateway = AsterGateway::new(AsterGatewayOptions {
        base_url: Some(stub.base_url.clone()),
        ..Default::default()
    })
    .unwrap();

    let err = gateway.cancel_all_orders("BTCUSD").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::SignerUnavailable { .. })
    ));
    assert_eq!(stub.hit_count(), 0);
}

#[tokio::test]
async fn aster_signed_order_carries_signature_and_api_key() {
    let ack = r#"{"orderId": 55, "clientOrderId": "x1", "symbol": "BTCUSD",
                  "side": "BUY", "type": "LIMIT", "status": "NEW",
                  "price": "64000", "origQty": "1"}"#;
    let stub = support::http::spawn(200, ack).await;
    let gateway = AsterGateway::new(AsterGatewayOptions {
        credentials: AsterCredentials {
            api_key: Some("test-key".into()),
            api_secret: Some("test-secret".into()),
        },
        base_url: Some(stub.base_url.clone()),
        ..Default::default()
    })
    .unwrap();

    let order = gateway
        .create_order(&CreateOrderParams::limit("BTCUSD", OrderSide::Buy, "1", "64000"))
        .await
        .unwrap();

    assert_eq!(order.order_id, "55");
    assert_eq!(order.price, "64000");

    let requests = stub.requests.lock();
    let request = requests.first().expect("request should be recorded");
    assert!(request.contains("\"signature\":"), "body must be signed");
    assert!(request.contains("\"newClientOrderId\":"));
    assert!(
        request.to_lowercase().contains("x-mbx-apikey"),
        "api key header must be sent"
    );
}

#[tokio::test]
async fn hyperliquid_signed_cancel_maps_upstream_rejection() {
    let stub = support::http::spawn(400, r#"{"code": -2011, "msg": "Unknown order sent."}"#).await;
    let gateway = hyperliquid_gateway(&stub.base_url, Some(TEST_PRIVATE_KEY));

    let err = gateway.cancel_order("BTCUSD", "12345").await.unwrap_err();
    match err {
        Error::Upstream { code, message, .. } => {
            assert_eq!(code, -2011);
            assert_eq!(message, "Unknown order sent.");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }

    let requests = stub.requests.lock();
    assert!(requests.first().unwrap().contains("\"signature\":\"0x"));
}

#[tokio::test]
async fn sparse_account_payload_normalizes_to_defaults() {
    let stub = support::http::spawn(200, "{}").await;
    let gateway = hyperliquid_gateway(&stub.base_url, None);

    let snapshot = gateway.get_account_info().await.unwrap();
    assert!(snapshot.can_trade);
    assert_eq!(snapshot.total_wallet_balance, "0");
    assert_eq!(snapshot.available_balance, "0");
    assert!(snapshot.positions.is_empty());
    assert!(snapshot.update_time > 0);
}

#[tokio::test]
async fn grvt_account_envelope_is_unwrapped_and_mapped() {
    let body = r#"{"result": {
        "total_equity": "920.1",
        "available_balance": "800",
        "positions": [{"instrument": "BTCUSD", "size": "0.4", "entry_price": "61000"}]
    }}"#;
    let stub = support::http::spawn(200, body).await;
    let gateway = GrvtGateway::new(GrvtGatewayOptions {
        base_url: Some(stub.base_url.clone()),
        ..Default::default()
    })
    .unwrap();

    let snapshot = gateway.get_account_info().await.unwrap();
    assert_eq!(snapshot.total_wallet_balance, "920.1");
    assert_eq!(snapshot.available_balance, "800");
    assert_eq!(snapshot.positions[0].symbol, "BTCUSD");
    assert_eq!(snapshot.positions[0].entry_price, "61000");
    assert_eq!(snapshot.positions[0].unrealized_profit, "0");
}

#[tokio::test]
async fn open_orders_normalize_numeric_ids() {
    let body = r#"[{"orderId": 777, "clientOrderId": "xa", "symbol": "BTCUSD",
                    "side": "SELL", "type": "LIMIT", "status": "PARTIALLY_FILLED",
                    "price": "64100", "quantity": "2", "executedQty": "0.5"}]"#;
    let stub = support::http::spawn(200, body).await;
    let gateway = hyperliquid_gateway(&stub.base_url, None);

    let orders = gateway.get_open_orders("BTCUSD").await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, "777");
    assert_eq!(orders[0].orig_qty, "2");
    assert_eq!(orders[0].executed_qty, "0.5");
}
