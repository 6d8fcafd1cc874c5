//! Tests for exchange resolution and adapter construction.

use crossdex::error::{ConfigError, Error};
use crossdex::exchange::aster::{AsterAdapter, AsterCredentials};
use crossdex::exchange::hyperliquid::{HyperliquidAdapter, HyperliquidCredentials};
use crossdex::{create_adapter, resolve_exchange_id, AdapterOptions, ExchangeId};

const TEST_PRIVATE_KEY: &str =
    "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

#[test]
fn explicit_argument_beats_environment_and_default() {
    // Single test for everything env-dependent so parallel tests never race
    // on the process environment.
    std::env::remove_var("EXCHANGE");
    std::env::remove_var("TRADE_EXCHANGE");

    assert_eq!(resolve_exchange_id(None), ExchangeId::Aster);

    std::env::set_var("TRADE_EXCHANGE", "hyperliquid");
    assert_eq!(resolve_exchange_id(None), ExchangeId::Hyperliquid);

    std::env::set_var("EXCHANGE", "grvt");
    assert_eq!(resolve_exchange_id(None), ExchangeId::Grvt);

    assert_eq!(
        resolve_exchange_id(Some("hyperliquid")),
        ExchangeId::Hyperliquid
    );

    std::env::remove_var("EXCHANGE");
    std::env::remove_var("TRADE_EXCHANGE");
}

#[test]
fn factory_builds_the_resolved_adapter() {
    let adapter = create_adapter(AdapterOptions {
        symbol: "BTCUSD".into(),
        exchange: Some("hyperliquid".into()),
        hyperliquid: Some(HyperliquidCredentials {
            wallet_address: None,
            private_key: Some(TEST_PRIVATE_KEY.into()),
        }),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(adapter.id(), ExchangeId::Hyperliquid);
    assert_eq!(adapter.symbol(), "BTCUSD");
}

#[test]
fn factory_falls_back_to_aster_on_unknown_id() {
    let adapter = create_adapter(AdapterOptions {
        symbol: "BTCUSD".into(),
        exchange: Some("unknown-id".into()),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(adapter.id(), ExchangeId::Aster);
}

#[test]
fn private_key_credentials_yield_a_signing_identity() {
    let adapter = HyperliquidAdapter::new(
        "BTCUSD",
        HyperliquidCredentials {
            wallet_address: Some("0x0000000000000000000000000000000000000001".into()),
            private_key: Some(TEST_PRIVATE_KEY.into()),
        },
    )
    .unwrap();
    assert!(adapter.gateway().has_signing_identity());
    assert!(adapter.gateway().signer_address().is_some());

    let adapter = HyperliquidAdapter::new("BTCUSD", HyperliquidCredentials::default()).unwrap();
    assert!(!adapter.gateway().has_signing_identity());
    assert!(adapter.gateway().signer_address().is_none());
}

#[test]
fn aster_credentials_without_secret_have_no_identity() {
    let adapter = AsterAdapter::new(
        "BTCUSD",
        AsterCredentials {
            api_key: Some("key".into()),
            api_secret: None,
        },
    )
    .unwrap();
    assert!(!adapter.gateway().has_signing_identity());
}

#[test]
fn invalid_private_key_is_a_configuration_error() {
    let result = HyperliquidAdapter::new(
        "BTCUSD",
        HyperliquidCredentials {
            wallet_address: None,
            private_key: Some("not-a-key".into()),
        },
    );

    match result {
        Err(Error::Config(ConfigError::InvalidValue { field, .. })) => {
            assert_eq!(field, "private_key");
        }
        Err(other) => panic!("expected InvalidValue error, got {other:?}"),
        Ok(_) => panic!("expected error, construction succeeded"),
    }
}
