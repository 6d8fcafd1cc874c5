//! Adapter factory.
//!
//! Resolves which exchange to target and constructs the matching adapter
//! with only that exchange's credential sub-object plus the trading symbol.
//! Credential completeness is not validated here; the first signed or
//! network operation fails fast instead.

use std::env;

use tracing::{debug, warn};

use super::aster::{AsterAdapter, AsterCredentials};
use super::grvt::{GrvtAdapter, GrvtCredentials};
use super::hyperliquid::{HyperliquidAdapter, HyperliquidCredentials};
use super::{ExchangeAdapter, ExchangeId};
use crate::error::Result;

const ENV_EXCHANGE: &str = "EXCHANGE";
const ENV_TRADE_EXCHANGE: &str = "TRADE_EXCHANGE";
const DEFAULT_EXCHANGE: ExchangeId = ExchangeId::Aster;

/// Input to [`create_adapter`]: the trading symbol, an optional explicit
/// exchange id, and per-exchange credentials.
#[derive(Debug, Clone, Default)]
pub struct AdapterOptions {
    pub symbol: String,
    pub exchange: Option<String>,
    pub aster: Option<AsterCredentials>,
    pub grvt: Option<GrvtCredentials>,
    pub hyperliquid: Option<HyperliquidCredentials>,
}

/// Resolve the target exchange id.
///
/// Precedence: explicit argument > `EXCHANGE` > `TRADE_EXCHANGE` > aster.
/// Input is trimmed and lower-cased. An unrecognized value falls back to the
/// default with a warning rather than failing; callers rely on env-driven
/// defaulting.
pub fn resolve_exchange_id(explicit: Option<&str>) -> ExchangeId {
    let raw = explicit
        .map(str::to_owned)
        .or_else(|| env::var(ENV_EXCHANGE).ok())
        .or_else(|| env::var(ENV_TRADE_EXCHANGE).ok())
        .unwrap_or_default();
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        return DEFAULT_EXCHANGE;
    }
    ExchangeId::parse(&normalized).unwrap_or_else(|| {
        warn!(
            value = %normalized,
            fallback = %DEFAULT_EXCHANGE,
            "unrecognized exchange id, using fallback"
        );
        DEFAULT_EXCHANGE
    })
}

/// Human-readable exchange name. Pure mapping, no side effects.
pub fn display_name(id: ExchangeId) -> &'static str {
    match id {
        ExchangeId::Grvt => "GRVT",
        ExchangeId::Hyperliquid => "Hyperliquid",
        ExchangeId::Aster => "AsterDex",
    }
}

/// Build the adapter for the resolved exchange.
pub fn create_adapter(options: AdapterOptions) -> Result<Box<dyn ExchangeAdapter>> {
    let id = resolve_exchange_id(options.exchange.as_deref());
    debug!(exchange = %id, symbol = %options.symbol, "creating exchange adapter");
    match id {
        ExchangeId::Grvt => Ok(Box::new(GrvtAdapter::new(
            options.symbol,
            options.grvt.unwrap_or_default(),
        )?)),
        ExchangeId::Hyperliquid => Ok(Box::new(HyperliquidAdapter::new(
            options.symbol,
            options.hyperliquid.unwrap_or_default(),
        )?)),
        ExchangeId::Aster => Ok(Box::new(AsterAdapter::new(
            options.symbol,
            options.aster.unwrap_or_default(),
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_id_is_trimmed_and_lowercased() {
        assert_eq!(resolve_exchange_id(Some("GRVT")), ExchangeId::Grvt);
        assert_eq!(resolve_exchange_id(Some("  Hyperliquid ")), ExchangeId::Hyperliquid);
        assert_eq!(resolve_exchange_id(Some("aster")), ExchangeId::Aster);
    }

    #[test]
    fn unrecognized_id_falls_back_without_error() {
        assert_eq!(resolve_exchange_id(Some("unknown-id")), ExchangeId::Aster);
        assert_eq!(resolve_exchange_id(Some("")), ExchangeId::Aster);
    }

    #[test]
    fn display_names_are_fixed() {
        assert_eq!(display_name(ExchangeId::Aster), "AsterDex");
        assert_eq!(display_name(ExchangeId::Grvt), "GRVT");
        assert_eq!(display_name(ExchangeId::Hyperliquid), "Hyperliquid");
    }
}
