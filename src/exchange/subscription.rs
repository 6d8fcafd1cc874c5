//! Per-gateway listener registry.
//!
//! Maps event keys (`account`, `orders`, `depth@symbol`, `ticker@symbol`,
//! `klines@symbol/interval`) to registered callbacks. Registration returns a
//! [`SubscriptionToken`] handle; every registration is distinct and removable
//! through its token. The registry is owned by one gateway and never shared
//! across gateway instances.

use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};

use parking_lot::Mutex;
use tracing::warn;

use super::stream::StreamFrame;
use super::{AccountCallback, DepthCallback, KlinesCallback, OrdersCallback, TickerCallback};

/// Handle identifying one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum EventKey {
    Account,
    Orders,
    Depth(String),
    Ticker(String),
    Klines(String, String),
}

#[derive(Clone)]
enum Listener {
    Account(AccountCallback),
    Orders(OrdersCallback),
    Depth(DepthCallback),
    Ticker(TickerCallback),
    Klines(KlinesCallback),
}

#[derive(Default)]
struct RegistryInner {
    next_token: u64,
    // BTreeMap keeps dispatch in registration order.
    by_key: HashMap<EventKey, BTreeMap<u64, Listener>>,
    key_of: HashMap<u64, EventKey>,
}

pub(crate) struct ListenerRegistry {
    exchange: &'static str,
    inner: Mutex<RegistryInner>,
}

impl ListenerRegistry {
    pub fn new(exchange: &'static str) -> Self {
        Self {
            exchange,
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    fn register(&self, key: EventKey, listener: Listener) -> SubscriptionToken {
        let mut inner = self.inner.lock();
        let token = inner.next_token;
        inner.next_token += 1;
        inner.by_key.entry(key.clone()).or_default().insert(token, listener);
        inner.key_of.insert(token, key);
        SubscriptionToken(token)
    }

    pub fn on_account(&self, callback: AccountCallback) -> SubscriptionToken {
        self.register(EventKey::Account, Listener::Account(callback))
    }

    pub fn on_orders(&self, callback: OrdersCallback) -> SubscriptionToken {
        self.register(EventKey::Orders, Listener::Orders(callback))
    }

    pub fn on_depth(&self, symbol: &str, callback: DepthCallback) -> SubscriptionToken {
        self.register(EventKey::Depth(symbol.to_owned()), Listener::Depth(callback))
    }

    pub fn on_ticker(&self, symbol: &str, callback: TickerCallback) -> SubscriptionToken {
        self.register(
            EventKey::Ticker(symbol.to_owned()),
            Listener::Ticker(callback),
        )
    }

    pub fn on_klines(
        &self,
        symbol: &str,
        interval: &str,
        callback: KlinesCallback,
    ) -> SubscriptionToken {
        self.register(
            EventKey::Klines(symbol.to_owned(), interval.to_owned()),
            Listener::Klines(callback),
        )
    }

    /// Remove one registration. Returns `false` for unknown tokens.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        let mut inner = self.inner.lock();
        let Some(key) = inner.key_of.remove(&token.0) else {
            return false;
        };
        if let Some(listeners) = inner.by_key.get_mut(&key) {
            listeners.remove(&token.0);
            if listeners.is_empty() {
                inner.by_key.remove(&key);
            }
        }
        true
    }

    /// Deliver one inbound frame to every listener registered for its key.
    ///
    /// A panicking listener is logged and skipped; delivery continues with
    /// the remaining listeners and later frames are unaffected.
    pub fn dispatch(&self, frame: &StreamFrame) {
        let key = match frame {
            StreamFrame::Account { .. } => EventKey::Account,
            StreamFrame::Orders { .. } => EventKey::Orders,
            StreamFrame::Depth { symbol, .. } => EventKey::Depth(symbol.clone()),
            StreamFrame::Ticker { symbol, .. } => EventKey::Ticker(symbol.clone()),
            StreamFrame::Klines {
                symbol, interval, ..
            } => EventKey::Klines(symbol.clone(), interval.clone()),
        };

        // Clone the listener handles out of the lock so a callback can
        // subscribe or unsubscribe without deadlocking.
        let listeners: Vec<Listener> = {
            let inner = self.inner.lock();
            inner
                .by_key
                .get(&key)
                .map(|set| set.values().cloned().collect())
                .unwrap_or_default()
        };

        for listener in listeners {
            let delivered = catch_unwind(AssertUnwindSafe(|| match (&listener, frame) {
                (Listener::Account(cb), StreamFrame::Account { data }) => cb(data),
                (Listener::Orders(cb), StreamFrame::Orders { data }) => cb(data),
                (Listener::Depth(cb), StreamFrame::Depth { data, .. }) => cb(data),
                (Listener::Ticker(cb), StreamFrame::Ticker { data, .. }) => cb(data),
                (Listener::Klines(cb), StreamFrame::Klines { data, .. }) => cb(data),
                _ => {}
            }));
            if delivered.is_err() {
                warn!(
                    exchange = self.exchange,
                    "listener panicked during dispatch; continuing"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::types::{Depth, Ticker};

    fn depth_frame(symbol: &str) -> StreamFrame {
        StreamFrame::Depth {
            symbol: symbol.to_owned(),
            data: Depth {
                symbol: symbol.to_owned(),
                last_update_id: 1,
                event_time: 0,
                bids: Vec::new(),
                asks: Vec::new(),
            },
        }
    }

    fn ticker_frame(symbol: &str) -> StreamFrame {
        StreamFrame::Ticker {
            symbol: symbol.to_owned(),
            data: Ticker {
                symbol: symbol.to_owned(),
                last_price: "1".into(),
                open_price: "0".into(),
                high_price: "0".into(),
                low_price: "0".into(),
                volume: "0".into(),
                quote_volume: "0".into(),
                event_time: 0,
            },
        }
    }

    #[test]
    fn depth_dispatch_is_scoped_to_symbol() {
        let registry = ListenerRegistry::new("test");
        let hits_a = Arc::new(AtomicUsize::new(0));
        let hits_b = Arc::new(AtomicUsize::new(0));

        let a = Arc::clone(&hits_a);
        registry.on_depth("BTCUSD", Arc::new(move |_| {
            a.fetch_add(1, Ordering::SeqCst);
        }));
        let b = Arc::clone(&hits_b);
        registry.on_depth("BTCUSD", Arc::new(move |_| {
            b.fetch_add(1, Ordering::SeqCst);
        }));

        registry.dispatch(&depth_frame("BTCUSD"));
        registry.dispatch(&depth_frame("ETHUSD"));

        assert_eq!(hits_a.load(Ordering::SeqCst), 1);
        assert_eq!(hits_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn kline_key_includes_interval() {
        let registry = ListenerRegistry::new("test");
        let hits = Arc::new(AtomicUsize::new(0));

        let h = Arc::clone(&hits);
        registry.on_klines("BTCUSD", "1m", Arc::new(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        }));

        registry.dispatch(&StreamFrame::Klines {
            symbol: "BTCUSD".into(),
            interval: "5m".into(),
            data: Vec::new(),
        });
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        registry.dispatch(&StreamFrame::Klines {
            symbol: "BTCUSD".into(),
            interval: "1m".into(),
            data: Vec::new(),
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_listener_does_not_block_delivery() {
        let registry = ListenerRegistry::new("test");
        let hits = Arc::new(AtomicUsize::new(0));

        registry.on_ticker("BTCUSD", Arc::new(|_| panic!("bad listener")));
        let h = Arc::clone(&hits);
        registry.on_ticker("BTCUSD", Arc::new(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        }));

        registry.dispatch(&ticker_frame("BTCUSD"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // Future events are unaffected by the earlier panic.
        registry.dispatch(&ticker_frame("BTCUSD"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unsubscribe_removes_exactly_one_registration() {
        let registry = ListenerRegistry::new("test");
        let hits_a = Arc::new(AtomicUsize::new(0));
        let hits_b = Arc::new(AtomicUsize::new(0));

        let a = Arc::clone(&hits_a);
        let token = registry.on_depth("BTCUSD", Arc::new(move |_| {
            a.fetch_add(1, Ordering::SeqCst);
        }));
        let b = Arc::clone(&hits_b);
        registry.on_depth("BTCUSD", Arc::new(move |_| {
            b.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(registry.unsubscribe(token));
        assert!(!registry.unsubscribe(token));

        registry.dispatch(&depth_frame("BTCUSD"));
        assert_eq!(hits_a.load(Ordering::SeqCst), 0);
        assert_eq!(hits_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn global_keys_ignore_symbols() {
        let registry = ListenerRegistry::new("test");
        let hits = Arc::new(AtomicUsize::new(0));

        let h = Arc::clone(&hits);
        registry.on_orders(Arc::new(move |orders| {
            assert!(orders.is_empty());
            h.fetch_add(1, Ordering::SeqCst);
        }));

        registry.dispatch(&StreamFrame::Orders { data: Vec::new() });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
