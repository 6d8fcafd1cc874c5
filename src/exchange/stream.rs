//! WebSocket connection lifecycle shared by every gateway.
//!
//! One [`MarketStream`] per gateway runs the connection state machine:
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> ReconnectScheduled
//!       ^              ^______________________________|
//!       |________________ destroy() from any state
//! ```
//!
//! A single driver task owns the whole cycle, so at most one reconnect delay
//! is ever outstanding. `destroy()` signals the driver through a watch
//! channel, which cancels a pending delay and closes an open socket.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::subscription::ListenerRegistry;
use crate::types::{AccountSnapshot, Depth, Kline, Order, Ticker};

/// Fixed delay between a connection drop and the next attempt.
pub(crate) const RECONNECT_DELAY: Duration = Duration::from_secs(5);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Inbound frame on the shared market stream.
///
/// `symbol` scopes `depth`/`ticker`; `klines` is additionally scoped by
/// `interval`; `account`/`orders` are global.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamFrame {
    Account { data: AccountSnapshot },
    Orders { data: Vec<Order> },
    Depth { symbol: String, data: Depth },
    Ticker { symbol: String, data: Ticker },
    Klines {
        symbol: String,
        interval: String,
        data: Vec<Kline>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConnectionPhase {
    Disconnected,
    Connecting,
    Connected,
    ReconnectScheduled,
}

pub(crate) struct MarketStream {
    exchange: &'static str,
    url: String,
    reconnect_delay: Duration,
    phase: Arc<Mutex<ConnectionPhase>>,
    ready: Arc<AtomicBool>,
    registry: Arc<ListenerRegistry>,
    shutdown: watch::Sender<bool>,
}

impl MarketStream {
    pub fn new(
        exchange: &'static str,
        url: String,
        reconnect_delay: Duration,
        ready: Arc<AtomicBool>,
        registry: Arc<ListenerRegistry>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            exchange,
            url,
            reconnect_delay,
            phase: Arc::new(Mutex::new(ConnectionPhase::Disconnected)),
            ready,
            registry,
            shutdown,
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> ConnectionPhase {
        *self.phase.lock()
    }

    /// Start the driver task unless one is already live or the stream was
    /// destroyed. Safe to call from every subscription.
    pub fn connect(&self) {
        if *self.shutdown.borrow() {
            return;
        }
        {
            let mut phase = self.phase.lock();
            if *phase != ConnectionPhase::Disconnected {
                return;
            }
            *phase = ConnectionPhase::Connecting;
        }

        let driver = Driver {
            exchange: self.exchange,
            url: self.url.clone(),
            reconnect_delay: self.reconnect_delay,
            phase: Arc::clone(&self.phase),
            ready: Arc::clone(&self.ready),
            registry: Arc::clone(&self.registry),
            shutdown: self.shutdown.subscribe(),
        };
        tokio::spawn(driver.run());
    }

    /// Idempotent teardown. Cancels a pending reconnect delay, closes an
    /// open socket, clears the ready flag. Safe before any connection was
    /// ever opened.
    pub fn destroy(&self) {
        // send_replace latches the flag even when no driver is listening.
        self.shutdown.send_replace(true);
        *self.phase.lock() = ConnectionPhase::Disconnected;
        self.ready.store(false, Ordering::SeqCst);
    }
}

struct Driver {
    exchange: &'static str,
    url: String,
    reconnect_delay: Duration,
    phase: Arc<Mutex<ConnectionPhase>>,
    ready: Arc<AtomicBool>,
    registry: Arc<ListenerRegistry>,
    shutdown: watch::Receiver<bool>,
}

impl Driver {
    async fn run(mut self) {
        loop {
            if *self.shutdown.borrow() {
                break;
            }
            *self.phase.lock() = ConnectionPhase::Connecting;

            match connect_async(&self.url).await {
                Ok((ws, response)) => {
                    info!(
                        exchange = self.exchange,
                        status = %response.status(),
                        "WebSocket connected"
                    );
                    *self.phase.lock() = ConnectionPhase::Connected;
                    self.ready.store(true, Ordering::SeqCst);
                    self.read_loop(ws).await;
                }
                Err(e) => {
                    warn!(exchange = self.exchange, error = %e, "WebSocket connect failed");
                }
            }

            if *self.shutdown.borrow() {
                break;
            }
            *self.phase.lock() = ConnectionPhase::ReconnectScheduled;
            debug!(
                exchange = self.exchange,
                delay_ms = self.reconnect_delay.as_millis() as u64,
                "reconnect scheduled"
            );
            tokio::select! {
                _ = tokio::time::sleep(self.reconnect_delay) => {}
                _ = self.shutdown.changed() => {}
            }
            if *self.shutdown.borrow() {
                break;
            }
        }

        *self.phase.lock() = ConnectionPhase::Disconnected;
        debug!(exchange = self.exchange, "stream driver stopped");
    }

    /// Process frames until the socket closes, errors, or teardown.
    async fn read_loop(&mut self, mut ws: WsStream) {
        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    let _ = ws.close(None).await;
                    return;
                }
                frame = ws.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.handle_text(&text),
                    Some(Ok(Message::Ping(data))) => {
                        if ws.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!(exchange = self.exchange, frame = ?frame, "WebSocket closed by server");
                        return;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!(exchange = self.exchange, error = %e, "WebSocket error");
                        return;
                    }
                    None => {
                        warn!(exchange = self.exchange, "WebSocket stream ended");
                        return;
                    }
                }
            }
        }
    }

    /// Parse failures are logged and the frame dropped; the connection
    /// stays open.
    fn handle_text(&self, text: &str) {
        match serde_json::from_str::<StreamFrame>(text) {
            Ok(frame) => self.registry.dispatch(&frame),
            Err(e) => {
                warn!(exchange = self.exchange, error = %e, raw = %text, "failed to parse frame");
            }
        }
    }
}
