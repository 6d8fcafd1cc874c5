//! Scripted WebSocket server for stream tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

pub struct StubWs {
    pub url: String,
    /// Number of WebSocket connections accepted.
    pub connections: Arc<AtomicUsize>,
}

impl StubWs {
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Accept connections, send each client the scripted text frames, then
/// either hold the connection open or close it.
pub async fn spawn(frames: Vec<String>, hold_open: bool) -> StubWs {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));

    let connections_task = Arc::clone(&connections);
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            connections_task.fetch_add(1, Ordering::SeqCst);
            let frames = frames.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(socket).await else {
                    return;
                };
                for frame in frames {
                    if ws.send(Message::Text(frame)).await.is_err() {
                        return;
                    }
                }
                if hold_open {
                    while let Some(Ok(_)) = ws.next().await {}
                } else {
                    let _ = ws.close(None).await;
                }
            });
        }
    });

    StubWs {
        url: format!("ws://{addr}"),
        connections,
    }
}
