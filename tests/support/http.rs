//! Minimal canned-response HTTP server over a raw `TcpListener`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub struct StubHttp {
    pub base_url: String,
    /// Number of requests accepted.
    pub hits: Arc<AtomicUsize>,
    /// Raw request text (headers + body) per request.
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl StubHttp {
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Serve every request with the same status and JSON body, recording the
/// request count and raw request text.
pub async fn spawn(status: u16, body: &str) -> StubHttp {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let response = format!(
        "HTTP/1.1 {status} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let hits_task = Arc::clone(&hits);
    let requests_task = Arc::clone(&requests);
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            hits_task.fetch_add(1, Ordering::SeqCst);
            let response = response.clone();
            let requests = Arc::clone(&requests_task);
            tokio::spawn(async move {
                let mut buf = vec![0u8; 65536];
                let mut read_total = 0;
                loop {
                    match socket.read(&mut buf[read_total..]).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            read_total += n;
                            let text = String::from_utf8_lossy(&buf[..read_total]).into_owned();
                            if let Some(header_end) = text.find("\r\n\r\n") {
                                let content_length = text
                                    .lines()
                                    .find_map(|line| {
                                        let (name, value) = line.split_once(':')?;
                                        if name.eq_ignore_ascii_case("content-length") {
                                            value.trim().parse::<usize>().ok()
                                        } else {
                                            None
                                        }
                                    })
                                    .unwrap_or(0);
                                if read_total >= header_end + 4 + content_length {
                                    break;
                                }
                            }
                        }
                    }
                }
                requests
                    .lock()
                    .push(String::from_utf8_lossy(&buf[..read_total]).into_owned());
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    StubHttp {
        base_url: format!("http://{addr}"),
        hits,
        requests,
    }
}
