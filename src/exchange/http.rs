//! Shared REST response decoding.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Error body shape the backends agree on (`msg` or `message`).
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default, alias = "message")]
    msg: String,
}

fn upstream_error(
    exchange: &'static str,
    operation: &'static str,
    status: reqwest::StatusCode,
    body: &str,
) -> Error {
    let (code, message) = match serde_json::from_str::<UpstreamErrorBody>(body) {
        Ok(parsed) if !parsed.msg.is_empty() => (parsed.code, parsed.msg),
        _ => (i64::from(status.as_u16()), body.trim().to_owned()),
    };
    Error::Upstream {
        exchange,
        operation,
        code,
        message,
    }
}

/// Decode a 2xx response body, or map a non-2xx response to
/// [`Error::Upstream`] carrying the backend's error code and message.
pub(crate) async fn decode_response<T: DeserializeOwned>(
    exchange: &'static str,
    operation: &'static str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let body = response.text().await.unwrap_or_default();
    Err(upstream_error(exchange, operation, status, &body))
}

/// Like [`decode_response`] for write acks whose body we do not need.
pub(crate) async fn expect_success(
    exchange: &'static str,
    operation: &'static str,
    response: reqwest::Response,
) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(upstream_error(exchange, operation, status, &body))
}
