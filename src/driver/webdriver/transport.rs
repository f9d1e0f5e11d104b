//! HTTP transport for WebDriver-style automation servers
//!
//! The [`HttpTransport`] trait is the only place requests leave the process,
//! which keeps session bookkeeping testable without a device.

use crate::error::{RemoteError, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Status and raw body of a completed exchange
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Generic WebDriver response envelope
#[derive(Debug, Deserialize)]
struct ValueEnvelope<T> {
    value: T,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the whole body as JSON
    pub fn json<T: DeserializeOwned>(&self, context: &str) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| RemoteError::protocol(context, e))
    }

    /// Decode the `value` field of a WebDriver envelope
    pub fn value<T: DeserializeOwned>(&self, context: &str) -> Result<T> {
        self.json::<ValueEnvelope<T>>(context).map(|envelope| envelope.value)
    }

    /// Turn a non-2xx reply into a connectivity error
    pub fn error_for_status(self, method: &Method, url: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(RemoteError::Status {
                method: method.to_string(),
                url: url.to_string(),
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Sends one request and returns whatever the server answered.
///
/// Implementations only fail when no response was received; HTTP error
/// statuses come back as a normal [`HttpResponse`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<HttpResponse>;
}

/// `reqwest`-backed transport
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport whose every request is bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Connection {
                url: String::new(),
                detail: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<HttpResponse> {
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let connection_error = |e: reqwest::Error| RemoteError::Connection {
            url: url.to_string(),
            detail: e.to_string(),
        };

        let resp = request.send().await.map_err(connection_error)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(connection_error)?;

        Ok(HttpResponse { status, body })
    }
}
