//! Per-operation WebDriver sessions
//!
//! Every high-level action opens its own session and closes it afterwards.
//! Nothing is cached between calls, so concurrent operations never share a
//! session.

use super::transport::HttpTransport;
use crate::error::{RemoteError, Result};
use log::{debug, warn};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;

/// Session creation response
///
/// WDA nests the id under `value`, older servers put it at the top level.
#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    value: Option<SessionValue>,
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionValue {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Creates and tears down sessions against one automation server
#[derive(Clone)]
pub struct SessionManager {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    platform_name: &'static str,
}

impl SessionManager {
    /// # Arguments
    /// * `base_url` - Server root, e.g. "http://localhost:8100"
    /// * `platform_name` - Value for the `platformName` capability ("iOS", "Android")
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        platform_name: &'static str,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            platform_name,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    pub fn session_url(&self, session_id: &str) -> String {
        format!("{}/session/{}", self.base_url, session_id)
    }

    /// Create a new session and return its id
    pub async fn create_session(&self) -> Result<String> {
        let url = format!("{}/session", self.base_url);
        let body = json!({
            "capabilities": {
                "alwaysMatch": { "platformName": self.platform_name }
            }
        });

        let resp = self
            .transport
            .send(Method::POST, &url, Some(&body))
            .await?
            .error_for_status(&Method::POST, &url)?;

        let session: SessionResponse = resp.json("session creation")?;
        let session_id = session
            .session_id
            .or(session.value.and_then(|v| v.session_id))
            .ok_or_else(|| RemoteError::protocol("session creation", "no session ID in response"))?;

        debug!("Created session {}", session_id);
        Ok(session_id)
    }

    /// Delete a session
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let url = self.session_url(session_id);
        self.transport
            .send(Method::DELETE, &url, None)
            .await?
            .error_for_status(&Method::DELETE, &url)?;

        debug!("Deleted session {}", session_id);
        Ok(())
    }

    /// Run `work` inside a fresh session.
    ///
    /// `work` receives the session URL (`{base}/session/{id}`). The session
    /// is deleted whether `work` succeeds or fails. When both fail, the error
    /// from `work` is returned and the deletion failure is only logged.
    pub async fn with_session<T, F, Fut>(&self, work: F) -> Result<T>
    where
        F: FnOnce(String) -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
        T: Send,
    {
        let session_id = self.create_session().await?;
        let mut guard = SessionGuard {
            transport: self.transport.clone(),
            url: Some(self.session_url(&session_id)),
        };

        let result = work(self.session_url(&session_id)).await;

        // Stay armed until the delete lands; a drop mid-delete still cleans up
        let deleted = self.delete_session(&session_id).await;
        guard.disarm();

        match (result, deleted) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(delete_err)) => {
                warn!(
                    "Failed to delete session {} after error: {}",
                    session_id, delete_err
                );
                Err(e)
            }
        }
    }
}

/// Deletes the session if the operation future is dropped before its own
/// delete request has completed
struct SessionGuard {
    transport: Arc<dyn HttpTransport>,
    url: Option<String>,
}

impl SessionGuard {
    fn disarm(&mut self) {
        self.url = None;
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(url) = self.url.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let transport = self.transport.clone();
                handle.spawn(async move {
                    if let Err(e) = transport.send(Method::DELETE, &url, None).await {
                        warn!("Failed to delete abandoned session {}: {}", url, e);
                    }
                });
            }
            Err(_) => warn!("Abandoned session {} could not be deleted: no runtime", url),
        }
    }
}
