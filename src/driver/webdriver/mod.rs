//! Shared plumbing for WebDriver-protocol backends (WebDriverAgent, UiAutomator2)

pub mod actions;
pub mod session;
pub mod transport;

pub use actions::{GestureDispatcher, PointerAction};
pub use session::SessionManager;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

use crate::error::Result;
use log::debug;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Transport, session manager and gesture dispatcher for one server
#[derive(Clone)]
pub struct WebDriverClient {
    transport: Arc<dyn HttpTransport>,
    sessions: SessionManager,
    gestures: GestureDispatcher,
}

impl WebDriverClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        platform_name: &'static str,
    ) -> Self {
        let sessions = SessionManager::new(transport.clone(), base_url, platform_name);
        let gestures = GestureDispatcher::new(sessions.clone());
        Self {
            transport,
            sessions,
            gestures,
        }
    }

    pub fn base_url(&self) -> &str {
        self.sessions.base_url()
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn gestures(&self) -> &GestureDispatcher {
        &self.gestures
    }

    /// `GET /status` answered with HTTP 200
    pub async fn is_running(&self) -> bool {
        let url = format!("{}/status", self.base_url());
        match self.transport.send(Method::GET, &url, None).await {
            Ok(resp) => resp.status == 200,
            Err(e) => {
                debug!("Status probe failed: {}", e);
                false
            }
        }
    }

    /// GET `url` and decode the `value` of the reply
    pub async fn get_value<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self
            .transport
            .send(Method::GET, url, None)
            .await?
            .error_for_status(&Method::GET, url)?;
        resp.value(url)
    }

    /// POST `body` to `url`, requiring a 2xx reply
    pub async fn post(&self, url: &str, body: &Value) -> Result<HttpResponse> {
        self.transport
            .send(Method::POST, url, Some(body))
            .await?
            .error_for_status(&Method::POST, url)
    }

    /// GET `{session}/{path}` inside a fresh session
    pub async fn session_get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let client = self.clone();
        let path = path.to_string();
        self.sessions
            .with_session(move |session_url| async move {
                client.get_value(&format!("{}/{}", session_url, path)).await
            })
            .await
    }

    /// POST `body` to `{session}/{path}` inside a fresh session
    pub async fn session_post(&self, path: &str, body: Value) -> Result<()> {
        let client = self.clone();
        let path = path.to_string();
        self.sessions
            .with_session(move |session_url| async move {
                client
                    .post(&format!("{}/{}", session_url, path), &body)
                    .await
                    .map(|_| ())
            })
            .await
    }
}
