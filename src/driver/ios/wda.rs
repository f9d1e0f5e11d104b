//! WebDriverAgent (WDA) HTTP Client
//!
//! Drives iOS devices and simulators through the WebDriverAgent HTTP API.
//! WDA runs on port 8100 by default. Every call opens its own session.

use super::source::SourceTreeElement;
use crate::driver::elements::{self, ScreenElement};
use crate::driver::geometry::Point;
use crate::driver::traits::{
    unsupported_button, Button, InstalledApp, Orientation, RemoteControl, ScreenSize,
    SwipeDirection,
};
use crate::driver::webdriver::actions::LONG_PRESS_MS;
use crate::driver::webdriver::{HttpTransport, ReqwestTransport, WebDriverClient};
use crate::error::{RemoteError, Result};
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Default WDA port
pub const DEFAULT_WDA_PORT: u16 = 8100;

/// `{session}/wda/screen` payload
#[derive(Debug, Deserialize)]
struct WdaScreen {
    #[serde(rename = "screenSize")]
    screen_size: WdaSize,
    #[serde(default)]
    scale: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WdaSize {
    width: f64,
    height: f64,
}

/// WDA HTTP client
#[derive(Clone)]
pub struct WdaClient {
    client: WebDriverClient,
}

impl WdaClient {
    /// Create a client for `http://{host}:{port}`
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(timeout)?);
        Ok(Self::with_transport(
            transport,
            format!("http://{}:{}", host, port),
        ))
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>, base_url: impl Into<String>) -> Self {
        Self {
            client: WebDriverClient::new(transport, base_url, "iOS"),
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Create a session and return its id
    pub async fn create_session(&self) -> Result<String> {
        self.client.sessions().create_session().await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.client.sessions().delete_session(session_id).await
    }

    /// Send keys to the focused element as one batch
    pub async fn send_keys(&self, keys: &str) -> Result<()> {
        self.client
            .session_post("wda/keys", json!({ "value": [keys] }))
            .await
    }

    /// Fetch the accessibility tree. No session needed.
    pub async fn get_page_source(&self) -> Result<SourceTreeElement> {
        let url = format!("{}/source/?format=json", self.base_url());
        self.client.get_value(&url).await
    }
}

/// WDA names for the hardware buttons it can press
fn wda_button_name(button: Button) -> Option<&'static str> {
    match button {
        Button::Home => Some("home"),
        Button::VolumeUp => Some("volumeup"),
        Button::VolumeDown => Some("volumedown"),
        _ => None,
    }
}

#[async_trait]
impl RemoteControl for WdaClient {
    fn platform_name(&self) -> &str {
        "ios"
    }

    async fn is_running(&self) -> bool {
        self.client.is_running().await
    }

    async fn get_screen_size(&self) -> Result<ScreenSize> {
        let screen: WdaScreen = self.client.session_get("wda/screen").await?;
        Ok(ScreenSize {
            width: screen.screen_size.width as u32,
            height: screen.screen_size.height as u32,
            scale: screen.scale.unwrap_or(1.0),
        })
    }

    async fn tap(&self, x: i32, y: i32) -> Result<()> {
        self.client.gestures().tap(x, y).await
    }

    async fn double_tap(&self, x: i32, y: i32) -> Result<()> {
        self.client.gestures().double_tap(x, y).await
    }

    async fn long_press(&self, x: i32, y: i32, duration_ms: Option<u64>) -> Result<()> {
        self.client
            .gestures()
            .long_press(x, y, duration_ms.unwrap_or(LONG_PRESS_MS))
            .await
    }

    async fn swipe(&self, direction: SwipeDirection) -> Result<()> {
        let size = self.get_screen_size().await?;
        self.client.gestures().swipe(&size, direction).await
    }

    async fn swipe_between_points(
        &self,
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
    ) -> Result<()> {
        self.client
            .gestures()
            .drag(Point::new(start_x, start_y), Point::new(end_x, end_y))
            .await
    }

    async fn type_text(&self, text: &str) -> Result<()> {
        self.send_keys(text).await
    }

    async fn press_button(&self, name: &str) -> Result<()> {
        let button: Button = name.parse()?;
        if button == Button::Enter {
            return self.send_keys("\n").await;
        }

        let wda_name = wda_button_name(button).ok_or_else(|| unsupported_button(name))?;
        debug!("Pressing {}", wda_name);
        self.client
            .session_post("wda/pressButton", json!({ "name": wda_name }))
            .await
    }

    async fn get_elements_on_screen(&self) -> Result<Vec<ScreenElement>> {
        let source = self.get_page_source().await?;
        Ok(elements::normalize(&source))
    }

    async fn open_url(&self, url: &str) -> Result<()> {
        self.client.session_post("url", json!({ "url": url })).await
    }

    async fn get_orientation(&self) -> Result<Orientation> {
        let value: String = self.client.session_get("orientation").await?;
        Orientation::from_wire(&value)
            .ok_or_else(|| RemoteError::protocol("orientation", format!("unknown value {}", value)))
    }

    async fn set_orientation(&self, orientation: Orientation) -> Result<()> {
        self.client
            .session_post("orientation", json!({ "orientation": orientation.as_wire() }))
            .await
    }

    /// WDA only exposes per-bundle app state, not an installed app listing
    async fn list_apps(&self) -> Result<Vec<InstalledApp>> {
        Err(RemoteError::unsupported(
            "Listing installed apps is not supported by WebDriverAgent",
        ))
    }

    async fn launch_app(&self, package: &str) -> Result<()> {
        self.client
            .session_post("wda/apps/launch", json!({ "bundleId": package }))
            .await
    }

    async fn terminate_app(&self, package: &str) -> Result<()> {
        self.client
            .session_post("wda/apps/terminate", json!({ "bundleId": package }))
            .await
    }
}
