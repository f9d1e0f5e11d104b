//! Android driver over the UiAutomator2 (Appium) server
//!
//! The server listens on the device and is usually forwarded to port 8200.
//! Non-ASCII text still goes through adb, since the `keys` endpoint cannot
//! type it reliably.

use super::adb::ShellRunner;
use super::apps;
use super::input::{self, ImeSettings, TextInputPath};
use super::uiautomator;
use crate::driver::elements::{self, ScreenElement};
use crate::driver::geometry::Point;
use crate::driver::traits::{
    Button, InstalledApp, Orientation, RemoteControl, ScreenSize, SwipeDirection,
};
use crate::driver::webdriver::actions::LONG_PRESS_MS;
use crate::driver::webdriver::{HttpTransport, ReqwestTransport, WebDriverClient};
use crate::error::{RemoteError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_UIAUTOMATOR2_PORT: u16 = 8200;

/// Android `KeyEvent` codes
fn android_keycode(button: Button) -> u32 {
    match button {
        Button::Home => 3,
        Button::Back => 4,
        Button::DpadUp => 19,
        Button::DpadDown => 20,
        Button::DpadLeft => 21,
        Button::DpadRight => 22,
        Button::DpadCenter => 23,
        Button::VolumeUp => 24,
        Button::VolumeDown => 25,
        Button::Enter => 66,
    }
}

#[derive(Debug, Deserialize)]
struct WindowSize {
    width: f64,
    height: f64,
}

pub struct AppiumDriver {
    client: WebDriverClient,
    shell: Arc<dyn ShellRunner>,
    ime: ImeSettings,
}

impl AppiumDriver {
    pub fn new(
        host: &str,
        port: u16,
        timeout: Duration,
        shell: Arc<dyn ShellRunner>,
        ime: ImeSettings,
    ) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(timeout)?);
        Ok(Self::with_transport(
            transport,
            format!("http://{}:{}", host, port),
            shell,
            ime,
        ))
    }

    pub fn with_transport(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        shell: Arc<dyn ShellRunner>,
        ime: ImeSettings,
    ) -> Self {
        Self {
            client: WebDriverClient::new(transport, base_url, "Android"),
            shell,
            ime,
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Hierarchy XML from `{session}/source`
    pub async fn get_page_source(&self) -> Result<String> {
        self.client.session_get("source").await
    }

    pub async fn press_keycode(&self, keycode: u32) -> Result<()> {
        self.client
            .session_post("appium/device/press_keycode", json!({ "keycode": keycode }))
            .await
    }
}

#[async_trait]
impl RemoteControl for AppiumDriver {
    fn platform_name(&self) -> &str {
        "android"
    }

    async fn is_running(&self) -> bool {
        self.client.is_running().await
    }

    async fn get_screen_size(&self) -> Result<ScreenSize> {
        let size: WindowSize = self.client.session_get("window/current/size").await?;
        Ok(ScreenSize::new(size.width as u32, size.height as u32))
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
        match input::classify(text) {
            TextInputPath::Direct => {
                let chars: Vec<String> = text.chars().map(String::from).collect();
                self.client
                    .session_post("keys", json!({ "value": chars }))
                    .await
            }
            TextInputPath::UnicodeBroadcast => {
                input::type_with_ime(self.shell.as_ref(), &self.ime, text).await
            }
        }
    }

    async fn press_button(&self, name: &str) -> Result<()> {
        let button: Button = name.parse()?;
        self.press_keycode(android_keycode(button)).await
    }

    async fn get_elements_on_screen(&self) -> Result<Vec<ScreenElement>> {
        let xml = self.get_page_source().await?;
        let root = uiautomator::parse_hierarchy(&xml)?;
        Ok(elements::normalize(&root))
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

    async fn list_apps(&self) -> Result<Vec<InstalledApp>> {
        apps::list_apps(self.shell.as_ref()).await
    }

    async fn launch_app(&self, package: &str) -> Result<()> {
        apps::launch_app(self.shell.as_ref(), package).await
    }

    async fn terminate_app(&self, package: &str) -> Result<()> {
        apps::terminate_app(self.shell.as_ref(), package).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testing::{FakeShell, FakeTransport};
    use crate::error::ErrorKind;

    const BASE: &str = "http://localhost:8200";

    fn driver() -> (Arc<FakeTransport>, Arc<FakeShell>, AppiumDriver) {
        let transport = Arc::new(FakeTransport::new());
        let shell = Arc::new(FakeShell::new());
        let driver = AppiumDriver::with_transport(
            transport.clone(),
            BASE,
            shell.clone(),
            ImeSettings::default(),
        );
        (transport, shell, driver)
    }

    #[tokio::test]
    async fn test_session_requests_android_platform() {
        let (transport, _, driver) = driver();
        driver.tap(1, 2).await.unwrap();

        let body = transport.body_of("POST http://localhost:8200/session").unwrap();
        assert_eq!(body["capabilities"]["alwaysMatch"]["platformName"], "Android");
        assert_eq!(
            transport.calls(),
            vec![
                "POST http://localhost:8200/session",
                "POST http://localhost:8200/session/session-1/actions",
                "DELETE http://localhost:8200/session/session-1",
            ]
        );
    }

    #[tokio::test]
    async fn test_screen_size() {
        let (transport, _, driver) = driver();
        transport.respond(
            "/window/current/size",
            200,
            r#"{"value": {"width": 1080, "height": 2340}}"#,
        );
        assert_eq!(
            driver.get_screen_size().await.unwrap(),
            ScreenSize::new(1080, 2340)
        );
    }

    #[tokio::test]
    async fn test_buttons_use_keycodes() {
        let (transport, _, driver) = driver();
        driver.press_button("ENTER").await.unwrap();
        assert_eq!(
            transport.body_ending_with("/appium/device/press_keycode"),
            Some(json!({"keycode": 66}))
        );

        let err = driver.press_button("CAMERA").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAction);
        assert_eq!(transport.count("press_keycode"), 1);
    }

    #[tokio::test]
    async fn test_ascii_text_goes_through_keys() {
        let (transport, shell, driver) = driver();
        driver.type_text("Hi!").await.unwrap();
        assert_eq!(
            transport.body_ending_with("/keys"),
            Some(json!({"value": ["H", "i", "!"]}))
        );
        assert!(shell.commands().is_empty());
    }

    #[tokio::test]
    async fn test_unicode_text_goes_through_ime() {
        let (transport, shell, driver) = driver();
        driver.type_text("안녕").await.unwrap();
        assert!(transport.calls().is_empty());
        assert!(shell.commands().iter().any(|c| c.contains("am broadcast")));
    }

    #[tokio::test]
    async fn test_elements_from_xml_source() {
        let (transport, _, driver) = driver();
        transport.respond(
            "/source",
            200,
            r#"{"value": "<hierarchy><android.widget.EditText class=\"android.widget.EditText\" text=\"hello\" resource-id=\"com.app:id/q\" displayed=\"true\" bounds=\"[0,0][100,50]\"/></hierarchy>"}"#,
        );

        let elements = driver.get_elements_on_screen().await.unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].element_type, "TextField");
        assert_eq!(elements[0].value.as_deref(), Some("hello"));
        assert_eq!(elements[0].identifier.as_deref(), Some("com.app:id/q"));
    }

    #[tokio::test]
    async fn test_unknown_orientation_is_protocol_error() {
        let (transport, _, driver) = driver();
        transport.respond("/orientation", 200, r#"{"value": "UPSIDE_DOWN"}"#);
        let err = driver.get_orientation().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[tokio::test]
    async fn test_server_error_still_deletes_session() {
        let (transport, _, driver) = driver();
        transport.respond("/url", 500, r#"{"value": {"error": "unknown error"}}"#);
        let err = driver.open_url("https://example.com").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connectivity);
        assert_eq!(transport.count("DELETE"), 1);
    }

    #[tokio::test]
    async fn test_apps_are_managed_through_adb() {
        let (transport, shell, driver) = driver();
        driver.launch_app("com.example.app").await.unwrap();
        driver.terminate_app("com.example.app").await.unwrap();
        assert!(driver.list_apps().await.unwrap().is_empty());

        assert!(transport.calls().is_empty());
        assert_eq!(shell.commands().len(), 3);
        assert!(shell.commands()[1].starts_with("shell am force-stop"));
    }
}
