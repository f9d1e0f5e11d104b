use crate::driver::android::input::{DEFAULT_BROADCAST_ACTION, DEFAULT_UNICODE_IME};
use crate::driver::android::{ImeSettings, DEFAULT_UIAUTOMATOR2_PORT};
use crate::driver::ios::DEFAULT_WDA_PORT;
use crate::error::{RemoteError, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which backend drives the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// WebDriverAgent
    #[default]
    Ios,
    /// adb shell commands
    AndroidAdb,
    /// UiAutomator2 server
    AndroidAppium,
}

impl BackendKind {
    /// Port the backend's HTTP server listens on, if it has one
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::Ios => Some(DEFAULT_WDA_PORT),
            Self::AndroidAppium => Some(DEFAULT_UIAUTOMATOR2_PORT),
            Self::AndroidAdb => None,
        }
    }
}

impl FromStr for BackendKind {
    type Err = RemoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ios" => Ok(Self::Ios),
            "android" | "android-adb" | "adb" => Ok(Self::AndroidAdb),
            "android-appium" | "appium" | "uiautomator2" => Ok(Self::AndroidAppium),
            _ => Err(RemoteError::unsupported(format!(
                "Backend \"{}\" is not supported",
                s
            ))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ios => "ios",
            Self::AndroidAdb => "android-adb",
            Self::AndroidAppium => "android-appium",
        };
        f.write_str(name)
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendKind,

    /// Host of the automation server (WDA or UiAutomator2)
    pub host: String,

    /// Server port; the backend default when unset
    pub port: Option<u16>,

    /// Android serial / iOS UDID
    pub device: Option<String>,

    /// Timeout for each HTTP request and adb invocation
    pub request_timeout: Duration,

    /// IME that accepts text broadcasts
    pub unicode_ime: String,

    pub broadcast_action: String,

    /// Switch back to the previous IME after Unicode input
    pub restore_ime: bool,

    /// Explicit adb binary
    pub adb_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            host: "localhost".to_string(),
            port: None,
            device: None,
            request_timeout: Duration::from_secs(30),
            unicode_ime: DEFAULT_UNICODE_IME.to_string(),
            broadcast_action: DEFAULT_BROADCAST_ACTION.to_string(),
            restore_ime: true,
            adb_path: None,
        }
    }
}

impl Config {
    /// Configured port, or the backend default
    pub fn effective_port(&self) -> u16 {
        self.port
            .or_else(|| self.backend.default_port())
            .unwrap_or(DEFAULT_WDA_PORT)
    }

    pub fn ime_settings(&self) -> ImeSettings {
        ImeSettings {
            unicode_ime: self.unicode_ime.clone(),
            broadcast_action: self.broadcast_action.clone(),
            restore: self.restore_ime,
        }
    }
}
