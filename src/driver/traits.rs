use crate::driver::elements::ScreenElement;
use crate::error::{RemoteError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Screen dimensions in the backend's coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
    /// Points-to-pixels factor; 1.0 when the backend does not report one
    pub scale: f64,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
        }
    }
}

/// Symbolic swipe direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl FromStr for SwipeDirection {
    type Err = RemoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(RemoteError::unsupported(format!(
                "Swipe direction \"{}\" is not supported",
                s
            ))),
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        };
        f.write_str(name)
    }
}

/// A swipe request: either relative to the current screen or between two points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Direction(SwipeDirection),
    Points {
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
    },
}

/// Device orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Value sent to WebDriver servers, which expect upper case
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Portrait => "PORTRAIT",
            Self::Landscape => "LANDSCAPE",
        }
    }

    /// Parse a server-reported orientation.
    ///
    /// WDA reports variants like `UIA_DEVICE_ORIENTATION_LANDSCAPERIGHT`, so
    /// anything mentioning landscape counts as landscape.
    pub fn from_wire(value: &str) -> Option<Self> {
        let value = value.to_lowercase();
        if value == "portrait" {
            Some(Self::Portrait)
        } else if value.contains("landscape") {
            Some(Self::Landscape)
        } else {
            None
        }
    }
}

impl FromStr for Orientation {
    type Err = RemoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            _ => Err(RemoteError::unsupported(format!(
                "Orientation \"{}\" is not supported",
                s
            ))),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        })
    }
}

/// Physical or virtual buttons a caller may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Home,
    Back,
    VolumeUp,
    VolumeDown,
    Enter,
    DpadCenter,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
}

impl FromStr for Button {
    type Err = RemoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "HOME" => Ok(Self::Home),
            "BACK" => Ok(Self::Back),
            "VOLUME_UP" => Ok(Self::VolumeUp),
            "VOLUME_DOWN" => Ok(Self::VolumeDown),
            "ENTER" => Ok(Self::Enter),
            "DPAD_CENTER" => Ok(Self::DpadCenter),
            "DPAD_UP" => Ok(Self::DpadUp),
            "DPAD_DOWN" => Ok(Self::DpadDown),
            "DPAD_LEFT" => Ok(Self::DpadLeft),
            "DPAD_RIGHT" => Ok(Self::DpadRight),
            _ => Err(unsupported_button(s)),
        }
    }
}

/// An installed, launchable application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledApp {
    /// Package name (Android) or bundle id (iOS)
    pub package_name: String,
    pub app_name: String,
}

pub(crate) fn unsupported_button(name: &str) -> RemoteError {
    RemoteError::unsupported(format!("Button \"{}\" is not supported", name))
}

/// Platform-agnostic remote control interface
///
/// Every operation is a self-contained sequence of round-trips against the
/// backend. Implementations keep no per-call state, so a single instance may
/// be shared across concurrent tasks.
#[async_trait]
pub trait RemoteControl: Send + Sync {
    /// Get the platform name (e.g., "ios", "android")
    fn platform_name(&self) -> &str;

    /// Health probe. Never fails: any error is reported as `false`.
    async fn is_running(&self) -> bool;

    /// Query the current screen size. Never cached, orientation changes invalidate it.
    async fn get_screen_size(&self) -> Result<ScreenSize>;

    /// Tap at screen coordinates
    async fn tap(&self, x: i32, y: i32) -> Result<()>;

    /// Two quick taps at screen coordinates
    async fn double_tap(&self, x: i32, y: i32) -> Result<()>;

    /// Touch and hold
    ///
    /// # Arguments
    /// * `duration_ms` - How long to hold; `None` uses one second
    async fn long_press(&self, x: i32, y: i32, duration_ms: Option<u64>) -> Result<()>;

    /// Swipe across the middle of the screen in `direction`
    async fn swipe(&self, direction: SwipeDirection) -> Result<()>;

    /// Swipe from one point to another
    async fn swipe_between_points(
        &self,
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
    ) -> Result<()>;

    /// Type text into the focused element
    async fn type_text(&self, text: &str) -> Result<()>;

    /// Press a named button (e.g., "HOME", "ENTER")
    ///
    /// Unknown names fail with an unsupported-action error before any I/O.
    async fn press_button(&self, name: &str) -> Result<()>;

    /// Interactable elements currently on screen, in document order
    async fn get_elements_on_screen(&self) -> Result<Vec<ScreenElement>>;

    /// Open a URL or deep link
    async fn open_url(&self, url: &str) -> Result<()>;

    async fn get_orientation(&self) -> Result<Orientation>;

    async fn set_orientation(&self, orientation: Orientation) -> Result<()>;

    /// Launchable apps installed on the device
    async fn list_apps(&self) -> Result<Vec<InstalledApp>>;

    /// Start an app by package name or bundle id
    async fn launch_app(&self, package: &str) -> Result<()>;

    /// Stop a running app
    async fn terminate_app(&self, package: &str) -> Result<()>;

    /// Perform either form of swipe
    async fn perform_swipe(&self, swipe: Swipe) -> Result<()> {
        match swipe {
            Swipe::Direction(direction) => self.swipe(direction).await,
            Swipe::Points {
                start_x,
                start_y,
                end_x,
                end_y,
            } => {
                self.swipe_between_points(start_x, start_y, end_x, end_y)
                    .await
            }
        }
    }
}
