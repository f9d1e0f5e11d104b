//! Android backends
//!
//! [`AndroidDriver`] talks to the device through adb alone, [`AppiumDriver`]
//! through a forwarded UiAutomator2 server (with adb kept for IME switching).

pub mod adb;
pub mod apps;
pub mod appium;
pub mod driver;
pub mod input;
pub mod uiautomator;

pub use adb::{AdbShell, ShellRunner};
pub use appium::{AppiumDriver, DEFAULT_UIAUTOMATOR2_PORT};
pub use driver::AndroidDriver;
pub use input::ImeSettings;
