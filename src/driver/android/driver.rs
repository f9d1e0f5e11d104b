//! Android driver over plain adb shell commands

use super::adb::{is_landscape_rotation, parse_wm_size, shell_quote, ShellRunner};
use super::apps;
use super::input::{self, ImeSettings, TextInputPath};
use super::uiautomator::{self, NULL_ROOT_MARKER};
use crate::driver::elements::{self, ScreenElement};
use crate::driver::geometry::{swipe_path, Point};
use crate::driver::traits::{
    Button, InstalledApp, Orientation, RemoteControl, ScreenSize, SwipeDirection,
};
use crate::driver::webdriver::actions::LONG_PRESS_MS;
use crate::error::{RemoteError, Result};
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

/// Duration passed to `input swipe`
const SWIPE_DURATION_MS: u64 = 1000;

/// Attempts at `uiautomator dump` while the device reports a null root
const DUMP_ATTEMPTS: usize = 10;

fn keycode(button: Button) -> &'static str {
    match button {
        Button::Back => "KEYCODE_BACK",
        Button::Home => "KEYCODE_HOME",
        Button::VolumeUp => "KEYCODE_VOLUME_UP",
        Button::VolumeDown => "KEYCODE_VOLUME_DOWN",
        Button::Enter => "KEYCODE_ENTER",
        Button::DpadCenter => "KEYCODE_DPAD_CENTER",
        Button::DpadUp => "KEYCODE_DPAD_UP",
        Button::DpadDown => "KEYCODE_DPAD_DOWN",
        Button::DpadLeft => "KEYCODE_DPAD_LEFT",
        Button::DpadRight => "KEYCODE_DPAD_RIGHT",
    }
}

/// Android device controlled through adb
pub struct AndroidDriver {
    shell: Arc<dyn ShellRunner>,
    ime: ImeSettings,
}

impl AndroidDriver {
    pub fn new(shell: Arc<dyn ShellRunner>, ime: ImeSettings) -> Self {
        Self { shell, ime }
    }

    async fn input_swipe(&self, start: Point, end: Point, duration_ms: u64) -> Result<()> {
        self.shell
            .shell(&format!(
                "input swipe {} {} {} {} {}",
                start.x, start.y, end.x, end.y, duration_ms
            ))
            .await?;
        Ok(())
    }

    /// Raw hierarchy XML, retried while uiautomator has no root node
    pub async fn get_ui_dump(&self) -> Result<String> {
        for attempt in 1..=DUMP_ATTEMPTS {
            let dump = self.shell.exec_out("uiautomator dump /dev/tty").await?;

            if dump.contains(NULL_ROOT_MARKER) {
                debug!("uiautomator returned a null root (attempt {})", attempt);
                continue;
            }

            return uiautomator::trim_dump(&dump)
                .map(str::to_string)
                .ok_or_else(|| RemoteError::protocol("uiautomator dump", "no XML in output"));
        }

        Err(RemoteError::protocol(
            "uiautomator dump",
            format!("no root node after {} attempts", DUMP_ATTEMPTS),
        ))
    }
}

#[async_trait]
impl RemoteControl for AndroidDriver {
    fn platform_name(&self) -> &str {
        "android"
    }

    async fn is_running(&self) -> bool {
        match self.shell.exec(&["get-state"]).await {
            Ok(state) => state.trim() == "device",
            Err(e) => {
                debug!("adb get-state failed: {}", e);
                false
            }
        }
    }

    async fn get_screen_size(&self) -> Result<ScreenSize> {
        let output = self.shell.shell("wm size").await?;
        let (width, height) = parse_wm_size(&output)
            .ok_or_else(|| RemoteError::protocol("wm size", output.trim()))?;

        // `wm size` reports the natural (portrait) size
        let landscape = match self.shell.shell("dumpsys window displays").await {
            Ok(dumpsys) => is_landscape_rotation(&dumpsys),
            Err(e) => {
                debug!("Could not read display rotation: {}", e);
                false
            }
        };

        if landscape && height > width {
            Ok(ScreenSize::new(height, width))
        } else {
            Ok(ScreenSize::new(width, height))
        }
    }

    async fn tap(&self, x: i32, y: i32) -> Result<()> {
        self.shell.shell(&format!("input tap {} {}", x, y)).await?;
        Ok(())
    }

    async fn double_tap(&self, x: i32, y: i32) -> Result<()> {
        self.tap(x, y).await?;
        self.tap(x, y).await
    }

    async fn long_press(&self, x: i32, y: i32, duration_ms: Option<u64>) -> Result<()> {
        let point = Point::new(x, y);
        self.input_swipe(point, point, duration_ms.unwrap_or(LONG_PRESS_MS))
            .await
    }

    async fn swipe(&self, direction: SwipeDirection) -> Result<()> {
        let size = self.get_screen_size().await?;
        let path = swipe_path(&size, direction);
        self.input_swipe(path.start, path.end, SWIPE_DURATION_MS)
            .await
    }

    async fn swipe_between_points(
        &self,
        start_x: i32,
        start_y: i32,
        end_x: i32,
        end_y: i32,
    ) -> Result<()> {
        self.input_swipe(
            Point::new(start_x, start_y),
            Point::new(end_x, end_y),
            SWIPE_DURATION_MS,
        )
        .await
    }

    async fn type_text(&self, text: &str) -> Result<()> {
        match input::classify_for_adb(text) {
            TextInputPath::Direct => input::type_direct(self.shell.as_ref(), text).await,
            TextInputPath::UnicodeBroadcast => {
                input::type_with_ime(self.shell.as_ref(), &self.ime, text).await
            }
        }
    }

    async fn press_button(&self, name: &str) -> Result<()> {
        let button: Button = name.parse()?;
        self.shell
            .shell(&format!("input keyevent {}", keycode(button)))
            .await?;
        Ok(())
    }

    async fn get_elements_on_screen(&self) -> Result<Vec<ScreenElement>> {
        let xml = self.get_ui_dump().await?;
        let root = uiautomator::parse_hierarchy(&xml)?;
        Ok(elements::normalize(&root))
    }

    async fn open_url(&self, url: &str) -> Result<()> {
        self.shell
            .shell(&format!(
                "am start -a android.intent.action.VIEW -d {}",
                shell_quote(url)
            ))
            .await?;
        Ok(())
    }

    async fn get_orientation(&self) -> Result<Orientation> {
        let rotation = self.shell.shell("settings get system user_rotation").await?;
        if rotation.trim() == "0" {
            Ok(Orientation::Portrait)
        } else {
            Ok(Orientation::Landscape)
        }
    }

    async fn set_orientation(&self, orientation: Orientation) -> Result<()> {
        let rotation = match orientation {
            Orientation::Portrait => 0,
            Orientation::Landscape => 1,
        };

        // Auto-rotate would override the fixed rotation
        self.shell
            .shell("settings put system accelerometer_rotation 0")
            .await?;
        self.shell
            .shell(&format!("settings put system user_rotation {}", rotation))
            .await?;
        Ok(())
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
