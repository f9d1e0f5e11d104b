//! Text input strategies for Android
//!
//! `input text` only understands ASCII. Anything else goes through a
//! broadcast-capable IME (ADBKeyBoard by default) that is switched in for the
//! duration of the call. Newlines in direct text become ENTER key events.

use super::adb::{shell_quote, ShellRunner};
use crate::error::Result;
use log::{debug, warn};
use std::time::Duration;

pub const DEFAULT_UNICODE_IME: &str = "com.android.adbkeyboard/.AdbIME";
pub const DEFAULT_BROADCAST_ACTION: &str = "ADB_INPUT_TEXT";

/// Time for the broadcast text to land before the IME is switched back
const IME_SETTLE_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputPath {
    /// Native key injection
    Direct,
    /// IME switch + broadcast
    UnicodeBroadcast,
}

/// Pick the input path: any code point above 0x7F needs the IME
pub fn classify(text: &str) -> TextInputPath {
    if text.chars().any(|c| c as u32 > 0x7F) {
        TextInputPath::UnicodeBroadcast
    } else {
        TextInputPath::Direct
    }
}

#[derive(Debug, Clone)]
pub struct ImeSettings {
    /// IME that accepts text broadcasts
    pub unicode_ime: String,
    pub broadcast_action: String,
    /// Switch back to the previous IME afterwards
    pub restore: bool,
}

impl Default for ImeSettings {
    fn default() -> Self {
        Self {
            unicode_ime: DEFAULT_UNICODE_IME.to_string(),
            broadcast_action: DEFAULT_BROADCAST_ACTION.to_string(),
            restore: true,
        }
    }
}

/// Pick the input path for `adb shell input text`.
///
/// Besides non-ASCII text, the IME handles what `input text` cannot express:
/// a literal `%s` (typed as a space) and control characters other than
/// newlines, which [`type_direct`] turns into ENTER presses.
pub fn classify_for_adb(text: &str) -> TextInputPath {
    let inexpressible =
        text.contains("%s") || text.chars().any(|c| c.is_control() && c != '\n');
    if inexpressible {
        TextInputPath::UnicodeBroadcast
    } else {
        classify(text)
    }
}

/// Argument for `input text`: spaces become `%s`, then the whole line is
/// single-quoted for the device shell
pub fn escape_for_input_text(line: &str) -> String {
    shell_quote(&line.replace(' ', "%s"))
}

/// Escape text for a double-quoted broadcast extra
pub fn escape_for_broadcast(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
        .replace('`', "\\`")
}

/// `adb shell input text ...`, one call per line with ENTER in between
pub async fn type_direct(shell: &dyn ShellRunner, text: &str) -> Result<()> {
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            shell.shell("input keyevent KEYCODE_ENTER").await?;
        }
        if !line.is_empty() {
            shell
                .shell(&format!("input text {}", escape_for_input_text(line)))
                .await?;
        }
    }
    Ok(())
}

/// Deliver `text` through the broadcast IME, restoring the previous IME
/// afterwards when configured to.
pub async fn type_with_ime(
    shell: &dyn ShellRunner,
    settings: &ImeSettings,
    text: &str,
) -> Result<()> {
    let previous = match shell.shell("settings get secure default_input_method").await {
        Ok(out) => out.trim().to_string(),
        Err(e) => {
            debug!("Could not read current IME: {}", e);
            String::new()
        }
    };

    if let Err(e) = shell.shell(&format!("ime enable {}", settings.unicode_ime)).await {
        debug!("ime enable failed: {}", e);
    }
    shell
        .shell(&format!("ime set {}", settings.unicode_ime))
        .await?;

    let sent = shell
        .shell(&format!(
            "am broadcast -a {} --es msg \"{}\"",
            settings.broadcast_action,
            escape_for_broadcast(text)
        ))
        .await
        .map(|_| ());

    let should_restore = settings.restore
        && !previous.is_empty()
        && previous != "null"
        && previous != settings.unicode_ime;

    if should_restore {
        tokio::time::sleep(Duration::from_millis(IME_SETTLE_MS)).await;
        if let Err(e) = shell.shell(&format!("ime set {}", previous)).await {
            warn!("Failed to restore IME {}: {}", previous, e);
        }
    }

    sent
}
