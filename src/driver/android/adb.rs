use crate::error::{RemoteError, Result};
use async_trait::async_trait;
use log::debug;
use regex::Regex;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Runs adb commands against one device
#[async_trait]
pub trait ShellRunner: Send + Sync {
    /// `adb shell <command>`; the device shell parses `command`
    async fn shell(&self, command: &str) -> Result<String>;

    /// `adb exec-out <command>`, for output that must not be mangled by a pty
    async fn exec_out(&self, command: &str) -> Result<String>;

    /// A raw adb invocation, e.g. `["get-state"]`
    async fn exec(&self, args: &[&str]) -> Result<String>;
}

/// `tokio::process` backed adb runner
pub struct AdbShell {
    adb_path: PathBuf,
    serial: Option<String>,
    timeout: Duration,
}

impl AdbShell {
    /// # Arguments
    /// * `adb_path` - Resolved adb binary (see `utils::binary_resolver::find_adb`)
    /// * `serial` - Target device; `None` lets adb pick the only connected one
    /// * `timeout` - Upper bound for a single adb invocation
    pub fn new(adb_path: PathBuf, serial: Option<String>, timeout: Duration) -> Self {
        Self {
            adb_path,
            serial,
            timeout,
        }
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    async fn run(&self, args: &[&str], allow_failed_status: bool) -> Result<String> {
        let mut full_args: Vec<&str> = Vec::new();

        if let Some(s) = self.serial.as_deref() {
            full_args.push("-s");
            full_args.push(s);
        }

        full_args.extend_from_slice(args);
        let description = args.join(" ");
        debug!("adb {}", description);

        let output = Command::new(&self.adb_path)
            .args(&full_args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| RemoteError::Shell {
                command: description.clone(),
                detail: format!("timed out after {:?}", self.timeout),
            })?
            .map_err(|e| RemoteError::Shell {
                command: description.clone(),
                detail: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();

        // exec-out may not set exit status properly, so output wins there
        let failed = if allow_failed_status {
            stdout.is_empty() && !output.status.success()
        } else {
            !output.status.success()
        };

        if failed {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RemoteError::Shell {
                command: description,
                detail: stderr.trim().to_string(),
            });
        }

        Ok(stdout)
    }
}

#[async_trait]
impl ShellRunner for AdbShell {
    async fn shell(&self, command: &str) -> Result<String> {
        self.run(&["shell", command], false).await
    }

    async fn exec_out(&self, command: &str) -> Result<String> {
        self.run(&["exec-out", command], true).await
    }

    async fn exec(&self, args: &[&str]) -> Result<String> {
        self.run(args, false).await
    }
}

/// Parse `wm size` output, preferring an override over the physical size
pub fn parse_wm_size(output: &str) -> Option<(u32, u32)> {
    let mut size = None;

    for line in output.lines() {
        let is_override = line.contains("Override size:");
        if !is_override && !line.contains("Physical size:") {
            continue;
        }

        let parsed = line.split(':').nth(1).and_then(|size_str| {
            let (w, h) = size_str.trim().split_once('x')?;
            Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
        });

        if parsed.is_some() {
            size = parsed;
            if is_override {
                break;
            }
        }
    }

    size
}

/// Whether `dumpsys window displays` reports a 90° or 270° rotation
pub fn is_landscape_rotation(dumpsys_output: &str) -> bool {
    let Ok(re) = Regex::new(r"m(?:Current)?Rotation=(?:ROTATION_)?(\d+)") else {
        return false;
    };
    re.captures(dumpsys_output)
        .and_then(|capt| capt[1].parse::<u32>().ok())
        .is_some_and(|rotation| matches!(rotation, 1 | 3 | 90 | 270))
}

/// Single-quote `value` for the device shell
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wm_size() {
        assert_eq!(parse_wm_size("Physical size: 1080x1920\n"), Some((1080, 1920)));
        assert_eq!(
            parse_wm_size("Physical size: 1440x3120\nOverride size: 1080x2340\n"),
            Some((1080, 2340))
        );
        assert_eq!(parse_wm_size("error: no devices"), None);
    }

    #[test]
    fn test_rotation_detection() {
        assert!(is_landscape_rotation("  mRotation=1 mAltOrientation=false"));
        assert!(!is_landscape_rotation("  mRotation=0 mAltOrientation=false"));
        assert!(is_landscape_rotation("mCurrentRotation=ROTATION_270"));
        assert!(!is_landscape_rotation("no rotation info"));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("https://a.b/?x=1&y=2"), "'https://a.b/?x=1&y=2'");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
    }

    #[tokio::test]
    async fn test_missing_binary_is_shell_error() {
        let adb = AdbShell::new(
            PathBuf::from("/nonexistent/adb"),
            Some("emulator-5554".into()),
            Duration::from_secs(1),
        );
        assert_eq!(adb.serial(), Some("emulator-5554"));
        let err = adb.shell("wm size").await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Connectivity);
        assert!(err.to_string().contains("shell wm size"));
    }
}
