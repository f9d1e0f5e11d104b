pub mod android;
pub mod elements;
pub mod geometry;
pub mod ios;
pub mod traits;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod testing;

use crate::error::Result;
use crate::utils::binary_resolver::find_adb;
use crate::utils::config::{BackendKind, Config};
use android::{AdbShell, AndroidDriver, AppiumDriver};
use ios::WdaClient;
use log::info;
use std::sync::Arc;
use traits::RemoteControl;

/// Build the backend selected by `config`
pub fn connect(config: &Config) -> Result<Box<dyn RemoteControl>> {
    let port = config.effective_port();

    match config.backend {
        BackendKind::Ios => {
            info!("Using WebDriverAgent at {}:{}", config.host, port);
            Ok(Box::new(WdaClient::new(
                &config.host,
                port,
                config.request_timeout,
            )?))
        }
        BackendKind::AndroidAdb => {
            let shell = adb_shell(config)?;
            info!("Using adb for {}", shell.serial().unwrap_or("default device"));
            Ok(Box::new(AndroidDriver::new(shell, config.ime_settings())))
        }
        BackendKind::AndroidAppium => {
            let shell = adb_shell(config)?;
            info!("Using UiAutomator2 at {}:{}", config.host, port);
            Ok(Box::new(AppiumDriver::new(
                &config.host,
                port,
                config.request_timeout,
                shell,
                config.ime_settings(),
            )?))
        }
    }
}

fn adb_shell(config: &Config) -> Result<Arc<AdbShell>> {
    let adb_path = find_adb(config.adb_path.as_deref())?;
    Ok(Arc::new(AdbShell::new(
        adb_path,
        config.device.clone(),
        config.request_timeout,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_connect_ios() {
        let config = Config {
            host: "10.0.0.5".to_string(),
            ..Default::default()
        };
        let backend = connect(&config).unwrap();
        assert_eq!(backend.platform_name(), "ios");
    }

    #[test]
    fn test_android_requires_adb() {
        let config = Config {
            backend: BackendKind::AndroidAdb,
            adb_path: Some(PathBuf::from("/nonexistent/adb")),
            ..Default::default()
        };
        assert!(connect(&config).is_err());
    }
}
