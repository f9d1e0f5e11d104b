use crate::error::{RemoteError, Result};
use log::debug;
use std::path::{Path, PathBuf};

fn adb_file_name() -> &'static str {
    if cfg!(windows) {
        "adb.exe"
    } else {
        "adb"
    }
}

/// Find the adb binary.
///
/// Order: explicit path, `$ANDROID_HOME/platform-tools`, the install
/// directory (`~/.lumi-tester/platform-tools`), then the system PATH.
pub fn find_adb(explicit: Option<&Path>) -> Result<PathBuf> {
    let android_home = std::env::var_os("ANDROID_HOME").map(PathBuf::from);
    let install_dir = dirs::home_dir().map(|home| home.join(".lumi-tester"));
    resolve_adb(explicit, android_home.as_deref(), install_dir.as_deref())
}

fn resolve_adb(
    explicit: Option<&Path>,
    android_home: Option<&Path>,
    install_dir: Option<&Path>,
) -> Result<PathBuf> {
    let mut checked_paths = Vec::new();

    // An explicit path is never second-guessed
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(RemoteError::BinaryNotFound {
            name: "adb".to_string(),
            checked: format!("Explicit: {:?}", path),
        });
    }

    let candidates = [
        ("ANDROID_HOME", android_home),
        ("Install Dir", install_dir),
    ];
    for (source, dir) in candidates {
        if let Some(dir) = dir {
            let path = dir.join("platform-tools").join(adb_file_name());
            checked_paths.push(format!("{}: {:?}", source, path));
            if path.exists() {
                debug!("Using adb from {}", source);
                return Ok(path);
            }
        }
    }

    if let Ok(path) = which::which(adb_file_name()) {
        return Ok(path);
    }
    checked_paths.push("System PATH".to_string());

    Err(RemoteError::BinaryNotFound {
        name: "adb".to_string(),
        checked: checked_paths.join("\n"),
    })
}
