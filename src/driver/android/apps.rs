//! Installed app queries and app lifecycle over adb

use super::adb::{shell_quote, ShellRunner};
use crate::driver::traits::InstalledApp;
use crate::error::{RemoteError, Result};
use log::debug;

const LAUNCHER_QUERY: &str = "cmd package query-activities -a android.intent.action.MAIN -c android.intent.category.LAUNCHER";

/// Package names from `query-activities` output, first occurrence order
pub fn parse_launcher_packages(output: &str) -> Vec<String> {
    let mut packages: Vec<String> = Vec::new();
    for line in output.lines() {
        let Some(package) = line.trim().strip_prefix("packageName=") else {
            continue;
        };
        let package = package.trim();
        if !package.is_empty() && !packages.iter().any(|p| p == package) {
            packages.push(package.to_string());
        }
    }
    packages
}

/// Launcher apps; adb has no cheap label lookup, so the name is the package
pub async fn list_apps(shell: &dyn ShellRunner) -> Result<Vec<InstalledApp>> {
    let output = shell.shell(LAUNCHER_QUERY).await?;
    Ok(parse_launcher_packages(&output)
        .into_iter()
        .map(|package| InstalledApp {
            app_name: package.clone(),
            package_name: package,
        })
        .collect())
}

pub async fn launch_app(shell: &dyn ShellRunner, package: &str) -> Result<()> {
    let output = shell
        .shell(&format!(
            "monkey -p {} -c android.intent.category.LAUNCHER 1",
            shell_quote(package)
        ))
        .await?;

    // monkey exits 0 even when nothing matched
    if output.contains("No activities found") {
        return Err(RemoteError::protocol(
            "launch app",
            format!("no launcher activity for {}", package),
        ));
    }
    debug!("Launched {}", package);
    Ok(())
}

pub async fn terminate_app(shell: &dyn ShellRunner, package: &str) -> Result<()> {
    shell
        .shell(&format!("am force-stop {}", shell_quote(package)))
        .await?;
    Ok(())
}
