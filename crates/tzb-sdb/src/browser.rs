//! Local browser launching for the web inspector

use std::process::Stdio;

use tzb_core::prelude::*;

use crate::transport::platform_shell;

/// Runs a fully substituted browser command line
#[trait_variant::make(BrowserLauncher: Send)]
pub trait LocalBrowserLauncher {
    /// Run `command` and return its stdout
    async fn launch(&self, command: &str) -> Result<String>;
}

/// [`BrowserLauncher`] that hands the command line to the platform shell
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellBrowserLauncher;

impl BrowserLauncher for ShellBrowserLauncher {
    async fn launch(&self, command: &str) -> Result<String> {
        info!("Launching browser: {}", command);

        let output = platform_shell(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::browser(format!("'{}': {}", command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::browser(format!(
                "'{}' exited with code {:?}: {}",
                command,
                output.status.code(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
