//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Failed to parse package description {path}: {message}")]
    PackageConfig { path: PathBuf, message: String },

    #[error("sdb not found. Install the Tizen SDK or set [sdb] path in .tzbridge/config.toml")]
    SdbNotFound,

    // ─────────────────────────────────────────────────────────────
    // Transport Errors
    // ─────────────────────────────────────────────────────────────
    #[error("sdb command failed: {message}")]
    Transport { message: String },

    #[error("sdb command timed out after {secs}s: {command}")]
    Timeout { command: String, secs: u64 },

    #[error("Local file not found: {path}")]
    LocalFileMissing { path: PathBuf },

    #[error("could not push file to device: {message}")]
    Push { message: String },

    #[error("error occurred while running command {command}: {message}")]
    Command { command: String, message: String },

    #[error("could not forward local port to remote port ({local} -> {remote}): {message}")]
    PortForward {
        local: u16,
        remote: u16,
        message: String,
    },

    #[error("Browser launch failed: {message}")]
    Browser { message: String },

    // ─────────────────────────────────────────────────────────────
    // Device Script Failures (reported on stdout)
    // ─────────────────────────────────────────────────────────────
    #[error("installation failed for {file}")]
    InstallFailed { file: String, output: String },

    #[error("uninstall of {package} failed: {output}")]
    UninstallFailed { package: String, output: String },

    #[error("{subcommand} of {app} failed: {output}")]
    LaunchFailed {
        subcommand: String,
        app: String,
        output: String,
    },

    #[error("no remote port available for debugging")]
    NoDebugPort { output: String },

    // ─────────────────────────────────────────────────────────────
    // Fan-out Errors
    // ─────────────────────────────────────────────────────────────
    #[error("error while pushing files ({} failed: {})", failed.len(), failed.join(", "))]
    PushAggregate { failed: Vec<String> },

    #[error("error while installing package ({} failed: {})", failed.len(), failed.join(", "))]
    InstallAggregate { failed: Vec<String> },

    // ─────────────────────────────────────────────────────────────
    // Root Mode Errors
    // ─────────────────────────────────────────────────────────────
    /// `root off` failed after the privileged command ran. `inner` keeps the
    /// command's own error, if it failed too.
    #[error("failed to turn root mode off: {source}")]
    RootRelease {
        source: Box<Error>,
        inner: Option<Box<Error>>,
    },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn package_config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::PackageConfig {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn push(message: impl Into<String>) -> Self {
        Self::Push {
            message: message.into(),
        }
    }

    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    pub fn browser(message: impl Into<String>) -> Self {
        Self::Browser {
            message: message.into(),
        }
    }

    /// The failed command's error when `root off` also failed.
    pub fn inner_error(&self) -> Option<&Error> {
        match self {
            Error::RootRelease { inner, .. } => inner.as_deref(),
            _ => None,
        }
    }

    /// Errors raised before any remote call was made
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::InvalidRequest { .. }
                | Error::PackageConfig { .. }
                | Error::SdbNotFound
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
