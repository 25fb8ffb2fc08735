//! # tzb-sdb - Device Transport and Local Collaborators
//!
//! Everything the bridge talks to: the `sdb` command-line tool, the local
//! filesystem (glob expansion) and the local browser.
//!
//! Depends on [`tzb_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Remote Execution
//! - [`Transport`] - Remote executor (`execute`, `shell`, `push`, `forward`, `root`)
//! - [`SdbTransport`] - Implementation backed by the `sdb` binary
//! - [`classify_output()`] - Text-based failure detection for sdb output
//!
//! ### Local Files
//! - [`FileLister`] - Expands a [`tzb_core::FileSpec`] to concrete paths
//! - [`GlobLister`] - Glob-based implementation with `latest` filtering
//!
//! ### Browser
//! - [`BrowserLauncher`], [`ShellBrowserLauncher`]
//!
//! ### Tool Discovery
//! - [`locate_sdb()`] - Find `sdb` on `PATH` or in a Tizen SDK

pub mod browser;
pub mod lister;
pub mod locator;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod transport;

pub use browser::{BrowserLauncher, LocalBrowserLauncher, ShellBrowserLauncher};
pub use lister::{latest_path, FileLister, GlobLister, LocalFileLister};
pub use locator::locate_sdb;
pub use transport::{
    classify_output, CommandOutput, LocalTransport, SdbTransport, Transport,
};
