//! Configuration types for Tizen Bridge
//!
//! Defines:
//! - `Settings` - Project settings (`.tzbridge/config.toml`)
//! - Per-section settings and their defaults

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use super::package::DEFAULT_CONFIG_XML;
use crate::bridge::DEFAULT_APP_SCRIPT;
use crate::tasks::ActionRequest;

/// Default directory the app script is pushed to
pub const DEFAULT_SCRIPT_DIR: &str = "/home/developer";

/// Project settings (.tzbridge/config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub sdb: SdbSettings,

    #[serde(default)]
    pub device: DeviceSettings,

    #[serde(default)]
    pub project: ProjectSettings,

    #[serde(default)]
    pub browser: BrowserSettings,

    /// Named action requests, run with `tzbridge task <name>`
    #[serde(default)]
    pub tasks: BTreeMap<String, ActionRequest>,
}

/// How to reach the device
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SdbSettings {
    /// sdb executable; located on PATH / in the SDK when absent
    #[serde(default)]
    pub path: Option<String>,

    /// Device serial, for hosts with several devices attached
    #[serde(default)]
    pub serial: Option<String>,

    /// Give up on a single sdb invocation after this many seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl SdbSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Device-side locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceSettings {
    /// Path of the app script on the device
    #[serde(default = "default_app_script")]
    pub app_script: String,

    /// Where `prepare` pushes the app script
    #[serde(default = "default_script_dir")]
    pub script_dir: String,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            app_script: default_app_script(),
            script_dir: default_script_dir(),
        }
    }
}

fn default_app_script() -> String {
    DEFAULT_APP_SCRIPT.to_string()
}

fn default_script_dir() -> String {
    DEFAULT_SCRIPT_DIR.to_string()
}

/// Local project layout
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectSettings {
    /// Package description, relative to the project directory
    #[serde(default = "default_config_xml")]
    pub config_xml: PathBuf,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            config_xml: default_config_xml(),
        }
    }
}

fn default_config_xml() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_XML)
}

/// Web inspector launching
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BrowserSettings {
    /// Command template; `%URL%` is replaced by the inspector URL
    #[serde(default)]
    pub command: Option<String>,
}
