//! Settings parser for .tzbridge/config.toml

use super::types::Settings;
use crate::tasks::ActionRequest;
use std::path::Path;
use tzb_core::prelude::*;

const CONFIG_FILENAME: &str = "config.toml";
const TZBRIDGE_DIR: &str = ".tzbridge";

const DEFAULT_CONFIG: &str = r#"# Tizen Bridge Configuration

[sdb]
# path = "/opt/tizen-studio/tools/sdb"   # Default: found on PATH or in $TIZEN_SDK
# serial = "emulator-26101"              # Target device when several are attached
# timeout_secs = 120                     # Default: wait for sdb indefinitely

[device]
app_script = "/home/developer/tizen-app.sh"
script_dir = "/home/developer"

[project]
config_xml = "config.xml"

[browser]
# %URL% is replaced by the web inspector URL
# command = "google-chrome %URL%"

# Named tasks, run with `tzbridge task <name>`
#
# [tasks.deploy]
# action = "push"
# local_files = { pattern = "build/*.wgt", filter = "latest" }
# remote_dir = "/tmp"
#
# [tasks.install]
# action = "install"
# remote_files = { pattern = "/tmp/*.wgt", filter = "latest" }
"#;

/// Load settings from .tzbridge/config.toml
///
/// A missing file yields defaults. An unreadable or invalid file is reported
/// and also yields defaults.
pub fn load_settings(project_path: &Path) -> Settings {
    let config_path = project_path.join(TZBRIDGE_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Create .tzbridge/config.toml with commented defaults
///
/// An existing file is left untouched.
pub fn init_config_dir(project_path: &Path) -> Result<()> {
    let dir = project_path.join(TZBRIDGE_DIR);

    std::fs::create_dir_all(&dir)
        .map_err(|e| Error::config(format!("Failed to create {} dir: {}", TZBRIDGE_DIR, e)))?;

    let config_path = dir.join(CONFIG_FILENAME);
    if config_path.exists() {
        debug!("{:?} already exists", config_path);
        return Ok(());
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {:?}", config_path))?;

    info!("Created {:?}", config_path);
    Ok(())
}

/// Look up a named task
pub fn find_task<'a>(settings: &'a Settings, name: &str) -> Result<&'a ActionRequest> {
    settings.tasks.get(name).ok_or_else(|| {
        let known = settings
            .tasks
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Error::invalid_request(format!(
            "no task named '{}' (known tasks: {})",
            name,
            if known.is_empty() { "none" } else { known.as_str() }
        ))
    })
}
