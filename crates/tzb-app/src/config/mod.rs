//! Configuration for Tizen Bridge
//!
//! Supports:
//! - `.tzbridge/config.toml` - Project settings and named tasks
//! - `config.xml` - The widget's package description (application identity)

pub mod package;
pub mod settings;
pub mod types;

pub use package::{parse_config_xml, PackageConfig, DEFAULT_CONFIG_XML};
pub use settings::{find_task, init_config_dir, load_settings};
pub use types::*;
