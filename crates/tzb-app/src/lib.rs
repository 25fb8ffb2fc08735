//! tzb-app - Orchestration core for Tizen Bridge
//!
//! [`Bridge`] wraps the device transport and turns the device's text output
//! into results. [`Orchestrator`] validates [`ActionRequest`]s and sequences
//! bridge calls, including the root bracket and the debug chain. The
//! `config` module loads project settings and the package description.

pub mod bridge;
pub mod config;
pub mod setup;
pub mod tasks;

pub use bridge::{get_debug_url, get_destination, Bridge, BridgeBuilder, LaunchCommand};
pub use config::{PackageConfig, Settings};
pub use setup::{build_bridge, build_orchestrator, DeviceOrchestrator};
pub use tasks::{extract_debug_port, ActionKind, ActionRequest, Orchestrator, Task};
