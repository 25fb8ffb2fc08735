//! Wiring of the real collaborators from project settings

use std::path::Path;
use std::sync::Arc;

use tzb_core::prelude::*;
use tzb_core::Reporter;
use tzb_sdb::{locate_sdb, GlobLister, SdbTransport, ShellBrowserLauncher};

use crate::bridge::{Bridge, BridgeBuilder};
use crate::config::{PackageConfig, Settings};
use crate::tasks::Orchestrator;

/// Orchestrator talking to a real device through `sdb`
pub type DeviceOrchestrator = Orchestrator<SdbTransport, GlobLister, ShellBrowserLauncher>;

/// Bridge for `project_dir`: local patterns resolve against it
pub fn build_bridge(
    project_dir: &Path,
    settings: &Settings,
    reporter: Arc<dyn Reporter>,
) -> Result<Bridge<SdbTransport, GlobLister, ShellBrowserLauncher>> {
    let sdb = locate_sdb(settings.sdb.path.as_deref())?;
    debug!("Using sdb at {}", sdb);

    let transport = SdbTransport::new(sdb)
        .with_serial(settings.sdb.serial.clone())
        .with_timeout(settings.sdb.timeout());

    BridgeBuilder::new()
        .transport(transport)
        .file_lister(GlobLister::with_base_dir(project_dir))
        .browser_launcher(ShellBrowserLauncher)
        .reporter(reporter)
        .app_script(settings.device.app_script.clone())
        .build()
}

pub fn build_orchestrator(
    project_dir: &Path,
    settings: &Settings,
    reporter: Arc<dyn Reporter>,
) -> Result<DeviceOrchestrator> {
    let bridge = build_bridge(project_dir, settings, reporter)?;
    let package = PackageConfig::new(project_dir.join(&settings.project.config_xml));

    Ok(Orchestrator::new(bridge, package)
        .with_browser_command(settings.browser.command.clone())
        .with_script_dir(settings.device.script_dir.clone()))
}
