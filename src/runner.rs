//! Runs one CLI invocation: settings, reporter, orchestrator

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use tzb_app::config::{init_config_dir, load_settings};
use tzb_app::build_orchestrator;
use tzb_core::prelude::*;
use tzb_core::{ConsoleReporter, JsonReporter, Reporter};

use crate::cli::{Args, Command};

/// Exit status for a failed invocation
///
/// Requests rejected before reaching the device exit with 2, everything
/// else with 1.
pub fn exit_code(err: &Error) -> u8 {
    if err.is_configuration() {
        2
    } else {
        1
    }
}

/// Run the parsed command line and report its outcome
pub async fn run(args: Args) -> ExitCode {
    if let Err(e) = tzb_core::logging::init(args.verbose) {
        eprintln!("Warning: file logging disabled: {}", e);
    }

    let reporter: Arc<dyn Reporter> = if args.json {
        Arc::new(JsonReporter::stdout())
    } else {
        Arc::new(ConsoleReporter)
    };

    let project_dir = args
        .project
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    info!("Project: {}", project_dir.display());

    match execute(&args, &project_dir, reporter.clone()).await {
        Ok(()) => {
            info!("Tizen Bridge exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Command failed: {:?}", e);
            reporter.error(&e.to_string());
            if let Some(inner) = e.inner_error() {
                reporter.error(&format!("the command itself also failed: {}", inner));
            }
            if !e.is_configuration() {
                reporter.warn(&format!(
                    "details in {}",
                    tzb_core::logging::get_current_log_file().display()
                ));
            }
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn execute(args: &Args, project_dir: &Path, reporter: Arc<dyn Reporter>) -> Result<()> {
    if matches!(args.command, Command::Init) {
        init_config_dir(project_dir)?;
        reporter.ok(&format!(
            "configuration ready in {}",
            project_dir.join(".tzbridge").display()
        ));
        return Ok(());
    }

    let settings = load_settings(project_dir);

    let Some(mut request) = args.command.to_request(&settings)? else {
        return Ok(());
    };
    request.as_root |= args.root;

    let orchestrator = build_orchestrator(project_dir, &settings, reporter)?;
    orchestrator.run(&request).await
}
