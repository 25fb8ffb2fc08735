//! Declarative action requests and their execution
//!
//! An [`ActionRequest`] is validated into a [`Task`], which the
//! [`Orchestrator`] maps onto [`Bridge`] calls. Privileged tasks run inside
//! the root bracket: `root on`, the task, then `root off` on every exit path.

use std::future::Future;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tzb_core::prelude::*;
use tzb_core::FileSpec;
use tzb_sdb::{BrowserLauncher, FileLister, ShellBrowserLauncher, Transport};

use crate::bridge::{Bridge, LaunchCommand};
use crate::config::{PackageConfig, DEFAULT_SCRIPT_DIR};

/// Local port forwarded to the device's debug port unless told otherwise
pub const DEFAULT_LOCAL_PORT: u16 = 8888;

/// Device-side app script shipped with the tool
pub const APP_SCRIPT_SOURCE: &str = include_str!("../scripts/tizen-app.sh");

/// File name the app script is pushed under
pub const APP_SCRIPT_NAME: &str = "tizen-app.sh";

static DEBUG_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PORT (\d+)").expect("Invalid debug port regex"));

/// Remote debug port announced in the output of `<app script> debug`
pub fn extract_debug_port(output: &str) -> Option<u16> {
    DEBUG_PORT
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

// ─────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────

/// One action as supplied by the caller (CLI, named task or JSON)
///
/// Field names are snake_case; the camelCase spellings are accepted too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionRequest {
    pub action: Option<String>,

    #[serde(alias = "asRoot")]
    pub as_root: bool,

    #[serde(alias = "localFiles", skip_serializing_if = "Option::is_none")]
    pub local_files: Option<FileSpec>,

    #[serde(alias = "remoteDir", skip_serializing_if = "Option::is_none")]
    pub remote_dir: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chmod: Option<String>,

    #[serde(alias = "remoteFiles", skip_serializing_if = "Option::is_none")]
    pub remote_files: Option<FileSpec>,

    #[serde(alias = "remoteScript", skip_serializing_if = "Option::is_none")]
    pub remote_script: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(alias = "stopOnFailure", skip_serializing_if = "Option::is_none")]
    pub stop_on_failure: Option<bool>,

    #[serde(alias = "localPort", skip_serializing_if = "Option::is_none")]
    pub local_port: Option<u16>,

    #[serde(alias = "browserCmd", skip_serializing_if = "Option::is_none")]
    pub browser_cmd: Option<String>,
}

/// Actions a request may name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Push,
    Install,
    Uninstall,
    Script,
    Start,
    Stop,
    Debug,
    Prepare,
}

impl ActionKind {
    pub const ALL: [ActionKind; 8] = [
        ActionKind::Push,
        ActionKind::Install,
        ActionKind::Uninstall,
        ActionKind::Script,
        ActionKind::Start,
        ActionKind::Stop,
        ActionKind::Debug,
        ActionKind::Prepare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Push => "push",
            ActionKind::Install => "install",
            ActionKind::Uninstall => "uninstall",
            ActionKind::Script => "script",
            ActionKind::Start => "start",
            ActionKind::Stop => "stop",
            ActionKind::Debug => "debug",
            ActionKind::Prepare => "prepare",
        }
    }

    fn expected() -> String {
        Self::ALL
            .iter()
            .map(ActionKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                Error::invalid_request(format!(
                    "unknown action '{}' (expected one of {})",
                    s,
                    Self::expected()
                ))
            })
    }
}

/// A validated request, defaults applied
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Push {
        files: FileSpec,
        remote_dir: String,
        overwrite: bool,
        chmod: Option<String>,
    },
    Install {
        files: FileSpec,
    },
    Uninstall {
        stop_on_failure: bool,
    },
    Script {
        script: String,
        args: Vec<String>,
    },
    Launch {
        command: LaunchCommand,
        stop_on_failure: bool,
    },
    Debug {
        stop_on_failure: bool,
        local_port: u16,
        browser_cmd: Option<String>,
    },
    Prepare {
        remote_dir: Option<String>,
    },
}

impl Task {
    /// Package installation needs root on the device whatever the request says
    pub fn forces_root(&self) -> bool {
        matches!(self, Task::Install { .. })
    }

    /// Whether executing the task reads the package description
    pub fn needs_metadata(&self) -> bool {
        matches!(
            self,
            Task::Uninstall { .. } | Task::Script { .. } | Task::Launch { .. } | Task::Debug { .. }
        )
    }
}

fn require<'a, T>(value: &'a Option<T>, action: ActionKind, field: &str) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| {
        Error::invalid_request(format!("action '{}' requires '{}'", action, field))
    })
}

impl ActionRequest {
    pub fn new(action: ActionKind) -> Self {
        Self {
            action: Some(action.as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn kind(&self) -> Result<ActionKind> {
        let action = self.action.as_deref().ok_or_else(|| {
            Error::invalid_request(format!(
                "missing action (expected one of {})",
                ActionKind::expected()
            ))
        })?;
        action.parse()
    }

    /// Check required fields and apply defaults
    pub fn validate(&self) -> Result<Task> {
        let kind = self.kind()?;
        let stop_on_failure = self.stop_on_failure.unwrap_or(false);

        let task = match kind {
            ActionKind::Push => Task::Push {
                files: require(&self.local_files, kind, "local_files")?.clone(),
                remote_dir: require(&self.remote_dir, kind, "remote_dir")?.clone(),
                overwrite: self.overwrite.unwrap_or(true),
                chmod: self.chmod.clone(),
            },
            ActionKind::Install => Task::Install {
                files: require(&self.remote_files, kind, "remote_files")?.clone(),
            },
            ActionKind::Uninstall => Task::Uninstall { stop_on_failure },
            ActionKind::Script => Task::Script {
                script: require(&self.remote_script, kind, "remote_script")?.clone(),
                args: self.args.clone(),
            },
            ActionKind::Start => Task::Launch {
                command: LaunchCommand::Start,
                stop_on_failure,
            },
            ActionKind::Stop => Task::Launch {
                command: LaunchCommand::Stop,
                stop_on_failure,
            },
            ActionKind::Debug => Task::Debug {
                stop_on_failure,
                local_port: self.local_port.unwrap_or(DEFAULT_LOCAL_PORT),
                browser_cmd: self.browser_cmd.clone(),
            },
            ActionKind::Prepare => Task::Prepare {
                remote_dir: self.remote_dir.clone(),
            },
        };

        Ok(task)
    }
}

// ─────────────────────────────────────────────────────────────────
// Orchestrator
// ─────────────────────────────────────────────────────────────────

/// Runs action requests against one device and one package
pub struct Orchestrator<T, L, B = ShellBrowserLauncher> {
    bridge: Bridge<T, L, B>,
    package: PackageConfig,
    browser_cmd: Option<String>,
    script_dir: String,
}

impl<T, L, B> Orchestrator<T, L, B>
where
    T: Transport,
    L: FileLister,
    B: BrowserLauncher,
{
    pub fn new(bridge: Bridge<T, L, B>, package: PackageConfig) -> Self {
        Self {
            bridge,
            package,
            browser_cmd: None,
            script_dir: DEFAULT_SCRIPT_DIR.to_string(),
        }
    }

    /// Browser template used by `debug` requests that name none
    pub fn with_browser_command(mut self, command: Option<String>) -> Self {
        self.browser_cmd = command;
        self
    }

    /// Directory `prepare` pushes the app script to by default
    pub fn with_script_dir(mut self, dir: impl Into<String>) -> Self {
        self.script_dir = dir.into();
        self
    }

    pub fn bridge(&self) -> &Bridge<T, L, B> {
        &self.bridge
    }

    pub fn package(&self) -> &PackageConfig {
        &self.package
    }

    /// Validate and execute one request
    pub async fn run(&self, request: &ActionRequest) -> Result<()> {
        let task = request.validate()?;
        let as_root = request.as_root || task.forces_root();

        // Resolve the package description before touching the device
        if task.needs_metadata() {
            self.package.meta().await?;
        }

        info!("Running {:?} (root: {})", task, as_root);
        self.with_root(as_root, self.execute(&task)).await
    }

    /// Run `command` inside the root bracket when `as_root` is set
    ///
    /// `command` is not polled if `root on` fails. Once root mode is on,
    /// `root off` runs whatever `command` returned; its failure wins and
    /// keeps the command's error as `inner`.
    pub async fn with_root<F>(&self, as_root: bool, command: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        if !as_root {
            return command.await;
        }

        self.bridge.root(true).await?;
        let outcome = command.await;

        match self.bridge.root(false).await {
            Ok(()) => outcome,
            Err(release) => Err(Error::RootRelease {
                source: Box::new(release),
                inner: outcome.err().map(Box::new),
            }),
        }
    }

    async fn execute(&self, task: &Task) -> Result<()> {
        match task {
            Task::Push {
                files,
                remote_dir,
                overwrite,
                chmod,
            } => {
                self.bridge
                    .push(files, remote_dir, *overwrite, chmod.as_deref())
                    .await
            }

            Task::Install { files } => self.bridge.install(files).await,

            Task::Uninstall { stop_on_failure } => {
                let meta = self.package.meta().await?;
                self.bridge
                    .uninstall(&meta.package_name, *stop_on_failure)
                    .await
            }

            Task::Script { script, args } => {
                let meta = self.package.meta().await?;
                let mut script_args = vec![meta.package_name.clone(), meta.id.clone()];
                script_args.extend(args.iter().cloned());

                let output = self.bridge.run_script(script, &script_args).await?;
                self.bridge.reporter().write(&output);
                Ok(())
            }

            Task::Launch {
                command,
                stop_on_failure,
            } => {
                let meta = self.package.meta().await?;
                self.bridge
                    .launch(*command, &meta.id, *stop_on_failure)
                    .await
                    .map(|_| ())
            }

            Task::Debug {
                stop_on_failure,
                local_port,
                browser_cmd,
            } => {
                let browser_cmd = browser_cmd.as_deref().or(self.browser_cmd.as_deref());
                self.debug(*stop_on_failure, *local_port, browser_cmd).await
            }

            Task::Prepare { remote_dir } => {
                let remote_dir = remote_dir.as_deref().unwrap_or(&self.script_dir);
                self.prepare(remote_dir).await
            }
        }
    }

    /// Launch in debug mode, forward the announced port, open the inspector
    async fn debug(
        &self,
        stop_on_failure: bool,
        local_port: u16,
        browser_cmd: Option<&str>,
    ) -> Result<()> {
        let meta = self.package.meta().await?;

        let Some(output) = self
            .bridge
            .launch(LaunchCommand::Debug, &meta.id, stop_on_failure)
            .await?
        else {
            return Ok(());
        };

        let remote_port = extract_debug_port(&output).ok_or_else(|| Error::NoDebugPort {
            output: output.trim().to_string(),
        })?;
        debug!("Remote debug port: {}", remote_port);

        self.bridge.port_forward(local_port, remote_port).await?;

        if let Some(template) = browser_cmd {
            let stdout = self.bridge.run_browser(template, local_port).await?;
            if !stdout.trim().is_empty() {
                self.bridge.reporter().write(&stdout);
            }
        }

        Ok(())
    }

    /// Install the bundled app script on the device
    async fn prepare(&self, remote_dir: &str) -> Result<()> {
        // Removed when dropped, after the push
        let staging = stage_app_script().await?;
        let local = staging
            .path()
            .join(APP_SCRIPT_NAME)
            .to_string_lossy()
            .to_string();

        self.bridge
            .push(&FileSpec::Single(local), remote_dir, true, Some("+x"))
            .await
    }
}

/// Write the bundled app script into a fresh staging directory
///
/// Each run gets its own directory so concurrent runs never share the file.
async fn stage_app_script() -> Result<TempDir> {
    let dir = tempfile::Builder::new()
        .prefix("tzbridge-")
        .tempdir()
        .context("Failed to create staging directory")?;

    tokio::fs::write(dir.path().join(APP_SCRIPT_NAME), APP_SCRIPT_SOURCE)
        .await
        .with_context(|| format!("Failed to stage {}", APP_SCRIPT_NAME))?;

    Ok(dir)
}
