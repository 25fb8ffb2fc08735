//! Command-line interface
//!
//! Every device subcommand is turned into an [`ActionRequest`], the same
//! structure named tasks and `tzbridge request` use.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use tzb_app::config::{find_task, Settings};
use tzb_app::{ActionKind, ActionRequest};
use tzb_core::prelude::*;
use tzb_core::FileSpec;

/// Tizen Bridge - deploy, install and debug web apps on Tizen devices
#[derive(Parser, Debug)]
#[command(name = "tzbridge", version)]
#[command(about = "Deploy, install and debug web apps on Tizen devices via sdb", long_about = None)]
pub struct Args {
    /// Project directory (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Run the action with device root mode on
    #[arg(long, global = true)]
    pub root: bool,

    /// Emit NDJSON events instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    /// Mirror debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Files given on the command line
#[derive(ClapArgs, Debug, Clone)]
pub struct FileArgs {
    /// Paths, or a single glob pattern
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<String>,

    /// Keep only the newest file matching the pattern
    #[arg(long)]
    pub latest: bool,
}

impl FileArgs {
    pub fn to_spec(&self) -> Result<FileSpec> {
        match self.files.as_slice() {
            [single] if self.latest => Ok(FileSpec::latest(single.as_str())),
            [single] if is_pattern(single) => Ok(FileSpec::pattern(single.as_str())),
            [single] => Ok(FileSpec::Single(single.clone())),
            _ if self.latest => Err(Error::invalid_request(
                "--latest takes a single pattern",
            )),
            many => Ok(FileSpec::List(many.to_vec())),
        }
    }
}

fn is_pattern(path: &str) -> bool {
    path.contains(['*', '?', '['])
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Push local files to a device directory
    Push {
        #[command(flatten)]
        files: FileArgs,

        /// Destination directory on the device
        #[arg(short = 'd', long, value_name = "DIR")]
        remote_dir: String,

        /// Skip files that already exist on the device
        #[arg(long)]
        no_overwrite: bool,

        /// chmod mode applied to each pushed file (e.g. +x, 755)
        #[arg(long, value_name = "MODE")]
        chmod: Option<String>,
    },

    /// Install packages already on the device (runs as root)
    Install {
        #[command(flatten)]
        files: FileArgs,
    },

    /// Uninstall the project's package
    Uninstall {
        #[arg(long)]
        stop_on_failure: bool,
    },

    /// Run a script on the device with the package name and app id as first arguments
    Script {
        /// Script path on the device
        script: String,

        /// Extra arguments, passed after the package name and app id
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Start the project's application
    Start {
        #[arg(long)]
        stop_on_failure: bool,
    },

    /// Stop the project's application
    Stop {
        #[arg(long)]
        stop_on_failure: bool,
    },

    /// Launch in debug mode and forward the web inspector port
    Debug {
        /// Local port forwarded to the device's debug port
        #[arg(short = 'p', long)]
        local_port: Option<u16>,

        /// Browser command; %URL% is replaced by the inspector URL
        #[arg(long, value_name = "CMD")]
        browser: Option<String>,

        #[arg(long)]
        stop_on_failure: bool,
    },

    /// Push the device-side app script
    Prepare {
        /// Destination directory (default: [device] script_dir)
        #[arg(short = 'd', long, value_name = "DIR")]
        remote_dir: Option<String>,
    },

    /// Run a task from .tzbridge/config.toml
    Task { name: String },

    /// Run an action request given as JSON
    Request {
        /// ActionRequest object, e.g. '{"action": "start"}'
        #[arg(value_name = "JSON")]
        body: String,
    },

    /// Create .tzbridge/config.toml with defaults
    Init,
}

impl Command {
    /// The request this command runs; `None` for commands that do not talk to a device
    pub fn to_request(&self, settings: &Settings) -> Result<Option<ActionRequest>> {
        let request = match self {
            Command::Push {
                files,
                remote_dir,
                no_overwrite,
                chmod,
            } => ActionRequest {
                local_files: Some(files.to_spec()?),
                remote_dir: Some(remote_dir.clone()),
                overwrite: Some(!no_overwrite),
                chmod: chmod.clone(),
                ..ActionRequest::new(ActionKind::Push)
            },
            Command::Install { files } => ActionRequest {
                remote_files: Some(files.to_spec()?),
                ..ActionRequest::new(ActionKind::Install)
            },
            Command::Uninstall { stop_on_failure } => {
                stop_on(ActionKind::Uninstall, *stop_on_failure)
            }
            Command::Script { script, args } => ActionRequest {
                remote_script: Some(script.clone()),
                args: args.clone(),
                ..ActionRequest::new(ActionKind::Script)
            },
            Command::Start { stop_on_failure } => stop_on(ActionKind::Start, *stop_on_failure),
            Command::Stop { stop_on_failure } => stop_on(ActionKind::Stop, *stop_on_failure),
            Command::Debug {
                local_port,
                browser,
                stop_on_failure,
            } => ActionRequest {
                local_port: *local_port,
                browser_cmd: browser.clone(),
                ..stop_on(ActionKind::Debug, *stop_on_failure)
            },
            Command::Prepare { remote_dir } => ActionRequest {
                remote_dir: remote_dir.clone(),
                ..ActionRequest::new(ActionKind::Prepare)
            },
            Command::Task { name } => find_task(settings, name)?.clone(),
            Command::Request { body } => serde_json::from_str(body)
                .map_err(|e| Error::invalid_request(format!("malformed JSON request: {}", e)))?,
            Command::Init => return Ok(None),
        };

        Ok(Some(request))
    }
}

fn stop_on(kind: ActionKind, stop_on_failure: bool) -> ActionRequest {
    ActionRequest {
        stop_on_failure: Some(stop_on_failure),
        ..ActionRequest::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("tzbridge").chain(args.iter().copied())).unwrap()
    }

    fn request(args: &[&str]) -> ActionRequest {
        parse(args)
            .command
            .to_request(&Settings::default())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_push_pattern_with_latest() {
        let req = request(&["push", "build/*.wgt", "--latest", "-d", "/tmp"]);
        assert_eq!(req.action.as_deref(), Some("push"));
        assert_eq!(req.local_files, Some(FileSpec::latest("build/*.wgt")));
        assert_eq!(req.remote_dir.as_deref(), Some("/tmp"));
        assert_eq!(req.overwrite, Some(true));
    }

    #[test]
    fn test_push_file_list() {
        let req = request(&["push", "a.js", "b.js", "--remote-dir", "/tmp", "--no-overwrite"]);
        assert_eq!(
            req.local_files,
            Some(FileSpec::List(vec!["a.js".into(), "b.js".into()]))
        );
        assert_eq!(req.overwrite, Some(false));
    }

    #[test]
    fn test_latest_rejects_several_files() {
        let args = parse(&["install", "a.wgt", "b.wgt", "--latest"]);
        assert!(args.command.to_request(&Settings::default()).is_err());
    }

    #[test]
    fn test_install_single_file() {
        let req = request(&["install", "/tmp/app.wgt"]);
        assert_eq!(req.remote_files, Some(FileSpec::Single("/tmp/app.wgt".into())));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["start", "--root", "--json", "--project", "/work/app"]);
        assert!(args.root);
        assert!(args.json);
        assert_eq!(args.project, Some(PathBuf::from("/work/app")));
    }

    #[test]
    fn test_script_keeps_hyphenated_args() {
        let req = request(&["script", "/tmp/run.sh", "--fast", "-n", "3"]);
        assert_eq!(req.remote_script.as_deref(), Some("/tmp/run.sh"));
        assert_eq!(req.args, vec!["--fast", "-n", "3"]);
    }

    #[test]
    fn test_debug_options() {
        let req = request(&["debug", "-p", "9222", "--browser", "chromium %URL%"]);
        assert_eq!(req.local_port, Some(9222));
        assert_eq!(req.browser_cmd.as_deref(), Some("chromium %URL%"));
        assert_eq!(req.stop_on_failure, Some(false));
    }

    #[test]
    fn test_request_json() {
        let req = request(&["request", r#"{"action":"stop","stopOnFailure":true}"#]);
        assert_eq!(req.action.as_deref(), Some("stop"));
        assert_eq!(req.stop_on_failure, Some(true));
    }

    #[test]
    fn test_request_with_json_output() {
        let args = parse(&["--json", "request", r#"{"action":"start","asRoot":true}"#]);
        assert!(args.json);

        let req = args
            .command
            .to_request(&Settings::default())
            .unwrap()
            .unwrap();
        assert_eq!(req.action.as_deref(), Some("start"));
        assert!(req.as_root);
    }

    #[test]
    fn test_malformed_request_is_configuration_error() {
        let args = parse(&["request", "{not json"]);
        let err = args.command.to_request(&Settings::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unknown_task() {
        let args = parse(&["task", "deploy"]);
        let err = args.command.to_request(&Settings::default()).unwrap_err();
        assert!(err.to_string().contains("no task named 'deploy'"));
    }

    #[test]
    fn test_init_has_no_request() {
        let args = parse(&["init"]);
        assert!(args
            .command
            .to_request(&Settings::default())
            .unwrap()
            .is_none());
    }
}
