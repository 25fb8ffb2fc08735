//! Remote execution through the `sdb` command-line tool
//!
//! Every remote operation is a single `sdb` invocation whose text output is
//! classified here. Device shell commands do not report failure through the
//! exit status, so the classification also looks at known error phrases.

use std::borrow::Cow;
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;
use tzb_core::prelude::*;

/// stdout phrases that mean the remote command did not run
static STDOUT_FAILURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"command not found|No such file or directory")
        .expect("Invalid stdout failure regex")
});

/// stderr phrase that means sdb itself gave up
static STDERR_FAILURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"failed").expect("Invalid stderr failure regex"));

/// Captured output of one `sdb` invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn stdout(stdout: impl Into<String>) -> Self {
        Self::new(stdout, "")
    }
}

/// Remote executor used by the bridge
///
/// `execute` takes an sdb subcommand line (without the `sdb` program itself);
/// the other methods are the fixed subcommands the bridge relies on.
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Run `sdb <command>`
    async fn execute(&self, command: &str) -> Result<CommandOutput>;

    /// Run a command in the device shell: `sdb shell "<remote_command>"`
    async fn shell(&self, remote_command: &str) -> Result<CommandOutput>;

    /// Copy a local file to the device
    async fn push(&self, local_path: &str, remote_path: &str) -> Result<CommandOutput>;

    /// Forward a local TCP port to a device TCP port
    async fn forward(&self, local_port: u16, remote_port: u16) -> Result<CommandOutput>;

    /// Toggle root mode on the device
    async fn root(&self, on: bool) -> Result<CommandOutput>;
}

/// `sdb shell` subcommand line for a device command
pub fn shell_command(remote_command: &str) -> String {
    format!("shell \"{}\"", remote_command)
}

/// `sdb push` subcommand line
pub fn push_command(local_path: &str, remote_path: &str) -> String {
    format!("push \"{}\" \"{}\"", local_path, remote_path)
}

/// `sdb forward` subcommand line
pub fn forward_command(local_port: u16, remote_port: u16) -> String {
    format!("forward tcp:{} tcp:{}", local_port, remote_port)
}

/// `sdb root` subcommand line
pub fn root_command(on: bool) -> String {
    format!("root {}", if on { "on" } else { "off" })
}

/// Decide whether an sdb invocation failed
///
/// A non-zero exit status fails. A zero exit status still fails when stdout
/// reports a missing command/file or stderr reports a failure.
pub fn classify_output(stdout: &str, stderr: &str, exit_ok: bool) -> Result<CommandOutput> {
    if !exit_ok || STDOUT_FAILURE.is_match(stdout) || STDERR_FAILURE.is_match(stderr) {
        let message = [stdout.trim(), stderr.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        return Err(Error::transport(if message.is_empty() {
            "sdb exited with an error and no output".to_string()
        } else {
            message
        }));
    }

    Ok(CommandOutput::new(stdout, stderr))
}

/// [`Transport`] backed by the real `sdb` binary
#[derive(Debug, Clone)]
pub struct SdbTransport {
    /// Path or name of the sdb executable
    sdb_path: String,
    /// Target device serial (`sdb -s <serial>`)
    serial: Option<String>,
    /// Per-invocation timeout; `None` waits for as long as sdb runs
    timeout: Option<Duration>,
}

impl SdbTransport {
    pub fn new(sdb_path: impl Into<String>) -> Self {
        Self {
            sdb_path: sdb_path.into(),
            serial: None,
            timeout: None,
        }
    }

    pub fn with_serial(mut self, serial: Option<String>) -> Self {
        self.serial = serial;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full command line handed to the platform shell
    ///
    /// The sdb path and serial are quoted when they contain anything the
    /// shell would split or expand, e.g. an SDK under `Tizen Studio/`.
    pub fn command_line(&self, command: &str) -> String {
        let sdb = shell_quote(&self.sdb_path);
        match &self.serial {
            Some(serial) => format!("{} -s {} {}", sdb, shell_quote(serial), command),
            None => format!("{} {}", sdb, command),
        }
    }

    async fn run(&self, command: &str) -> Result<CommandOutput> {
        let line = self.command_line(command);
        debug!("sdb: {}", line);

        let mut cmd = platform_shell(&line);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| Error::Timeout {
                    command: line.clone(),
                    secs: limit.as_secs(),
                })?,
            None => cmd.output().await,
        }
        .map_err(|e| Error::transport(format!("Failed to run '{}': {}", line, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        trace!("sdb stdout: {}", stdout);
        if !stderr.is_empty() {
            trace!("sdb stderr: {}", stderr);
        }

        classify_output(&stdout, &stderr, output.status.success())
    }
}

impl Transport for SdbTransport {
    async fn execute(&self, command: &str) -> Result<CommandOutput> {
        self.run(command).await
    }

    async fn shell(&self, remote_command: &str) -> Result<CommandOutput> {
        self.run(&shell_command(remote_command)).await
    }

    async fn push(&self, local_path: &str, remote_path: &str) -> Result<CommandOutput> {
        if tokio::fs::metadata(local_path).await.is_err() {
            return Err(Error::LocalFileMissing {
                path: local_path.into(),
            });
        }
        self.run(&push_command(local_path, remote_path)).await
    }

    async fn forward(&self, local_port: u16, remote_port: u16) -> Result<CommandOutput> {
        self.run(&forward_command(local_port, remote_port)).await
    }

    async fn root(&self, on: bool) -> Result<CommandOutput> {
        self.run(&root_command(on)).await
    }
}

/// Quote `arg` as one word for the platform shell
///
/// Plain words (letters, digits and `_./:@%+=,-`) are returned unchanged.
pub fn shell_quote(arg: &str) -> Cow<'_, str> {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_./:@%+=,-".contains(c));
    if plain {
        return Cow::Borrowed(arg);
    }

    #[cfg(windows)]
    {
        Cow::Owned(format!("\"{}\"", arg.replace('"', "\"\"")))
    }

    #[cfg(not(windows))]
    {
        Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
    }
}

/// A command that runs `line` through the platform shell
pub(crate) fn platform_shell(line: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", line]);
        cmd
    }

    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", line]);
        cmd
    }
}
