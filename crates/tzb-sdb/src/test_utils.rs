//! Test doubles for the sdb collaborators
//!
//! Each fake is a cheap handle around shared state: clone it, hand one clone
//! to the code under test and inspect the other afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tzb_core::prelude::*;
use tzb_core::FileSpec;

use crate::browser::BrowserLauncher;
use crate::lister::FileLister;
use crate::transport::{
    forward_command, push_command, root_command, shell_command, CommandOutput, Transport,
};

/// One call received by [`FakeTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Execute(String),
    Shell(String),
    Push { local: String, remote: String },
    Forward { local: u16, remote: u16 },
    Root(bool),
}

impl fmt::Display for TransportCall {
    /// The sdb subcommand line the real transport would run
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportCall::Execute(command) => write!(f, "{}", command),
            TransportCall::Shell(command) => write!(f, "{}", shell_command(command)),
            TransportCall::Push { local, remote } => write!(f, "{}", push_command(local, remote)),
            TransportCall::Forward { local, remote } => {
                write!(f, "{}", forward_command(*local, *remote))
            }
            TransportCall::Root(on) => write!(f, "{}", root_command(*on)),
        }
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Stdout(String),
    Fail(String),
}

#[derive(Debug, Default)]
struct FakeTransportState {
    calls: Vec<TransportCall>,
    rules: Vec<(String, Reply)>,
}

/// Scripted [`Transport`]
///
/// Replies are chosen by the first rule whose needle occurs in the call's
/// subcommand line (see [`TransportCall`]'s `Display`). Calls no rule
/// matches succeed with empty output.
#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeTransportState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `stdout` to calls containing `needle`
    pub fn on(self, needle: &str, stdout: &str) -> Self {
        self.add_rule(needle, Reply::Stdout(stdout.to_string()));
        self
    }

    /// Fail calls containing `needle` with a transport error carrying `message`
    pub fn fail_on(self, needle: &str, message: &str) -> Self {
        self.add_rule(needle, Reply::Fail(message.to_string()));
        self
    }

    fn add_rule(&self, needle: &str, reply: Reply) {
        self.state
            .lock()
            .unwrap()
            .rules
            .push((needle.to_string(), reply));
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Subcommand lines of all calls, in order
    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.to_string()).collect()
    }

    /// Number of calls whose subcommand line contains `needle`
    pub fn count(&self, needle: &str) -> usize {
        self.lines().iter().filter(|l| l.contains(needle)).count()
    }

    fn reply(&self, call: TransportCall) -> Result<CommandOutput> {
        let line = call.to_string();
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);

        let reply = state
            .rules
            .iter()
            .find(|(needle, _)| line.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Reply::Stdout(stdout)) => Ok(CommandOutput::stdout(stdout)),
            Some(Reply::Fail(message)) => Err(Error::transport(message)),
            None => Ok(CommandOutput::default()),
        }
    }
}

impl Transport for FakeTransport {
    async fn execute(&self, command: &str) -> Result<CommandOutput> {
        self.reply(TransportCall::Execute(command.to_string()))
    }

    async fn shell(&self, remote_command: &str) -> Result<CommandOutput> {
        tokio::task::yield_now().await;
        self.reply(TransportCall::Shell(remote_command.to_string()))
    }

    async fn push(&self, local_path: &str, remote_path: &str) -> Result<CommandOutput> {
        tokio::task::yield_now().await;
        self.reply(TransportCall::Push {
            local: local_path.to_string(),
            remote: remote_path.to_string(),
        })
    }

    async fn forward(&self, local_port: u16, remote_port: u16) -> Result<CommandOutput> {
        self.reply(TransportCall::Forward {
            local: local_port,
            remote: remote_port,
        })
    }

    async fn root(&self, on: bool) -> Result<CommandOutput> {
        self.reply(TransportCall::Root(on))
    }
}

/// [`FileLister`] with canned pattern expansions
#[derive(Debug, Clone, Default)]
pub struct FakeLister {
    patterns: Arc<Mutex<HashMap<String, Vec<String>>>>,
}

impl FakeLister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand `pattern` to `paths`, whatever its filter
    pub fn with_matches(self, pattern: &str, paths: &[&str]) -> Self {
        self.patterns.lock().unwrap().insert(
            pattern.to_string(),
            paths.iter().map(|p| p.to_string()).collect(),
        );
        self
    }
}

impl FileLister for FakeLister {
    async fn list(&self, spec: &FileSpec) -> Result<Vec<String>> {
        match spec {
            FileSpec::Pattern { pattern, .. } => self
                .patterns
                .lock()
                .unwrap()
                .get(pattern)
                .cloned()
                .ok_or_else(|| Error::invalid_request(format!("unexpected pattern {}", pattern))),
            literal => Ok(literal.as_literal_paths().unwrap_or_default()),
        }
    }
}

/// [`BrowserLauncher`] that records command lines
#[derive(Debug, Clone, Default)]
pub struct FakeBrowser {
    commands: Arc<Mutex<Vec<String>>>,
    failure: Option<String>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            commands: Arc::default(),
            failure: Some(message.to_string()),
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl BrowserLauncher for FakeBrowser {
    async fn launch(&self, command: &str) -> Result<String> {
        self.commands.lock().unwrap().push(command.to_string());
        match &self.failure {
            Some(message) => Err(Error::browser(message.clone())),
            None => Ok(String::new()),
        }
    }
}
