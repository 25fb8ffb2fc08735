//! Remote operations against a Tizen device
//!
//! [`Bridge`] performs one remote (or local/remote) operation per method and
//! turns the device's text output into success, failure or structured values.
//! The device-side app script reports most failures on stdout with a zero
//! exit status, so several methods inspect output for known failure phrases.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use futures_util::future::join_all;
use regex::Regex;
use tzb_core::prelude::*;
use tzb_core::{FileSpec, Reporter, TracingReporter};
use tzb_sdb::{BrowserLauncher, FileLister, ShellBrowserLauncher, Transport};

/// Default location of the app script on the device
pub const DEFAULT_APP_SCRIPT: &str = "/home/developer/tizen-app.sh";

/// Interpreter used for every remote script invocation
const SCRIPT_INTERPRETER: &str = "/bin/sh";

/// Printed by the package manager when an install fails
const INSTALL_FAILURE_TOKEN: &str = "key[end] val[fail]";

/// sdb messages that mean a push did not reach the device
const PUSH_FAILURES: &[&str] = &["failed to copy", "cannot stat", "device not found"];

/// Token replaced by the debug URL in browser command templates
const URL_TOKEN: &str = "%URL%";

static UNINSTALL_FAILURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"not installed|failed").expect("Invalid uninstall regex"));

static LAUNCH_FAILURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"running|does not exist|failed").expect("Invalid launch regex")
});

/// App-script subcommands that control a running application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchCommand {
    Start,
    Stop,
    Debug,
}

impl LaunchCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchCommand::Start => "start",
            LaunchCommand::Stop => "stop",
            LaunchCommand::Debug => "debug",
        }
    }
}

impl std::fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Remote path for `local_path` inside `remote_dir`
///
/// Exactly one trailing `/` is stripped from `remote_dir` before joining.
pub fn get_destination(local_path: &str, remote_dir: &str) -> String {
    let dir = remote_dir.strip_suffix('/').unwrap_or(remote_dir);
    let basename = Path::new(local_path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| local_path.to_string());
    format!("{}/{}", dir, basename)
}

/// Web inspector URL for a forwarded debug port
pub fn get_debug_url(local_port: u16) -> String {
    format!("http://localhost:{}/inspector.html?page=1", local_port)
}

/// Split `ls -1` output into paths, newest first
fn parse_listing(stdout: &str) -> Vec<String> {
    let cleaned = stdout.replace('\r', "");
    if cleaned.trim().is_empty() {
        return Vec::new();
    }
    cleaned
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Remote operations against one device
pub struct Bridge<T, L, B = ShellBrowserLauncher> {
    transport: T,
    lister: L,
    browser: Option<B>,
    reporter: Arc<dyn Reporter>,
    app_script: Option<String>,
}

/// Explicit construction of a [`Bridge`]
///
/// Transport and file lister are required; browser launcher, reporter and
/// app-script path are optional. Without a reporter, messages go to
/// [`TracingReporter`].
pub struct BridgeBuilder<T, L, B = ShellBrowserLauncher> {
    transport: Option<T>,
    lister: Option<L>,
    browser: Option<B>,
    reporter: Option<Arc<dyn Reporter>>,
    app_script: Option<String>,
}

impl<T, L> BridgeBuilder<T, L, ShellBrowserLauncher> {
    pub fn new() -> Self {
        Self {
            transport: None,
            lister: None,
            browser: None,
            reporter: None,
            app_script: None,
        }
    }
}

impl<T, L> Default for BridgeBuilder<T, L, ShellBrowserLauncher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, L, B> BridgeBuilder<T, L, B> {
    pub fn transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn file_lister(mut self, lister: L) -> Self {
        self.lister = Some(lister);
        self
    }

    pub fn browser_launcher<B2>(self, browser: B2) -> BridgeBuilder<T, L, B2> {
        BridgeBuilder {
            transport: self.transport,
            lister: self.lister,
            browser: Some(browser),
            reporter: self.reporter,
            app_script: self.app_script,
        }
    }

    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn app_script(mut self, path: impl Into<String>) -> Self {
        self.app_script = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Bridge<T, L, B>> {
        let transport = self
            .transport
            .ok_or_else(|| Error::config("bridge requires a transport"))?;
        let lister = self
            .lister
            .ok_or_else(|| Error::config("bridge requires a file lister"))?;

        Ok(Bridge {
            transport,
            lister,
            browser: self.browser,
            reporter: self.reporter.unwrap_or_else(|| Arc::new(TracingReporter)),
            app_script: self.app_script,
        })
    }
}

impl<T, L, B> Bridge<T, L, B>
where
    T: Transport,
    L: FileLister,
    B: BrowserLauncher,
{
    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    pub fn app_script(&self) -> Option<&str> {
        self.app_script.as_deref()
    }

    // ─────────────────────────────────────────────────────────────
    // Remote filesystem
    // ─────────────────────────────────────────────────────────────

    /// Whether `remote_path` exists on the device
    pub async fn file_exists(&self, remote_path: &str) -> Result<bool> {
        match self.transport.shell(&format!("stat {}", remote_path)).await {
            Ok(_) => Ok(true),
            Err(e) if e.to_string().contains("No such file or directory") => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn chmod(&self, remote_path: &str, mode: &str) -> Result<()> {
        self.transport
            .shell(&format!("chmod {} {}", mode, remote_path))
            .await?;
        debug!("chmod {} {}", mode, remote_path);
        Ok(())
    }

    /// Resolve `spec` against the device filesystem
    ///
    /// Literal paths are returned unchanged. Patterns are expanded with
    /// `ls -1 -c`, which lists the newest file first.
    pub async fn list_remote_files(&self, spec: &FileSpec) -> Result<Vec<String>> {
        let (pattern, filter) = match spec {
            FileSpec::Pattern { pattern, filter } => (pattern, filter),
            literal => return Ok(literal.as_literal_paths().unwrap_or_default()),
        };

        let output = self
            .transport
            .shell(&format!("ls -1 -c {}", pattern))
            .await?;
        let mut files = parse_listing(&output.stdout);

        if filter.is_some() {
            files.truncate(1);
        }

        debug!("Remote files for {}: {:?}", spec, files);
        Ok(files)
    }

    // ─────────────────────────────────────────────────────────────
    // Push
    // ─────────────────────────────────────────────────────────────

    pub async fn push_raw(&self, local_path: &str, remote_path: &str) -> Result<()> {
        match self.transport.push(local_path, remote_path).await {
            Ok(_) => {
                self.reporter
                    .ok(&format!("pushed {} to {}", local_path, remote_path));
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                if PUSH_FAILURES.iter().any(|p| message.contains(p)) {
                    Err(Error::push(format!(
                        "{} -> {}: {}",
                        local_path, remote_path, message
                    )))
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Push one file into `remote_dir`
    ///
    /// Without `overwrite`, an existing destination is left alone and the
    /// call succeeds.
    pub async fn push_one(
        &self,
        local_path: &str,
        remote_dir: &str,
        overwrite: bool,
        chmod: Option<&str>,
    ) -> Result<()> {
        let destination = get_destination(local_path, remote_dir);

        if !overwrite && self.file_exists(&destination).await? {
            self.reporter.warn(&format!(
                "not pushing {}: {} already exists and overwrite is off",
                local_path, destination
            ));
            return Ok(());
        }

        self.push_raw(local_path, &destination).await?;

        if let Some(mode) = chmod {
            self.chmod(&destination, mode).await?;
        }

        Ok(())
    }

    /// Push every file `spec` resolves to, concurrently
    ///
    /// Every push runs to completion; the call fails if any of them failed.
    pub async fn push(
        &self,
        spec: &FileSpec,
        remote_dir: &str,
        overwrite: bool,
        chmod: Option<&str>,
    ) -> Result<()> {
        let files = self.lister.list(spec).await?;

        if files.is_empty() {
            self.reporter
                .warn(&format!("no local files matched {}", spec));
            return Ok(());
        }

        let results = join_all(
            files
                .iter()
                .map(|file| self.push_one(file, remote_dir, overwrite, chmod)),
        )
        .await;

        let failed = self.collect_failures(&files, results);
        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::PushAggregate { failed })
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Scripts
    // ─────────────────────────────────────────────────────────────

    /// Run a script on the device and return its stdout
    pub async fn run_script(&self, script_path: &str, args: &[String]) -> Result<String> {
        let command = std::iter::once(SCRIPT_INTERPRETER)
            .chain(std::iter::once(script_path))
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");

        match self.transport.shell(&command).await {
            Ok(output) => Ok(output.stdout),
            Err(e) => Err(Error::command(command, e.to_string())),
        }
    }

    /// Run `<app script> <command> [args...]`; output is not interpreted
    pub async fn run_app_script(&self, command: &str, args: &[String]) -> Result<String> {
        let script = self
            .app_script
            .as_deref()
            .ok_or_else(|| Error::config("no device app script configured"))?;

        let mut full_args = Vec::with_capacity(args.len() + 1);
        full_args.push(command.to_string());
        full_args.extend_from_slice(args);

        self.run_script(script, &full_args).await
    }

    // ─────────────────────────────────────────────────────────────
    // Packages
    // ─────────────────────────────────────────────────────────────

    pub async fn install_one(&self, remote_file: &str) -> Result<()> {
        let output = self
            .run_app_script("install", &[remote_file.to_string()])
            .await?;
        self.reporter.write(&output);

        if output.contains(INSTALL_FAILURE_TOKEN) {
            return Err(Error::InstallFailed {
                file: remote_file.to_string(),
                output,
            });
        }

        self.reporter.ok(&format!("installed {}", remote_file));
        Ok(())
    }

    /// Install every package `spec` resolves to on the device, concurrently
    ///
    /// Nothing to install is not an error.
    pub async fn install(&self, spec: &FileSpec) -> Result<()> {
        let files = self.list_remote_files(spec).await?;

        if files.is_empty() {
            self.reporter
                .warn(&format!("no packages to install for {}", spec));
            return Ok(());
        }

        let results = join_all(files.iter().map(|file| self.install_one(file))).await;

        let failed = self.collect_failures(&files, results);
        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::InstallAggregate { failed })
        }
    }

    pub async fn uninstall(&self, package_name: &str, stop_on_failure: bool) -> Result<()> {
        let failure = match self
            .run_app_script("uninstall", &[package_name.to_string()])
            .await
        {
            Ok(output) if UNINSTALL_FAILURE.is_match(&output) => Some(Error::UninstallFailed {
                package: package_name.to_string(),
                output: output.trim().to_string(),
            }),
            Ok(output) => {
                self.reporter.write(&output);
                None
            }
            Err(e) => Some(e),
        };

        match failure {
            None => {
                self.reporter.ok(&format!("uninstalled {}", package_name));
                Ok(())
            }
            Some(err) => self.tolerate(err, stop_on_failure),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Application lifecycle
    // ─────────────────────────────────────────────────────────────

    /// Start, stop or debug an application
    ///
    /// Returns the script's stdout on success and `None` when a failure was
    /// tolerated because `stop_on_failure` is off.
    pub async fn launch(
        &self,
        subcommand: LaunchCommand,
        app_uri: &str,
        stop_on_failure: bool,
    ) -> Result<Option<String>> {
        let result = self
            .run_app_script(subcommand.as_str(), &[app_uri.to_string()])
            .await;

        let failure = match result {
            Ok(output) if LAUNCH_FAILURE.is_match(&output) => Error::LaunchFailed {
                subcommand: subcommand.to_string(),
                app: app_uri.to_string(),
                output: output.trim().to_string(),
            },
            Ok(output) => {
                self.reporter.ok(&format!("{} {}", subcommand, app_uri));
                return Ok(Some(output));
            }
            Err(e) => e,
        };

        self.tolerate(failure, stop_on_failure).map(|_| None)
    }

    // ─────────────────────────────────────────────────────────────
    // Debugging
    // ─────────────────────────────────────────────────────────────

    pub async fn port_forward(&self, local_port: u16, remote_port: u16) -> Result<String> {
        let output = self
            .transport
            .forward(local_port, remote_port)
            .await
            .map_err(|e| Error::PortForward {
                local: local_port,
                remote: remote_port,
                message: e.to_string(),
            })?;

        self.reporter.ok(&format!(
            "forwarded local port {} to remote port {}",
            local_port, remote_port
        ));
        Ok(output.stdout)
    }

    /// Open the web inspector with `command_template`, `%URL%` replaced
    pub async fn run_browser(&self, command_template: &str, local_port: u16) -> Result<String> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| Error::config("no browser launcher configured"))?;

        let command = command_template.replace(URL_TOKEN, &get_debug_url(local_port));
        browser.launch(&command).await
    }

    // ─────────────────────────────────────────────────────────────
    // Root mode
    // ─────────────────────────────────────────────────────────────

    pub async fn root(&self, on: bool) -> Result<()> {
        if on {
            self.reporter
                .warn("turning root mode ON: following commands run as root on the device");
            self.transport.root(true).await?;
        } else {
            self.transport.root(false).await?;
            self.reporter.ok("root mode off");
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────

    /// Report each failed item and return their names
    ///
    /// The aggregate error itself is left to the caller to report.
    fn collect_failures(&self, items: &[String], results: Vec<Result<()>>) -> Vec<String> {
        items
            .iter()
            .zip(results)
            .filter_map(|(item, result)| {
                result.err().map(|e| {
                    self.reporter.error(&format!("{}: {}", item, e));
                    item.clone()
                })
            })
            .collect()
    }

    /// Propagate `err` when `stop_on_failure`, otherwise swallow it with a warning
    fn tolerate(&self, err: Error, stop_on_failure: bool) -> Result<()> {
        if stop_on_failure {
            Err(err)
        } else {
            self.reporter.warn(&format!("{} (continuing)", err));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};
    use tzb_core::{CaptureReporter, ReportLevel};
    use tzb_sdb::test_utils::{FakeBrowser, FakeLister, FakeTransport, TransportCall};

    type TestBridge = Bridge<FakeTransport, FakeLister, FakeBrowser>;

    struct Fixture {
        bridge: TestBridge,
        transport: FakeTransport,
        reporter: Arc<CaptureReporter>,
    }

    fn fixture_with(transport: FakeTransport, lister: FakeLister) -> Fixture {
        let reporter = Arc::new(CaptureReporter::new());
        let bridge = BridgeBuilder::new()
            .transport(transport.clone())
            .file_lister(lister)
            .browser_launcher(FakeBrowser::new())
            .reporter(reporter.clone())
            .app_script(DEFAULT_APP_SCRIPT)
            .build()
            .unwrap();
        Fixture {
            bridge,
            transport,
            reporter,
        }
    }

    fn fixture(transport: FakeTransport) -> Fixture {
        fixture_with(transport, FakeLister::new())
    }

    // ─────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn test_build_requires_transport() {
        let result = BridgeBuilder::<FakeTransport, FakeLister>::new()
            .file_lister(FakeLister::new())
            .build();
        let err = result.err().expect("missing transport must fail");
        assert!(err.is_configuration());
        assert!(err.to_string().contains("transport"));
    }

    #[test]
    fn test_build_requires_file_lister() {
        let result = BridgeBuilder::<FakeTransport, FakeLister>::new()
            .transport(FakeTransport::new())
            .build();
        let err = result.err().expect("missing lister must fail");
        assert!(err.to_string().contains("file lister"));
    }

    #[test]
    fn test_build_with_required_only() {
        let bridge = BridgeBuilder::new()
            .transport(FakeTransport::new())
            .file_lister(FakeLister::new())
            .build()
            .unwrap();
        assert!(bridge.app_script().is_none());
    }

    // ─────────────────────────────────────────────────────────────
    // Pure helpers
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn test_get_destination_trailing_slashes() {
        assert_eq!(get_destination("build/app.js", "/tmp"), "/tmp/app.js");
        assert_eq!(get_destination("build/app.js", "/tmp/"), "/tmp/app.js");
        // Only one slash is stripped
        assert_eq!(get_destination("build/app.js", "/tmp//"), "/tmp//app.js");
    }

    #[test]
    fn test_get_destination_uses_basename() {
        assert_eq!(get_destination("app.js", "/opt/x"), "/opt/x/app.js");
        assert_eq!(
            get_destination("/abs/path/to/style.css", "/opt/x/"),
            "/opt/x/style.css"
        );
    }

    #[test]
    fn test_get_debug_url() {
        assert_eq!(
            get_debug_url(8888),
            "http://localhost:8888/inspector.html?page=1"
        );
    }

    #[test]
    fn test_parse_listing() {
        assert_eq!(
            parse_listing("/tmp/b.wgt\r\n/tmp/a.wgt\r\n"),
            vec!["/tmp/b.wgt", "/tmp/a.wgt"]
        );
        assert!(parse_listing("\r\n  \n").is_empty());
        assert!(parse_listing("").is_empty());
    }

    #[test]
    fn test_launch_command_names() {
        assert_eq!(LaunchCommand::Start.as_str(), "start");
        assert_eq!(LaunchCommand::Stop.to_string(), "stop");
        assert_eq!(LaunchCommand::Debug.as_str(), "debug");
    }

    // ─────────────────────────────────────────────────────────────
    // Remote filesystem
    // ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_file_exists_true() {
        let f = fixture(FakeTransport::new().on("stat", "  File: /tmp/a"));
        assert!(f.bridge.file_exists("/tmp/a").await.unwrap());
        assert_eq!(f.transport.lines(), vec!["shell \"stat /tmp/a\""]);
    }

    #[tokio::test]
    async fn test_file_exists_false_on_missing() {
        let f = fixture(FakeTransport::new().fail_on(
            "stat",
            "stat: cannot stat '/tmp/a': No such file or directory",
        ));
        assert!(!f.bridge.file_exists("/tmp/a").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_exists_other_error_propagates() {
        let f = fixture(FakeTransport::new().fail_on("stat", "error: device not found"));
        assert_err!(f.bridge.file_exists("/tmp/a").await);
    }

    #[tokio::test]
    async fn test_chmod_preserves_message() {
        let f = fixture(FakeTransport::new().fail_on("chmod", "Operation not permitted"));
        let err = f.bridge.chmod("/tmp/a", "+x").await.unwrap_err();
        assert!(err.to_string().contains("Operation not permitted"));
        assert_eq!(f.transport.lines(), vec!["shell \"chmod +x /tmp/a\""]);
    }

    #[tokio::test]
    async fn test_list_remote_files_literal_makes_no_call() {
        let f = fixture(FakeTransport::new());
        let files = f
            .bridge
            .list_remote_files(&FileSpec::from("/tmp/app.wgt"))
            .await
            .unwrap();
        assert_eq!(files, vec!["/tmp/app.wgt"]);
        assert!(f.transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_remote_files_pattern() {
        let f = fixture(FakeTransport::new().on("ls -1 -c", "/tmp/new.wgt\r\n/tmp/old.wgt\r\n"));
        let files = f
            .bridge
            .list_remote_files(&FileSpec::pattern("/tmp/*.wgt"))
            .await
            .unwrap();
        assert_eq!(files, vec!["/tmp/new.wgt", "/tmp/old.wgt"]);
        assert_eq!(f.transport.lines(), vec!["shell \"ls -1 -c /tmp/*.wgt\""]);
    }

    #[tokio::test]
    async fn test_list_remote_files_latest_takes_first() {
        let f = fixture(FakeTransport::new().on("ls -1 -c", "/tmp/new.wgt\n/tmp/old.wgt\n"));
        let files = f
            .bridge
            .list_remote_files(&FileSpec::latest("/tmp/*.wgt"))
            .await
            .unwrap();
        assert_eq!(files, vec!["/tmp/new.wgt"]);
    }

    #[tokio::test]
    async fn test_list_remote_files_failure_propagates() {
        let f = fixture(
            FakeTransport::new().fail_on("ls", "ls: /tmp/*.wgt: No such file or directory"),
        );
        assert_err!(
            f.bridge
                .list_remote_files(&FileSpec::latest("/tmp/*.wgt"))
                .await
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Push
    // ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_push_raw_classifies_known_failures() {
        for message in [
            "error: failed to copy 'a.js' to '/tmp/a.js'",
            "cannot stat 'a.js'",
            "error: device not found",
        ] {
            let f = fixture(FakeTransport::new().fail_on("push", message));
            let err = f.bridge.push_raw("a.js", "/tmp/a.js").await.unwrap_err();
            assert!(matches!(err, Error::Push { .. }), "{message}");
            assert!(err.to_string().contains("could not push file to device"));
        }
    }

    #[tokio::test]
    async fn test_push_raw_other_failure_unchanged() {
        let f = fixture(FakeTransport::new().fail_on("push", "protocol fault"));
        let err = f.bridge.push_raw("a.js", "/tmp/a.js").await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }

    #[tokio::test]
    async fn test_push_one_overwrite_skips_exists_check() {
        let f = fixture(FakeTransport::new());
        assert_ok!(f.bridge.push_one("dist/a.js", "/tmp/", true, Some("+x")).await);
        assert_eq!(
            f.transport.lines(),
            vec![
                "push \"dist/a.js\" \"/tmp/a.js\"",
                "shell \"chmod +x /tmp/a.js\""
            ]
        );
    }

    #[tokio::test]
    async fn test_push_one_skips_existing_without_overwrite() {
        let f = fixture(FakeTransport::new().on("stat", "File: /tmp/a.js"));
        assert_ok!(f.bridge.push_one("a.js", "/tmp", false, Some("+x")).await);

        assert_eq!(f.transport.count("push"), 0);
        assert_eq!(f.transport.count("chmod"), 0);
        assert_eq!(f.reporter.messages(ReportLevel::Warn).len(), 1);
    }

    #[tokio::test]
    async fn test_push_one_pushes_missing_without_overwrite() {
        let f = fixture(
            FakeTransport::new().fail_on("stat", "stat: /tmp/a.js: No such file or directory"),
        );
        assert_ok!(f.bridge.push_one("a.js", "/tmp", false, None).await);
        assert_eq!(
            f.transport.lines(),
            vec!["shell \"stat /tmp/a.js\"", "push \"a.js\" \"/tmp/a.js\""]
        );
    }

    #[tokio::test]
    async fn test_push_one_chmod_failure_propagates() {
        let f = fixture(FakeTransport::new().fail_on("chmod", "chmod: bad mode"));
        let err = f
            .bridge
            .push_one("a.js", "/tmp", true, Some("zz"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("bad mode"));
    }

    #[tokio::test]
    async fn test_push_attempts_every_file_when_one_fails() {
        let f = fixture(FakeTransport::new().fail_on("b.js", "error: failed to copy 'b.js'"));
        let spec = FileSpec::List(vec![
            "a.js".to_string(),
            "b.js".to_string(),
            "c.js".to_string(),
        ]);

        let err = f.bridge.push(&spec, "/tmp", true, None).await.unwrap_err();

        assert_eq!(f.transport.count("push"), 3);
        match err {
            Error::PushAggregate { failed } => assert_eq!(failed, vec!["b.js"]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!f.reporter.messages(ReportLevel::Error).is_empty());
    }

    #[tokio::test]
    async fn test_push_all_succeed() {
        let lister = FakeLister::new().with_matches("dist/*.js", &["dist/a.js", "dist/b.js"]);
        let f = fixture_with(FakeTransport::new(), lister);

        assert_ok!(
            f.bridge
                .push(&FileSpec::pattern("dist/*.js"), "/opt/app", true, None)
                .await
        );
        assert_eq!(f.transport.count("push"), 2);
        assert_eq!(f.reporter.messages(ReportLevel::Ok).len(), 2);
    }

    #[tokio::test]
    async fn test_push_lister_failure_propagates() {
        let f = fixture(FakeTransport::new());
        assert_err!(
            f.bridge
                .push(&FileSpec::pattern("unknown/*"), "/tmp", true, None)
                .await
        );
        assert!(f.transport.calls().is_empty());
    }

    // ─────────────────────────────────────────────────────────────
    // Scripts
    // ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_run_script_command_shape() {
        let f = fixture(FakeTransport::new().on("/tmp/setup.sh", "done"));
        let out = f
            .bridge
            .run_script("/tmp/setup.sh", &["pkg".to_string(), "pkg.App".to_string()])
            .await
            .unwrap();
        assert_eq!(out, "done");
        assert_eq!(
            f.transport.calls(),
            vec![TransportCall::Shell(
                "/bin/sh /tmp/setup.sh pkg pkg.App".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_run_script_wraps_failure() {
        let f = fixture(FakeTransport::new().fail_on("setup", "sh: not found"));
        let err = f.bridge.run_script("/tmp/setup.sh", &[]).await.unwrap_err();
        assert!(err
            .to_string()
            .contains("error occurred while running command /bin/sh /tmp/setup.sh"));
    }

    #[tokio::test]
    async fn test_run_app_script_requires_path() {
        let transport = FakeTransport::new();
        let bridge = BridgeBuilder::new()
            .transport(transport.clone())
            .file_lister(FakeLister::new())
            .build()
            .unwrap();

        let err = bridge.run_app_script("start", &[]).await.unwrap_err();
        assert!(err.is_configuration());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_run_app_script_shape() {
        let f = fixture(FakeTransport::new());
        f.bridge
            .run_app_script("start", &["abc.App".to_string()])
            .await
            .unwrap();
        assert_eq!(
            f.transport.lines(),
            vec!["shell \"/bin/sh /home/developer/tizen-app.sh start abc.App\""]
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Packages
    // ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_install_one_detects_failure_token() {
        let f = fixture(FakeTransport::new().on("install", "key[end] val[fail]"));
        let err = f.bridge.install_one("/tmp/app.wgt").await.unwrap_err();
        assert!(matches!(err, Error::InstallFailed { .. }));
        assert!(err.to_string().contains("installation failed"));
    }

    #[tokio::test]
    async fn test_install_one_success() {
        let f = fixture(FakeTransport::new().on("install", "key[end] val[ok]"));
        assert_ok!(f.bridge.install_one("/tmp/app.wgt").await);
        assert_eq!(
            f.reporter.messages(ReportLevel::Write),
            vec!["key[end] val[ok]"]
        );
    }

    #[tokio::test]
    async fn test_install_empty_list_is_not_an_error() {
        let f = fixture(FakeTransport::new().on("ls -1 -c", "\r\n"));
        assert_ok!(f.bridge.install(&FileSpec::latest("/tmp/*.wgt")).await);
        assert_eq!(f.transport.count("install"), 0);
        assert_eq!(f.reporter.messages(ReportLevel::Warn).len(), 1);
    }

    #[tokio::test]
    async fn test_install_fans_out_and_aggregates() {
        let f = fixture(
            FakeTransport::new()
                .on("ls -1 -c", "/tmp/b.wgt\n/tmp/a.wgt\n")
                .on("install /tmp/a.wgt", "key[end] val[fail]")
                .on("install", "key[end] val[ok]"),
        );

        let err = f
            .bridge
            .install(&FileSpec::pattern("/tmp/*.wgt"))
            .await
            .unwrap_err();

        assert_eq!(f.transport.count("tizen-app.sh install"), 2);
        assert!(err.to_string().starts_with("error while installing package"));
        match err {
            Error::InstallAggregate { failed } => assert_eq!(failed, vec!["/tmp/a.wgt"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_uninstall_failure_stop_on_failure() {
        let f = fixture(FakeTransport::new().on("uninstall", "package abc is not installed"));
        let err = f.bridge.uninstall("abc", true).await.unwrap_err();
        assert!(matches!(err, Error::UninstallFailed { .. }));
    }

    #[tokio::test]
    async fn test_uninstall_failure_tolerated() {
        let f = fixture(FakeTransport::new().on("uninstall", "package abc is not installed"));
        assert_ok!(f.bridge.uninstall("abc", false).await);
        assert_eq!(f.reporter.messages(ReportLevel::Warn).len(), 1);
    }

    #[tokio::test]
    async fn test_uninstall_transport_failure_follows_same_policy() {
        let f = fixture(FakeTransport::new().fail_on("uninstall", "error: device not found"));
        assert_err!(f.bridge.uninstall("abc", true).await);
        assert_ok!(f.bridge.uninstall("abc", false).await);
    }

    #[tokio::test]
    async fn test_uninstall_success() {
        let f = fixture(FakeTransport::new().on("uninstall", "key[end] val[ok]"));
        assert_ok!(f.bridge.uninstall("abc", true).await);
        assert_eq!(f.reporter.messages(ReportLevel::Ok), vec!["uninstalled abc"]);
    }

    // ─────────────────────────────────────────────────────────────
    // Launch
    // ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_launch_returns_stdout() {
        let f = fixture(FakeTransport::new().on("debug", "launched\nPORT 1234\n"));
        let out = f
            .bridge
            .launch(LaunchCommand::Debug, "abc.App", true)
            .await
            .unwrap();
        assert_eq!(out.as_deref(), Some("launched\nPORT 1234\n"));
    }

    #[tokio::test]
    async fn test_launch_failure_phrases() {
        for output in [
            "application is already running",
            "app abc.App does not exist",
            "launch failed",
        ] {
            let f = fixture(FakeTransport::new().on("start", output));
            let err = f
                .bridge
                .launch(LaunchCommand::Start, "abc.App", true)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::LaunchFailed { .. }), "{output}");

            let tolerated = f
                .bridge
                .launch(LaunchCommand::Start, "abc.App", false)
                .await
                .unwrap();
            assert!(tolerated.is_none());
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Port forwarding, browser, root
    // ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_port_forward_wraps_failure() {
        let f = fixture(FakeTransport::new().fail_on("forward", "cannot bind to 8888"));
        let err = f.bridge.port_forward(8888, 1234).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("could not forward local port to remote port"));
        assert!(msg.contains("cannot bind to 8888"));
    }

    #[tokio::test]
    async fn test_port_forward_success() {
        let f = fixture(FakeTransport::new());
        assert_ok!(f.bridge.port_forward(8888, 1234).await);
        assert_eq!(
            f.transport.calls(),
            vec![TransportCall::Forward {
                local: 8888,
                remote: 1234
            }]
        );
    }

    #[tokio::test]
    async fn test_run_browser_substitutes_url() {
        let transport = FakeTransport::new();
        let browser = FakeBrowser::new();
        let bridge = BridgeBuilder::new()
            .transport(transport)
            .file_lister(FakeLister::new())
            .browser_launcher(browser.clone())
            .build()
            .unwrap();

        bridge
            .run_browser("google-chrome --new-window %URL%", 9000)
            .await
            .unwrap();
        assert_eq!(
            browser.commands(),
            vec!["google-chrome --new-window http://localhost:9000/inspector.html?page=1"]
        );
    }

    #[tokio::test]
    async fn test_run_browser_requires_launcher() {
        let bridge: Bridge<FakeTransport, FakeLister, FakeBrowser> =
            BridgeBuilder::<FakeTransport, FakeLister, FakeBrowser> {
                transport: Some(FakeTransport::new()),
                lister: Some(FakeLister::new()),
                browser: None,
                reporter: None,
                app_script: None,
            }
            .build()
            .unwrap();

        let err = bridge.run_browser("open %URL%", 8888).await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_run_browser_failure_propagates() {
        let bridge = BridgeBuilder::new()
            .transport(FakeTransport::new())
            .file_lister(FakeLister::new())
            .browser_launcher(FakeBrowser::failing("no display"))
            .build()
            .unwrap();
        let err = bridge.run_browser("open %URL%", 8888).await.unwrap_err();
        assert!(err.to_string().contains("no display"));
    }

    #[tokio::test]
    async fn test_root_logging() {
        let f = fixture(FakeTransport::new());
        f.bridge.root(true).await.unwrap();
        f.bridge.root(false).await.unwrap();

        assert_eq!(f.transport.lines(), vec!["root on", "root off"]);
        assert_eq!(f.reporter.messages(ReportLevel::Warn).len(), 1);
        assert_eq!(f.reporter.messages(ReportLevel::Ok), vec!["root mode off"]);
    }

    #[tokio::test]
    async fn test_root_failure_propagates() {
        let f = fixture(FakeTransport::new().fail_on("root", "permission denied"));
        assert_err!(f.bridge.root(true).await);
    }
}
