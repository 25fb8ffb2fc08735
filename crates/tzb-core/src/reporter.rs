//! User-facing progress reporting
//!
//! The orchestration core never prints directly. It reports through an
//! injected [`Reporter`]; the composing layer (CLI, headless runner, tests)
//! decides where the messages end up.

use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Mutex;

/// Severity of a reported message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLevel {
    Ok,
    Warn,
    Error,
    Write,
}

/// Logging capability injected into the bridge
pub trait Reporter: Send + Sync {
    /// A step completed successfully
    fn ok(&self, message: &str);

    /// A tolerated failure or noteworthy condition
    fn warn(&self, message: &str);

    /// A failure that terminates the current task
    fn error(&self, message: &str);

    /// Raw output (e.g. device script stdout), written as-is
    fn write(&self, text: &str);
}

/// Forwards everything to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn ok(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }

    fn write(&self, text: &str) {
        tracing::debug!(raw = true, "{}", text);
    }
}

/// Human-readable terminal output, mirrored to the log file
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn ok(&self, message: &str) {
        tracing::info!("{}", message);
        println!("✅ {}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
        eprintln!("⚠️  {}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
        eprintln!("❌ {}", message);
    }

    fn write(&self, text: &str) {
        tracing::debug!(raw = true, "{}", text);
        print!("{}", text);
        let _ = io::stdout().flush();
    }
}

/// One NDJSON line emitted by [`JsonReporter`]
#[derive(Debug, Clone, Serialize)]
struct ReportEvent<'a> {
    event: ReportLevel,
    message: &'a str,
    timestamp: i64,
}

/// Headless reporter: one JSON object per line, for task runners and scripts
pub struct JsonReporter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl JsonReporter {
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn emit(&self, level: ReportLevel, message: &str) {
        let event = ReportEvent {
            event: level,
            message,
            timestamp: Utc::now().timestamp_millis(),
        };
        let line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to serialize report event: {}", e);
                return;
            }
        };
        if let Ok(mut out) = self.out.lock() {
            if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
                tracing::error!("Failed to write report event: {}", e);
            }
        }
    }
}

impl Reporter for JsonReporter {
    fn ok(&self, message: &str) {
        tracing::info!("{}", message);
        self.emit(ReportLevel::Ok, message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
        self.emit(ReportLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
        self.emit(ReportLevel::Error, message);
    }

    fn write(&self, text: &str) {
        self.emit(ReportLevel::Write, text);
    }
}

/// Keeps every message in memory for assertions
///
/// Only built for tests and for dependents enabling `test-helpers`; it
/// grows without bound.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default)]
pub struct CaptureReporter {
    entries: Mutex<Vec<(ReportLevel, String)>>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl CaptureReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(ReportLevel, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Messages recorded at `level`
    pub fn messages(&self, level: ReportLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    fn record(&self, level: ReportLevel, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Reporter for CaptureReporter {
    fn ok(&self, message: &str) {
        self.record(ReportLevel::Ok, message);
    }

    fn warn(&self, message: &str) {
        self.record(ReportLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.record(ReportLevel::Error, message);
    }

    fn write(&self, text: &str) {
        self.record(ReportLevel::Write, text);
    }
}
