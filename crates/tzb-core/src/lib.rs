//! # tzb-core - Core Domain Types
//!
//! Foundation crate for Tizen Bridge. Provides domain types, error handling,
//! logging setup and the reporting capability used by the orchestration core.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`FileSpec`] - A path, a list of paths, or a glob pattern with optional filter
//! - [`FileFilter`] - Reduction applied to pattern matches (`latest`)
//! - [`AppMetadata`] - Application identity parsed from `config.xml`
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Error enum grouped by layer (configuration, transport, device, fan-out, root)
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ### Reporting (`reporter`)
//! - [`Reporter`] - Injected ok/warn/error/write capability
//! - [`TracingReporter`], [`ConsoleReporter`], [`JsonReporter`]
//! - `CaptureReporter` - In-memory reporter (feature `test-helpers`)
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use tzb_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod prelude;
pub mod reporter;
pub mod types;

pub use error::{Error, Result, ResultExt};
#[cfg(any(test, feature = "test-helpers"))]
pub use reporter::CaptureReporter;
pub use reporter::{ConsoleReporter, JsonReporter, ReportLevel, Reporter, TracingReporter};
pub use types::{AppMetadata, FileFilter, FileSpec};
