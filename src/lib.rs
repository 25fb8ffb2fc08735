//! Tizen Bridge
//!
//! Command-line front end for deploying, installing and debugging Tizen web
//! applications through `sdb`. The work is done by the workspace crates:
//! `tzb-core` (types, errors, logging), `tzb-sdb` (device transport and local
//! collaborators) and `tzb-app` (bridge operations and task orchestration).

pub mod cli;
pub mod runner;

pub use cli::{Args, Command};
pub use runner::{exit_code, run};
