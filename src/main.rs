//! Tizen Bridge - deploy and debug Tizen web apps from the command line
//!
//! This is the binary entry point. All logic lives in the library.

use std::process::ExitCode;

use clap::Parser;
use tizen_bridge::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let args = Args::parse();
    Ok(tizen_bridge::run(args).await)
}
