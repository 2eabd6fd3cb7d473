// src/main.rs

//! rbxexec
//!
//! Entry point for the rbxexec CLI.
//!
//! This binary builds a Roblox place with Rojo, publishes it through Open
//! Cloud, and runs the place's test suites as a Luau execution task. It
//! delegates all real work to the `runner` module.
//!
//! Responsibilities of this file:
//! - Parse CLI arguments
//! - Initialise logging and the async runtime
//! - Hand off execution to the runner
//!
//! There is intentionally *no business logic* here.

mod cli;
mod client;
mod config;
mod execution;
mod rojo;
mod runner;
mod scripts;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Program entry point.
///
/// Uses Tokio because the runner spawns Rojo builds and waits on remote
/// task state asynchronously.
#[tokio::main]
async fn main() -> Result<()> {
    // .env may hold the Open Cloud API key during local development
    dotenvy::dotenv().ok();

    // Parse CLI arguments (run / check / init / flags)
    let cli = cli::Cli::parse();

    init_tracing(cli.debug);

    // Delegate execution to the runner
    runner::run(cli).await
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
