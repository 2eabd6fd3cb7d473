// src/cli.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Remote test runner for Roblox places.
///
/// `rbxexec.yaml` is the primary source of truth.
/// CLI flags only override config values.
#[derive(Parser, Debug)]
#[command(
    name = "rbxexec",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Enable debug logging
    ///
    /// Equivalent to RUST_LOG=debug.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// All supported CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build, publish, and run the place's test suites remotely.
    ///
    /// If no arguments are provided, this defaults to:
    /// - rbxexec.yaml
    /// - build, open_cloud, execution settings defined inside it
    Run {
        /// Path to config file
        ///
        /// Defaults to ./rbxexec.yaml
        #[arg(short, long, default_value = "rbxexec.yaml")]
        config: PathBuf,

        /// Publish an existing place file instead of building with Rojo
        ///
        /// Example:
        /// --place-file build/place.rbxl
        #[arg(long)]
        place_file: Option<PathBuf>,
    },

    /// Validate the config file and list every problem.
    Check {
        /// Path to config file
        ///
        /// Defaults to ./rbxexec.yaml
        #[arg(short, long, default_value = "rbxexec.yaml")]
        config: PathBuf,
    },

    /// Initialise a project scaffold.
    ///
    /// Creates:
    /// - rbxexec.yaml
    Init,
}
