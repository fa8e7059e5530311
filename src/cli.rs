// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `waxwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "waxwatch",
    version,
    about = "Watch a Wax project and rebuild only the pages a change affects.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the host config file (TOML).
    ///
    /// Default: `Waxwatch.toml` in the current working directory. When the
    /// default file does not exist, built-in defaults are used.
    #[arg(long, value_name = "PATH", default_value = "Waxwatch.toml")]
    pub config: String,

    /// Run one full build and exit, no watching.
    #[arg(long)]
    pub once: bool,

    /// Skip the full build that normally runs before watching starts.
    #[arg(long)]
    pub no_initial_build: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WAXWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse the Waxfile, print the page graph, but don't build anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
