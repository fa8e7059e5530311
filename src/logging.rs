// src/logging.rs

//! Logging setup for `waxwatch` using `tracing` + `tracing-subscriber`.
//!
//! The filter is chosen in this order:
//! 1. `--log-level` on the command line, applied to waxwatch itself
//! 2. `WAXWATCH_LOG`, which takes full `EnvFilter` directives
//!    (e.g. `waxwatch::engine=debug,notify=trace`)
//! 3. [`DEFAULT_DIRECTIVES`]
//!
//! Logs go to STDERR; stdout carries the one-line build notifications.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "WAXWATCH_LOG";

/// Watcher backends are chatty at debug level.
pub const DEFAULT_DIRECTIVES: &str = "info,notify=warn";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::try_new(format!(
            "{},waxwatch={}",
            DEFAULT_DIRECTIVES,
            level.as_directive()
        ))?,
        None => match std::env::var(LOG_ENV) {
            Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
                .map_err(|err| anyhow!("invalid {LOG_ENV} value {directives:?}: {err}"))?,
            _ => EnvFilter::new(DEFAULT_DIRECTIVES),
        },
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("logging already initialised: {err}"))
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
