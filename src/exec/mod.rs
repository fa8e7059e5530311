// src/exec/mod.rs

//! Action execution layer.
//!
//! - [`runner`] provides the `ActionRunner` trait the scheduler drives, and
//!   the production `ToolchainRunner` (in-process page rendering plus
//!   external toolchain commands). Tests replace it with a fake runner.
//! - [`command`] runs a single shell command with `tokio::process::Command`.

pub mod command;
pub mod runner;

pub use command::run_shell;
pub use runner::{ActionCommands, ActionRunner, ToolchainRunner};
