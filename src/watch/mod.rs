// src/watch/mod.rs

//! File watching and change routing.
//!
//! This module is responsible for:
//! - Compiling ignore patterns and extension routes from the host config.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Turning each changed path into notifications and build requests.
//!
//! It does **not** run builds; it only enqueues them on the scheduler.

pub mod event_handler;
pub mod patterns;
pub mod watcher;

pub use event_handler::{process_file_change, ChangeOutcome};
pub use patterns::{ActionRoutes, IgnoreSet};
pub use watcher::{spawn_watcher, WatcherHandle};
