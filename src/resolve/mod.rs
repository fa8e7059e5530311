// src/resolve/mod.rs

//! Dependency resolution: which pages a changed file affects.
//!
//! - [`resolver`] classifies a path (Waxfile / layout / data / view /
//!   irrelevant) and computes the affected page set.
//! - [`handle`] owns the live `Settings` snapshot and swaps it atomically
//!   when the Waxfile is reloaded.
//!
//! It does **not** schedule anything; the watch pipeline turns resolutions
//! into build requests.

pub mod handle;
pub mod path_utils;
pub mod resolver;

pub use handle::SettingsHandle;
pub use resolver::{Classification, Resolution, Resolver, DEFAULT_DEFINITION_NAME};
