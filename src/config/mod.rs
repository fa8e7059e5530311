// src/config/mod.rs

//! Host configuration loading and validation for waxwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate layout, timing and action settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{ActionConfig, ActionsSection, ConfigFile, ProjectSection, RawConfigFile};
pub use validate::validate_config;
