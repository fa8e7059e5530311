// src/graph/mod.rs

//! The page graph: which view/data pairs compose which page, under which
//! layout slot.
//!
//! - [`model`] holds `Settings`, `Page`, `PageContent` and `ProjectLayout`.
//! - [`parser`] turns a Waxfile into a fresh `Settings` value.
//! - [`slashes`] normalizes logical paths to `/`.

pub mod model;
pub mod parser;
pub mod slashes;

pub use model::{Page, PageContent, ProjectLayout, Settings};
pub use parser::{load_definition, parse_definition};
