// src/render/mod.rs

//! Page rendering: views + data + layout into static HTML.

pub mod pages;
pub mod template;

pub use pages::{PageRenderer, RenderSummary, INDEX_FILE};
pub use template::{Mustache, TemplateEngine};
