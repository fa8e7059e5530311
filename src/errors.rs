// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::ActionKind;

/// Diagnostic attached to a definition file that failed to parse.
///
/// Line and column are 1-based and only present when the YAML scanner
/// reported a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl ParseDiagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn from_yaml(err: &serde_yaml::Error) -> Self {
        let location = err.location();
        Self {
            message: err.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(col)) => write!(f, "{} (line {line}, column {col})", self.message),
            (Some(line), None) => write!(f, "{} (line {line})", self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// What kind of entry a `DuplicateEntry` error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Page,
    Symlink,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Page => f.write_str("page"),
            EntryKind::Symlink => f.write_str("symlink"),
        }
    }
}

/// Which file a page content slot could not find on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    View,
    Data,
    Layout,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::View => f.write_str("view"),
            ResourceKind::Data => f.write_str("data"),
            ResourceKind::Layout => f.write_str("layout template"),
        }
    }
}

#[derive(Error, Debug)]
pub enum WaxError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Waxfile parse error: {0}")]
    Parse(ParseDiagnostic),

    #[error("Missing {kind} file: {}", path.display())]
    MissingResource { kind: ResourceKind, path: PathBuf },

    #[error("Duplicate {kind} \"{name}\" should not be added twice")]
    DuplicateEntry { kind: EntryKind, name: String },

    #[error("Action '{action}' failed: {message}")]
    ActionFailure { action: ActionKind, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WaxError {
    /// Diagnostic to report to hosts when a definition reload fails.
    ///
    /// Non-parse failures (unreadable file, duplicate entries) are folded
    /// into a location-less diagnostic.
    pub fn parse_diagnostic(&self) -> ParseDiagnostic {
        match self {
            WaxError::Parse(diag) => diag.clone(),
            other => ParseDiagnostic::new(other.to_string()),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WaxError>;
