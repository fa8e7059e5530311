// src/watch/patterns.rs

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use regex::RegexSet;

use crate::graph::slashes::path_to_slashes;
use crate::types::ActionKind;

/// Compiled ignore patterns.
///
/// Patterns are regular expressions matched against the changed path with
/// forward slashes. An event matching any pattern is reported as ignored and
/// never resolved, e.g. editor backups (`~`) or compiled output (`\.css$`).
#[derive(Clone)]
pub struct IgnoreSet {
    set: RegexSet,
}

impl fmt::Debug for IgnoreSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreSet")
            .field("patterns", &self.set.patterns())
            .finish()
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self {
            set: RegexSet::empty(),
        }
    }
}

impl IgnoreSet {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(|p| p.as_ref().to_string()).collect();
        let set = RegexSet::new(&patterns)
            .with_context(|| format!("invalid ignore pattern in {patterns:?}"))?;
        Ok(Self { set })
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        !self.set.is_empty() && self.set.is_match(&path_to_slashes(path))
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

/// Maps file extensions to the toolchain action they trigger.
///
/// Extensions are stored lowercase without the leading dot and compared
/// case-insensitively. One extension may route to several actions.
#[derive(Debug, Clone, Default)]
pub struct ActionRoutes {
    routes: Vec<(ActionKind, Vec<String>)>,
}

impl ActionRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, S>(mut self, action: ActionKind, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self.routes.push((action, extensions));
        self
    }

    /// Actions whose extension list contains the extension of `path`.
    pub fn route(&self, path: &Path) -> Vec<ActionKind> {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Vec::new();
        };
        let ext = ext.to_lowercase();

        self.routes
            .iter()
            .filter(|(_, exts)| exts.iter().any(|e| *e == ext))
            .map(|(action, _)| *action)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
