// src/resolve/resolver.rs

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::errors::WaxError;
use crate::fs::FileSystem;
use crate::graph::{Page, Settings};
use crate::resolve::handle::SettingsHandle;
use crate::resolve::path_utils::relative_str;

/// Default Waxfile name.
pub const DEFAULT_DEFINITION_NAME: &str = "Waxfile";

/// What a changed path means for the page graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The Waxfile itself changed; the graph must be reloaded first.
    DefinitionChanged,
    /// A layout template changed; every page is affected.
    LayoutChanged,
    /// A data file changed. `key` is the logical data path (`home/hero`).
    DataChanged { key: String },
    /// A view file changed. `key` is the logical view path.
    ViewChanged { key: String },
    Irrelevant,
}

/// Outcome of resolving one changed path against one consistent snapshot.
#[derive(Debug)]
pub enum Resolution {
    Irrelevant,
    /// Pages affected by a layout, data or view change. May be empty when
    /// no page references the file.
    Pages {
        classification: Classification,
        pages: Vec<Page>,
    },
    /// The Waxfile was re-parsed and swapped in; all its pages are affected.
    Reloaded { settings: Arc<Settings> },
    /// The Waxfile failed to load; the previous graph is still active.
    ReloadFailed { error: WaxError },
}

impl Resolution {
    /// Pages that must rebuild (empty for irrelevant paths and failed reloads).
    pub fn pages(&self) -> Vec<Page> {
        match self {
            Resolution::Pages { pages, .. } => pages.clone(),
            Resolution::Reloaded { settings } => settings.pages().to_vec(),
            Resolution::Irrelevant | Resolution::ReloadFailed { .. } => Vec::new(),
        }
    }
}

/// Maps changed paths to the pages that must rebuild.
///
/// Classification precedence is fixed: definition, layout, data, view.
#[derive(Debug, Clone)]
pub struct Resolver {
    definition_name: String,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_DEFINITION_NAME)
    }
}

impl Resolver {
    pub fn new(definition_name: impl Into<String>) -> Self {
        Self {
            definition_name: definition_name.into(),
        }
    }

    pub fn definition_name(&self) -> &str {
        &self.definition_name
    }

    /// Whether a root-relative path names the Waxfile (case-insensitive).
    pub fn is_definition(&self, rel_path: &str) -> bool {
        let rel = rel_path.to_lowercase();
        let name = self.definition_name.to_lowercase();
        rel == name || rel.ends_with(&format!("/{name}"))
    }

    /// Classify an absolute (or root-prefixed) path.
    pub fn classify(&self, settings: &Settings, path: &Path) -> Classification {
        match relative_str(settings.root(), path) {
            Some(rel) => self.classify_relative(settings, &rel),
            None => {
                debug!(path = %path.display(), "path is outside the project root");
                Classification::Irrelevant
            }
        }
    }

    /// Classify a path already relative to the project root.
    pub fn classify_relative(&self, settings: &Settings, rel_path: &str) -> Classification {
        let rel = rel_path.replace('\\', "/");
        let layout = settings.layout();

        if self.is_definition(&rel) {
            return Classification::DefinitionChanged;
        }

        if !layout.templates.is_empty() && rel.starts_with(&layout.templates) {
            return Classification::LayoutChanged;
        }

        if let Some(key) = logical_key(&rel, &layout.data, &layout.data_extension) {
            return Classification::DataChanged { key };
        }

        if let Some(key) = logical_key(&rel, &layout.views, &layout.view_extension) {
            return Classification::ViewChanged { key };
        }

        Classification::Irrelevant
    }

    /// Pages affected by `classification`, in Waxfile order.
    pub fn affected_pages(&self, settings: &Settings, classification: &Classification) -> Vec<Page> {
        match classification {
            Classification::DefinitionChanged | Classification::LayoutChanged => {
                settings.pages().to_vec()
            }
            Classification::DataChanged { key } => {
                settings.pages_with_data(key).into_iter().cloned().collect()
            }
            Classification::ViewChanged { key } => {
                settings.pages_with_view(key).into_iter().cloned().collect()
            }
            Classification::Irrelevant => Vec::new(),
        }
    }

    /// Classify `path` against the current snapshot and resolve it, reloading
    /// the Waxfile first when it is the file that changed.
    pub fn resolve(&self, handle: &SettingsHandle, fs: &dyn FileSystem, path: &Path) -> Resolution {
        let snapshot = handle.load();
        let classification = self.classify(&snapshot, path);
        debug!(path = %path.display(), ?classification, "classified path");

        match classification {
            Classification::Irrelevant => Resolution::Irrelevant,
            Classification::DefinitionChanged => match handle.reload(fs) {
                Ok(settings) => Resolution::Reloaded { settings },
                Err(error) => Resolution::ReloadFailed { error },
            },
            classification => {
                let pages = self.affected_pages(&snapshot, &classification);
                Resolution::Pages {
                    classification,
                    pages,
                }
            }
        }
    }
}

/// Strip `prefix` and `.ext` from `rel`, if it has both.
fn logical_key(rel: &str, prefix: &str, ext: &str) -> Option<String> {
    let rest = rel.strip_prefix(prefix)?;
    let key = rest.strip_suffix(ext)?.strip_suffix('.')?;
    if key.is_empty() {
        return None;
    }
    Some(key.to_string())
}
