// src/graph/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{EntryKind, Result, WaxError};
use crate::graph::slashes::{ensure_trailing_slash, join_logical, normalize_logical};

/// Name of the layout template every page is rendered into.
pub const LAYOUT_TEMPLATE: &str = "layout";

/// Name of the template used for the page listing written on full builds.
pub const INDEX_TEMPLATE: &str = "index";

/// Where templates, data and views live relative to the project root, and
/// which extensions mark data and view files.
///
/// Mirrors the `[layout]` section of `Waxwatch.toml`:
///
/// ```toml
/// [layout]
/// templates = "wax/templates/"
/// data = "wax/data/"
/// views = "Views/"
/// data_extension = "json"
/// view_extension = "mustache"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectLayout {
    #[serde(default = "default_templates")]
    pub templates: String,
    #[serde(default = "default_data")]
    pub data: String,
    #[serde(default = "default_views")]
    pub views: String,
    #[serde(default = "default_data_extension")]
    pub data_extension: String,
    #[serde(default = "default_view_extension")]
    pub view_extension: String,
}

fn default_templates() -> String {
    "wax/templates/".to_string()
}

fn default_data() -> String {
    "wax/data/".to_string()
}

fn default_views() -> String {
    "Views/".to_string()
}

fn default_data_extension() -> String {
    "json".to_string()
}

fn default_view_extension() -> String {
    "mustache".to_string()
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            templates: default_templates(),
            data: default_data(),
            views: default_views(),
            data_extension: default_data_extension(),
            view_extension: default_view_extension(),
        }
    }
}

impl ProjectLayout {
    /// Forward slashes and a trailing `/` on every prefix, extensions
    /// without a leading dot.
    pub fn normalized(mut self) -> Self {
        self.templates = ensure_trailing_slash(&normalize_logical(&self.templates));
        self.data = ensure_trailing_slash(&normalize_logical(&self.data));
        self.views = ensure_trailing_slash(&normalize_logical(&self.views));
        self.data_extension = self.data_extension.trim_start_matches('.').to_string();
        self.view_extension = self.view_extension.trim_start_matches('.').to_string();
        self
    }
}

/// One `(view, data)` pair rendered into a layout slot.
///
/// Both paths are logical: slash-normalized, relative to the views / data
/// prefix, and without extension (e.g. `home/hero`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageContent {
    view_path: String,
    data_path: String,
}

impl PageContent {
    pub fn new(view_path: impl AsRef<str>, data_path: impl AsRef<str>) -> Self {
        Self {
            view_path: normalize_logical(view_path.as_ref()),
            data_path: normalize_logical(data_path.as_ref()),
        }
    }

    pub fn view_path(&self) -> &str {
        &self.view_path
    }

    pub fn data_path(&self) -> &str {
        &self.data_path
    }
}

/// A single output page: layout slot key → ordered contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    name: String,
    slots: BTreeMap<String, Vec<PageContent>>,
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append `content` to `slot`, creating the slot on first use.
    pub fn add_content(&mut self, slot: impl Into<String>, content: PageContent) {
        self.slots.entry(slot.into()).or_default().push(content);
    }

    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Contents of `slot` in rendering order (empty for unknown slots).
    pub fn contents(&self, slot: &str) -> &[PageContent] {
        self.slots.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter_contents(&self) -> impl Iterator<Item = (&str, &PageContent)> {
        self.slots
            .iter()
            .flat_map(|(slot, list)| list.iter().map(move |c| (slot.as_str(), c)))
    }

    pub fn content_count(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }

    pub fn contains_view(&self, view_key: &str) -> bool {
        let key = normalize_logical(view_key);
        self.iter_contents().any(|(_, c)| c.view_path == key)
    }

    pub fn contains_data(&self, data_key: &str) -> bool {
        let key = normalize_logical(data_key);
        self.iter_contents().any(|(_, c)| c.data_path == key)
    }

    /// Directory name under the output root: the page name without spaces.
    /// Other whitespace is kept.
    pub fn output_dir_name(&self) -> String {
        self.name.chars().filter(|c| *c != ' ').collect()
    }

    /// Site-relative URL of the rendered page (`Name/index.html`).
    pub fn output_url(&self) -> String {
        format!("{}/index.html", self.output_dir_name())
    }
}

/// Root configuration plus the resolved page graph.
///
/// A `Settings` value is never mutated once published: a definition reload
/// builds a brand-new value and swaps it in. `Clone` is a deep copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    root: PathBuf,
    layout: ProjectLayout,
    symlinks: Vec<String>,
    pages: Vec<Page>,
}

impl Settings {
    pub fn new(root: impl Into<PathBuf>, layout: ProjectLayout) -> Self {
        Self {
            root: root.into(),
            layout: layout.normalized(),
            symlinks: Vec::new(),
            pages: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn absolute_template_dir(&self) -> PathBuf {
        join_logical(&self.root, &self.layout.templates)
    }

    pub fn absolute_data_dir(&self) -> PathBuf {
        join_logical(&self.root, &self.layout.data)
    }

    pub fn absolute_views_dir(&self) -> PathBuf {
        join_logical(&self.root, &self.layout.views)
    }

    pub fn add_symlink(&mut self, path: impl Into<String>) -> Result<()> {
        let path = path.into();
        if self.symlinks.contains(&path) {
            return Err(WaxError::DuplicateEntry {
                kind: EntryKind::Symlink,
                name: path,
            });
        }
        self.symlinks.push(path);
        Ok(())
    }

    pub fn symlinks(&self) -> &[String] {
        &self.symlinks
    }

    pub fn add_page(&mut self, page: Page) -> Result<()> {
        if self.page(page.name()).is_some() {
            return Err(WaxError::DuplicateEntry {
                kind: EntryKind::Page,
                name: page.name,
            });
        }
        self.pages.push(page);
        Ok(())
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, name: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.name == name)
    }

    pub fn page_names(&self) -> Vec<&str> {
        self.pages.iter().map(Page::name).collect()
    }

    /// Absolute path of the view file behind `content`.
    pub fn view_file(&self, content: &PageContent) -> PathBuf {
        let logical = format!(
            "{}{}.{}",
            self.layout.views, content.view_path, self.layout.view_extension
        );
        join_logical(&self.root, &logical)
    }

    /// Absolute path of the data file behind `content`.
    pub fn data_file(&self, content: &PageContent) -> PathBuf {
        let logical = format!(
            "{}{}.{}",
            self.layout.data, content.data_path, self.layout.data_extension
        );
        join_logical(&self.root, &logical)
    }

    pub fn layout_template(&self) -> PathBuf {
        self.template_file(LAYOUT_TEMPLATE)
    }

    pub fn index_template(&self) -> PathBuf {
        self.template_file(INDEX_TEMPLATE)
    }

    fn template_file(&self, name: &str) -> PathBuf {
        let logical = format!(
            "{}{}.{}",
            self.layout.templates, name, self.layout.view_extension
        );
        join_logical(&self.root, &logical)
    }

    /// Pages with at least one content whose view path equals `view_key`.
    pub fn pages_with_view(&self, view_key: &str) -> Vec<&Page> {
        self.pages.iter().filter(|p| p.contains_view(view_key)).collect()
    }

    /// Pages with at least one content whose data path equals `data_key`.
    pub fn pages_with_data(&self, data_key: &str) -> Vec<&Page> {
        self.pages.iter().filter(|p| p.contains_data(data_key)).collect()
    }
}
