// src/render/pages.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::errors::{ResourceKind, WaxError};
use crate::fs::FileSystem;
use crate::graph::{Page, PageContent, Settings};
use crate::render::template::{Mustache, TemplateEngine};

/// Output file name inside each page directory and at the output root.
pub const INDEX_FILE: &str = "index.html";

/// Result of rendering one batch of pages.
#[derive(Debug, Default)]
pub struct RenderSummary {
    /// Files written, in render order.
    pub written: Vec<PathBuf>,
    /// Non-fatal problems. Each one is reported as a build error.
    pub diagnostics: Vec<String>,
}

/// Renders pages from views, data and the layout template into the output
/// directory.
///
/// Each page is written to `<output>/<name without spaces>/index.html`. A
/// content whose view or data file is missing is skipped with a diagnostic;
/// the rest of the page still renders.
#[derive(Clone)]
pub struct PageRenderer {
    fs: Arc<dyn FileSystem>,
    output: PathBuf,
    engine: Arc<dyn TemplateEngine>,
}

impl fmt::Debug for PageRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRenderer")
            .field("output", &self.output)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl PageRenderer {
    pub fn new(fs: Arc<dyn FileSystem>, output: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            output: output.into(),
            engine: Arc::new(Mustache),
        }
    }

    pub fn with_engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output
    }

    pub fn page_output_path(&self, page: &Page) -> PathBuf {
        self.output.join(page.output_dir_name()).join(INDEX_FILE)
    }

    /// Render `pages` against `settings`; with `full`, also write the page
    /// listing at `<output>/index.html`.
    pub fn render(&self, settings: &Settings, pages: &[Page], full: bool) -> RenderSummary {
        self.render_until(settings, pages, full, &AtomicBool::new(false))
    }

    /// [`render`](Self::render) that stops before the next page once
    /// `cancel` is set. Pages already written are left in place.
    pub fn render_until(
        &self,
        settings: &Settings,
        pages: &[Page],
        full: bool,
        cancel: &AtomicBool,
    ) -> RenderSummary {
        let mut summary = RenderSummary::default();

        let layout_path = settings.layout_template();
        let Some(layout) = self.read_resource(ResourceKind::Layout, &layout_path, &mut summary.diagnostics)
        else {
            return summary;
        };

        for page in pages {
            if cancel.load(Ordering::Acquire) {
                warn!(page = %page.name(), "render cancelled");
                summary
                    .diagnostics
                    .push(format!("render cancelled before page \"{}\"", page.name()));
                return summary;
            }
            match self.render_page(settings, &layout, page, &mut summary.diagnostics) {
                Ok(path) => summary.written.push(path),
                Err(err) => {
                    warn!(page = %page.name(), error = %err, "page render failed");
                    summary
                        .diagnostics
                        .push(format!("page \"{}\": {err:#}", page.name()));
                }
            }
        }

        if full && !cancel.load(Ordering::Acquire) {
            match self.render_index(settings, &layout, &mut summary.diagnostics) {
                Ok(Some(path)) => summary.written.push(path),
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, "index render failed");
                    summary.diagnostics.push(format!("index: {err:#}"));
                }
            }
        }

        info!(
            written = summary.written.len(),
            diagnostics = summary.diagnostics.len(),
            "pages rendered"
        );
        summary
    }

    fn render_page(
        &self,
        settings: &Settings,
        layout: &str,
        page: &Page,
        diagnostics: &mut Vec<String>,
    ) -> Result<PathBuf> {
        let mut context = Map::new();
        context.insert("page".to_string(), Value::String(page.name().to_string()));

        for slot in page.slots() {
            let rendered: Vec<String> = page
                .contents(slot)
                .iter()
                .filter_map(|content| self.render_content(settings, content, diagnostics))
                .collect();
            context.insert(slot.to_string(), Value::String(rendered.join("\n")));
        }

        let html = self
            .engine
            .render(layout, &Value::Object(context))
            .context("rendering layout template")?;

        let target = self.page_output_path(page);
        self.fs
            .write(&target, html.as_bytes())
            .with_context(|| format!("writing {}", target.display()))?;
        debug!(page = %page.name(), path = %target.display(), "page written");
        Ok(target)
    }

    fn render_content(
        &self,
        settings: &Settings,
        content: &PageContent,
        diagnostics: &mut Vec<String>,
    ) -> Option<String> {
        let view_path = settings.view_file(content);
        let data_path = settings.data_file(content);

        let view = self.read_resource(ResourceKind::View, &view_path, diagnostics)?;
        let raw = self.read_resource(ResourceKind::Data, &data_path, diagnostics)?;

        let data: Value = match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(err) => {
                diagnostics.push(format!("invalid data file {}: {err}", data_path.display()));
                return None;
            }
        };

        match self.engine.render(&view, &data) {
            Ok(html) => Some(html),
            Err(err) => {
                diagnostics.push(format!("view {}: {err:#}", view_path.display()));
                None
            }
        }
    }

    fn render_index(
        &self,
        settings: &Settings,
        layout: &str,
        diagnostics: &mut Vec<String>,
    ) -> Result<Option<PathBuf>> {
        let index_path = settings.index_template();
        let Some(index) = self.read_resource(ResourceKind::View, &index_path, diagnostics) else {
            return Ok(None);
        };

        let listing: Vec<Value> = settings
            .pages()
            .iter()
            .map(|page| json!({ "name": page.name(), "url": page.output_url() }))
            .collect();

        let content = self
            .engine
            .render(&index, &json!({ "pages": listing }))
            .context("rendering index template")?;
        let html = self
            .engine
            .render(layout, &json!({ "page": "index", "content": content }))
            .context("rendering layout template")?;

        let target = self.output.join(INDEX_FILE);
        self.fs
            .write(&target, html.as_bytes())
            .with_context(|| format!("writing {}", target.display()))?;
        Ok(Some(target))
    }

    /// Read a required file, recording a `MissingResource` diagnostic when
    /// it does not exist or cannot be read.
    fn read_resource(
        &self,
        kind: ResourceKind,
        path: &Path,
        diagnostics: &mut Vec<String>,
    ) -> Option<String> {
        if self.fs.is_file(path) {
            match self.fs.read_to_string(path) {
                Ok(text) => return Some(text),
                Err(err) => debug!(path = %path.display(), error = %err, "read failed"),
            }
        }

        let missing = WaxError::MissingResource {
            kind,
            path: path.to_path_buf(),
        };
        warn!(%missing, "skipping content");
        diagnostics.push(missing.to_string());
        None
    }
}
