// src/graph/parser.rs

//! Waxfile parsing.
//!
//! A Waxfile is a YAML document:
//!
//! ```yaml
//! paths:
//!   - shared/components
//!
//! pages:
//!   Home: &home
//!     main:
//!       - home/hero: home/hero
//!       - home/news: home/news
//!   About:
//!     <<: *home
//!     sidebar:
//!       - about/team: about/team
//! ```
//!
//! Each slot entry is a single `view: data` pair. A `<<` key merges the
//! slots of the referenced mapping into the page; aliases are expanded by
//! the YAML loader, so after parsing every page holds plain contents only.

use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::errors::{ParseDiagnostic, Result, WaxError};
use crate::fs::FileSystem;
use crate::graph::model::{Page, PageContent, ProjectLayout, Settings};

const MERGE_KEY: &str = "<<";

/// Read and parse the Waxfile at `path`.
///
/// The project root is the directory containing the Waxfile.
pub fn load_definition(
    fs: &dyn FileSystem,
    path: &Path,
    layout: &ProjectLayout,
) -> Result<Settings> {
    let contents = fs.read_to_string(path)?;
    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    parse_definition(&contents, &root, layout)
}

/// Parse Waxfile contents into a fresh [`Settings`] rooted at `root`.
pub fn parse_definition(contents: &str, root: &Path, layout: &ProjectLayout) -> Result<Settings> {
    let doc: Value = serde_yaml::from_str(contents)
        .map_err(|e| WaxError::Parse(ParseDiagnostic::from_yaml(&e)))?;

    let mut settings = Settings::new(root, layout.clone());

    let top = match doc {
        Value::Mapping(map) => map,
        Value::Null => return Ok(settings),
        _ => return Err(structure_error("top level of a Waxfile must be a mapping")),
    };

    for (key, value) in top.iter() {
        match key.as_str() {
            Some("paths") => parse_paths(value, &mut settings)?,
            Some("pages") => parse_pages(value, &mut settings)?,
            other => debug!(key = ?other, "ignoring unknown Waxfile key"),
        }
    }

    debug!(
        pages = settings.pages().len(),
        symlinks = settings.symlinks().len(),
        "parsed Waxfile"
    );
    Ok(settings)
}

fn parse_paths(value: &Value, settings: &mut Settings) -> Result<()> {
    let mut paths = Vec::new();
    collect_scalars(value, &mut paths);
    for path in paths {
        settings.add_symlink(path)?;
    }
    Ok(())
}

/// Collect every scalar below `value`, flattening sequences and mapping values.
fn collect_scalars(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Sequence(items) => items.iter().for_each(|v| collect_scalars(v, out)),
        Value::Mapping(map) => map.values().for_each(|v| collect_scalars(v, out)),
        Value::Tagged(tagged) => collect_scalars(&tagged.value, out),
        other => {
            if let Some(s) = scalar_string(other) {
                out.push(s);
            }
        }
    }
}

fn parse_pages(value: &Value, settings: &mut Settings) -> Result<()> {
    let pages = match value {
        Value::Mapping(map) => map,
        Value::Null => return Ok(()),
        _ => return Err(structure_error("`pages` must be a mapping of page names")),
    };

    for (key, body) in pages.iter() {
        let name = scalar_string(key)
            .ok_or_else(|| structure_error("page names must be scalars"))?;
        let mut page = Page::new(name.clone());

        match body {
            Value::Mapping(slots) => parse_slots(&name, slots, &mut page)?,
            Value::Null => {}
            _ => {
                return Err(structure_error(format!(
                    "page \"{name}\" must be a mapping of layout slots"
                )));
            }
        }

        settings.add_page(page)?;
    }

    Ok(())
}

fn parse_slots(page_name: &str, slots: &Mapping, page: &mut Page) -> Result<()> {
    for (key, value) in slots.iter() {
        let slot = scalar_string(key).ok_or_else(|| {
            structure_error(format!("page \"{page_name}\" has a non-scalar slot key"))
        })?;

        if slot == MERGE_KEY {
            merge_reference(page_name, value, page)?;
            continue;
        }

        for content in parse_contents(page_name, &slot, value)? {
            page.add_content(slot.clone(), content);
        }
    }
    Ok(())
}

/// Resolve a `<<` reference: a mapping of slots, or a sequence of them.
fn merge_reference(page_name: &str, value: &Value, page: &mut Page) -> Result<()> {
    match value {
        Value::Mapping(slots) => parse_slots(page_name, slots, page),
        Value::Sequence(items) => {
            for item in items {
                merge_reference(page_name, item, page)?;
            }
            Ok(())
        }
        _ => Err(structure_error(format!(
            "page \"{page_name}\" merges something that is not a mapping"
        ))),
    }
}

fn parse_contents(page_name: &str, slot: &str, value: &Value) -> Result<Vec<PageContent>> {
    let items = match value {
        Value::Sequence(items) => items,
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(structure_error(format!(
                "slot \"{slot}\" of page \"{page_name}\" must be a sequence of view: data pairs"
            )));
        }
    };

    let mut contents = Vec::with_capacity(items.len());
    for item in items {
        let Value::Mapping(pair) = item else {
            return Err(structure_error(format!(
                "slot \"{slot}\" of page \"{page_name}\" contains an entry that is not a view: data pair"
            )));
        };
        for (view, data) in pair.iter() {
            if let (Some(view), Some(data)) = (scalar_string(view), scalar_string(data)) {
                contents.push(PageContent::new(view, data));
            }
        }
    }
    Ok(contents)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn structure_error(message: impl Into<String>) -> WaxError {
    WaxError::Parse(ParseDiagnostic::new(message))
}
