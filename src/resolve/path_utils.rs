// src/resolve/path_utils.rs

//! Utility functions for relating event paths to the project root.

use std::path::Path;

use crate::graph::slashes::{ensure_trailing_slash, path_to_slashes};

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// - First we compare the slash-normalized string forms, so `\` vs `/`
///   differences never hide a match.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize both paths and try again.
///
/// Returns `None` if the path cannot be reasonably related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let root_str = ensure_trailing_slash(&path_to_slashes(root));
    let path_str = path_to_slashes(path);

    if let Some(rel) = path_str.strip_prefix(&root_str) {
        return Some(rel.to_string());
    }

    // Canonicalizing helps on platforms (notably macOS) where different
    // absolute prefixes may be used for the same directory (/private/var/...).
    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(path_to_slashes(rel));
        }
    }

    None
}
