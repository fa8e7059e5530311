// src/graph/slashes.rs

//! Slash normalization for logical paths.
//!
//! All logical paths inside the page graph use `/` regardless of platform,
//! so comparisons never miss because of `\` vs `/`.

use std::path::Path;

/// Replace every `\` with `/`.
pub fn to_forward_slashes(input: &str) -> String {
    input.replace('\\', "/")
}

/// Forward slashes plus exactly one trailing `/` (empty input stays empty).
pub fn ensure_trailing_slash(input: &str) -> String {
    let mut s = to_forward_slashes(input);
    if !s.is_empty() && !s.ends_with('/') {
        s.push('/');
    }
    s
}

/// Normalize a logical path: forward slashes, no leading `./` or `/`.
pub fn normalize_logical(input: &str) -> String {
    let s = to_forward_slashes(input.trim());
    let s = s.strip_prefix("./").unwrap_or(&s);
    s.trim_start_matches('/').to_string()
}

/// Render a filesystem path as a forward-slash string.
pub fn path_to_slashes(path: &Path) -> String {
    to_forward_slashes(&path.to_string_lossy())
}

/// Join a logical `/`-separated path onto a filesystem base.
pub fn join_logical(base: &Path, logical: &str) -> std::path::PathBuf {
    let mut out = base.to_path_buf();
    for part in logical.split('/').filter(|p| !p.is_empty()) {
        out.push(part);
    }
    out
}
