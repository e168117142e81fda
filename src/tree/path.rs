//! Relative path handling
//!
//! Relative paths always use `/` between segments, whatever the platform.
//! They are converted to native paths only when resolved against a local root.

use std::path::{Component, Path, PathBuf};

/// Separator used in every relative path that crosses the wire
pub const SEPARATOR: char = '/';

/// Canonicalize a scan root so that absolute node paths are stable
pub fn canonicalize_root(path: &Path) -> Result<PathBuf, crate::error::TreeError> {
    dunce::canonicalize(path).map_err(|e| crate::error::TreeError::InvalidRoot {
        path: path.to_path_buf(),
        reason: format!("Failed to canonicalize: {}", e),
    })
}

pub fn join_segments(segments: &[&str]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(segment);
    }
    out
}

pub fn split_segments(relative_path: &str) -> impl Iterator<Item = &str> {
    relative_path.split(SEPARATOR).filter(|s| !s.is_empty())
}

/// Number of segments in a relative path
pub fn depth(relative_path: &str) -> usize {
    split_segments(relative_path).count()
}

/// Check that a single entry name is safe to use as one path segment
pub fn is_valid_segment(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Resolve a relative path under `root`, rejecting anything that could
/// escape it (absolute paths, `..`, drive prefixes, empty paths).
pub fn resolve_under(root: &Path, relative_path: &str) -> Option<PathBuf> {
    let mut out = root.to_path_buf();
    let mut pushed = 0;
    for segment in relative_path.split(SEPARATOR) {
        if !is_valid_segment(segment) {
            return None;
        }
        for component in Path::new(segment).components() {
            match component {
                Component::Normal(part) => out.push(part),
                _ => return None,
            }
        }
        pushed += 1;
    }
    if pushed == 0 {
        return None;
    }
    Some(out)
}
