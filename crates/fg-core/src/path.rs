//! Path matching
//!
//! Paths are compared after lowercasing on both sides and include the
//! query string. A single trailing slash is optional everywhere a path
//! boundary is compared.

use crate::pattern::{ParsedPattern, PatternKind};

/// Whether `url_path` satisfies the pattern's path constraint.
///
/// Order matters: an exact anchor is checked before the "empty path
/// means any path" rule, so `example.com$` only accepts the root.
pub fn path_matches(url_path: &str, pattern: &ParsedPattern) -> bool {
    let p = match &pattern.kind {
        PatternKind::Url(p) => p,
        PatternKind::RawRegex(_) => return false,
    };

    if p.is_exact_anchor {
        return same_path(url_path, &p.path);
    }

    if p.path.is_empty() {
        return true;
    }

    if p.has_wildcard_suffix {
        let prefix = match p.path.find('*') {
            Some(pos) => &p.path[..pos],
            None => p.path.as_str(),
        };
        return matches_prefix(url_path, prefix);
    }

    same_path(url_path, &p.path)
}

/// Prefix match where the boundary itself may appear without its
/// trailing slash (`/docs/` accepts `/docs` and `/docs?tab=1`).
fn matches_prefix(url_path: &str, prefix: &str) -> bool {
    if url_path.starts_with(prefix) {
        return true;
    }
    match prefix.strip_suffix('/') {
        Some(boundary) => match url_path.strip_prefix(boundary) {
            Some(rest) => rest.is_empty() || rest.starts_with('?'),
            None => false,
        },
        None => false,
    }
}

/// Equal, or equal once a single trailing slash is added to either side.
#[inline]
fn same_path(url_path: &str, pattern_path: &str) -> bool {
    url_path == pattern_path
        || url_path.strip_suffix('/') == Some(pattern_path)
        || pattern_path.strip_suffix('/') == Some(url_path)
}
