//! Specificity scoring
//!
//! Each contribution strictly dominates the sum of every contribution
//! below it, so two patterns only tie when they are equally precise.

use crate::pattern::{path_segments, ParsedPattern, PatternKind};

/// Literal (non-wildcard) host.
pub const HOST_LITERAL_WEIGHT: u32 = 1_000_000;
/// Explicit scheme.
pub const PROTOCOL_WEIGHT: u32 = 100_000;
/// Per path unit; a non-empty path counts `1 + segments` units, where a
/// bare `*` segment does not count.
pub const PATH_UNIT_WEIGHT: u32 = 1_000;
/// Path units are capped so the path term stays below [`PROTOCOL_WEIGHT`].
pub const MAX_PATH_UNITS: u32 = 98;
/// Exact anchor, or no wildcard in the path.
pub const PRECISE_WEIGHT: u32 = 100;
/// First two path segments present.
pub const RESOURCE_SEGMENT_WEIGHT: u32 = 10;

/// Raw regex rules are authored explicitly and rank above everything.
pub const RAW_REGEX_SPECIFICITY: u32 = u32::MAX;

/// Keyword hits rank like a literal host with a one-segment path.
pub const KEYWORD_SPECIFICITY: u32 = HOST_LITERAL_WEIGHT + 2 * PATH_UNIT_WEIGHT + PRECISE_WEIGHT;

/// Precision score of a parsed pattern.
pub fn calculate_specificity(pattern: &ParsedPattern) -> u32 {
    let p = match &pattern.kind {
        PatternKind::RawRegex(_) => return RAW_REGEX_SPECIFICITY,
        PatternKind::Url(p) => p,
    };

    let mut score = 0;

    if !p.is_wildcard_subdomain {
        score += HOST_LITERAL_WEIGHT;
    }

    if p.protocol.is_some() {
        score += PROTOCOL_WEIGHT;
    }

    if !p.path.is_empty() {
        let segments = path_segments(&p.path).filter(|s| *s != "*").count() as u32;
        score += (1 + segments).min(MAX_PATH_UNITS) * PATH_UNIT_WEIGHT;
    }

    if p.is_exact_anchor || !p.has_wildcard_suffix {
        score += PRECISE_WEIGHT;
    }

    if p.resource_segment.is_some() {
        score += RESOURCE_SEGMENT_WEIGHT;
    }

    score
}
