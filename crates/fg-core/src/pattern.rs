//! Pattern parser
//!
//! Turns a user-authored rule (or a bare URL) into a [`ParsedPattern`].
//! Parsing never fails on malformed input; only an empty string is
//! rejected. Anything that cannot be split structurally degrades to the
//! best partial parse and the degradation is recorded on the result.
//!
//! # Pattern language
//!
//! | Pattern           | Meaning                                   |
//! |-------------------|-------------------------------------------|
//! | `example.com`     | any scheme, exact host, any path          |
//! | `*.example.com`   | host or any subdomain of it               |
//! | `example.com/*`   | host match, any path under the root      |
//! | `example.com$`    | exact URL only, no sub-paths              |
//! | `^<regex>`        | regular expression over the whole URL     |

use ::url::{Host, Url};
use regex::{Regex, RegexBuilder};

use crate::error::{Degradation, PatternError};
use crate::url::{get_scheme_end, split_host, strip_conventional_prefix};

// =============================================================================
// Parsed Pattern
// =============================================================================

/// A parsed rule. Produced fresh per evaluation and never mutated.
#[derive(Debug, Clone)]
pub struct ParsedPattern {
    /// Rule text as authored (trimmed, original case)
    pub raw: String,
    pub kind: PatternKind,
    /// Fallback applied while parsing, if any
    pub degradation: Option<Degradation>,
}

#[derive(Debug, Clone)]
pub enum PatternKind {
    /// `^...` rule: the remainder is a regular expression over the full URL.
    RawRegex(RawRegex),
    /// Structured host/path rule.
    Url(UrlPattern),
}

#[derive(Debug, Clone)]
pub struct RawRegex {
    pub source: String,
    /// `None` when the source does not compile; such a rule never matches.
    pub regex: Option<Regex>,
}

/// Structured host/path constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPattern {
    /// Literal scheme; `None` matches any scheme
    pub protocol: Option<String>,
    /// Lowercase host as written
    pub hostname: String,
    /// Host began with `*.`
    pub is_wildcard_subdomain: bool,
    /// Host without `*.` or a conventional `www.`/`m.` label
    pub base_domain: String,
    /// Normalized path (plus `?query`), empty for "any path"
    pub path: String,
    /// Path contains `*`
    pub has_wildcard_suffix: bool,
    /// Rule ended with `$`
    pub is_exact_anchor: bool,
    /// First two path segments, e.g. `/r/rust`
    pub resource_segment: Option<String>,
}

impl ParsedPattern {
    #[inline]
    pub fn is_raw_regex(&self) -> bool {
        matches!(self.kind, PatternKind::RawRegex(_))
    }

    /// The structured part, `None` for raw regex rules.
    #[inline]
    pub fn url_pattern(&self) -> Option<&UrlPattern> {
        match &self.kind {
            PatternKind::Url(p) => Some(p),
            PatternKind::RawRegex(_) => None,
        }
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a rule or URL string.
pub fn parse_pattern(input: &str) -> Result<ParsedPattern, PatternError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PatternError::EmptyInput);
    }

    if let Some(source) = trimmed.strip_prefix('^') {
        return Ok(parse_raw_regex(trimmed, source));
    }

    let lower = trimmed.to_lowercase();
    let (body, is_exact_anchor) = match lower.strip_suffix('$') {
        Some(rest) => (rest, true),
        None => (lower.as_str(), false),
    };

    let (protocol, rest) = match get_scheme_end(body) {
        Some(end) => {
            let scheme = &body[..end - 3];
            let protocol = if scheme.is_empty() || scheme == "*" {
                None
            } else {
                Some(scheme.to_string())
            };
            (protocol, &body[end..])
        }
        None => (None, body),
    };

    let (host, tail) = split_host(rest);
    let host = host.trim_end_matches('.');

    let (is_wildcard_subdomain, host) = match host.strip_prefix("*.") {
        Some(base) => (true, ascii_host(base)),
        None => (false, ascii_host(host)),
    };
    let base_domain = if is_wildcard_subdomain {
        host.as_str()
    } else {
        strip_conventional_prefix(&host)
    };

    if base_domain.is_empty() {
        return Ok(literal_host_fallback(trimmed, body, is_exact_anchor));
    }

    let path = normalize_path(tail);
    let has_wildcard_suffix = path.contains('*');
    let resource_segment = resource_segment(&path);
    let hostname = if is_wildcard_subdomain {
        format!("*.{}", host)
    } else {
        host.clone()
    };

    Ok(ParsedPattern {
        raw: trimmed.to_string(),
        kind: PatternKind::Url(UrlPattern {
            protocol,
            hostname,
            is_wildcard_subdomain,
            base_domain: base_domain.to_string(),
            path,
            has_wildcard_suffix,
            is_exact_anchor,
            resource_segment,
        }),
        degradation: None,
    })
}

fn parse_raw_regex(raw: &str, source: &str) -> ParsedPattern {
    let (regex, degradation) = match RegexBuilder::new(source).case_insensitive(true).build() {
        Ok(regex) => (Some(regex), None),
        Err(e) => {
            log::debug!("raw regex pattern '{}' does not compile: {}", raw, e);
            (None, Some(Degradation::InvalidRegex(e.to_string())))
        }
    };

    ParsedPattern {
        raw: raw.to_string(),
        kind: PatternKind::RawRegex(RawRegex {
            source: source.to_string(),
            regex,
        }),
        degradation,
    }
}

/// Whole string as a literal, path-less host.
fn literal_host_fallback(raw: &str, body: &str, is_exact_anchor: bool) -> ParsedPattern {
    log::debug!("pattern '{}' has no usable host, using it as a literal host", raw);
    let host = body.to_string();
    ParsedPattern {
        raw: raw.to_string(),
        kind: PatternKind::Url(UrlPattern {
            protocol: None,
            hostname: host.clone(),
            is_wildcard_subdomain: false,
            base_domain: host.clone(),
            path: String::new(),
            has_wildcard_suffix: false,
            is_exact_anchor,
            resource_segment: None,
        }),
        degradation: Some(Degradation::UnparseableHost(host)),
    }
}

/// Internationalized hosts in their punycode form, as navigated URLs carry them.
fn ascii_host(host: &str) -> String {
    if host.is_ascii() {
        return host.to_string();
    }
    match Host::parse(host) {
        Ok(parsed) => parsed.to_string(),
        Err(e) => {
            log::debug!("host '{}' has no ASCII form: {}", host, e);
            host.to_string()
        }
    }
}

/// Drop the fragment and percent-encode the path and query the way
/// navigated URLs are encoded, so a pattern matches its own URL.
fn normalize_path(tail: &str) -> String {
    let tail = match tail.find('#') {
        Some(pos) => &tail[..pos],
        None => tail,
    };
    if tail.is_empty() {
        return String::new();
    }
    let tail = if tail.starts_with('/') || tail.starts_with('?') {
        tail.to_string()
    } else {
        format!("/{}", tail)
    };

    match Url::parse(&format!("http://h{}", tail)) {
        Ok(url) => {
            let mut path = url.path().to_lowercase();
            if let Some(query) = url.query() {
                path.push('?');
                path.push_str(&query.to_lowercase());
            }
            path
        }
        Err(e) => {
            log::debug!("path '{}' kept as written: {}", tail, e);
            tail
        }
    }
}

/// Number of non-empty segments in the path part (query excluded).
pub(crate) fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    let path_only = match path.find('?') {
        Some(pos) => &path[..pos],
        None => path,
    };
    path_only.split('/').filter(|s| !s.is_empty())
}

fn resource_segment(path: &str) -> Option<String> {
    let mut segments = path_segments(path);
    let first = segments.next()?;
    let second = segments.next()?;
    if first.contains('*') || second.contains('*') {
        return None;
    }
    Some(format!("/{}/{}", first, second))
}
