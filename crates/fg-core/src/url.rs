//! URL helpers shared by the pattern parser and the decision engine
//!
//! Scheme and host splitting work directly on string slices. Full URL
//! validation of the navigated address goes through the `url` crate.

use ::url::Url;

use crate::error::Degradation;

// =============================================================================
// Scheme Extraction
// =============================================================================

/// Browser-internal, non-navigable schemes. Pages under these are never blocked.
pub const INTERNAL_SCHEMES: &[&str] = &[
    "about",
    "brave",
    "chrome",
    "chrome-extension",
    "chrome-search",
    "chrome-untrusted",
    "devtools",
    "edge",
    "moz-extension",
    "opera",
    "resource",
    "safari-web-extension",
    "view-source",
    "vivaldi",
];

/// Extract the scheme (the text before the first `:`), if it looks like one.
#[inline]
pub fn extract_scheme(url: &str) -> Option<&str> {
    let colon_pos = url.find(':')?;
    let scheme = &url[..colon_pos];
    let bytes = scheme.as_bytes();
    if bytes.is_empty() || !bytes[0].is_ascii_alphabetic() {
        return None;
    }
    if !bytes
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
    {
        return None;
    }
    Some(scheme)
}

/// Whether the URL points at a browser-internal page.
pub fn is_internal_url(url: &str) -> bool {
    match extract_scheme(url.trim()) {
        Some(scheme) => INTERNAL_SCHEMES
            .iter()
            .any(|internal| scheme.eq_ignore_ascii_case(internal)),
        None => false,
    }
}

/// Get the position after "://", if the string carries an explicit scheme.
#[inline]
pub fn get_scheme_end(s: &str) -> Option<usize> {
    let sep = s.find("://")?;
    // A '/' before "://" means the separator is part of the path.
    if s[..sep].contains('/') {
        return None;
    }
    Some(sep + 3)
}

// =============================================================================
// Host Splitting
// =============================================================================

/// Split `host[:port]/path?query#fragment` (scheme already removed) into the
/// bare host and the remainder starting at the first `/`, `?` or `#`.
/// Userinfo and port are dropped from the host.
pub fn split_host(rest: &str) -> (&str, &str) {
    let host_end = rest
        .find(|c: char| c == '/' || c == '?' || c == '#')
        .unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(host_end);

    let host = match authority.rfind('@') {
        Some(at_pos) => &authority[at_pos + 1..],
        None => authority,
    };
    let host = match host.find(':') {
        Some(colon_pos) => &host[..colon_pos],
        None => host,
    };

    (host, tail)
}

/// Strip one conventional `www.` / `m.` label, as long as a dotted
/// name remains.
#[inline]
pub fn strip_conventional_prefix(host: &str) -> &str {
    for prefix in ["www.", "m."] {
        if let Some(rest) = host.strip_prefix(prefix) {
            if rest.contains('.') {
                return rest;
            }
        }
    }
    host
}

// =============================================================================
// Parsed URL
// =============================================================================

/// The pieces of a navigated URL that rules are matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// The URL exactly as supplied (trimmed)
    pub full: String,
    pub scheme: String,
    /// Lowercase host, empty for host-less URLs
    pub hostname: String,
    /// Lowercase path plus `?query`, always starting with `/` for hierarchical URLs
    pub path: String,
}

impl UrlParts {
    /// Parse a navigated URL. Fails only when the string is not a URL at all.
    pub fn parse(input: &str) -> Result<Self, Degradation> {
        let full = input.trim();
        let url = Url::parse(full).map_err(|e| Degradation::InvalidUrl(e.to_string()))?;

        let hostname = url
            .host_str()
            .map(|h| h.trim_end_matches('.').to_ascii_lowercase())
            .unwrap_or_default();

        let mut path = url.path().to_lowercase();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(&query.to_lowercase());
        }

        Ok(Self {
            full: full.to_string(),
            scheme: url.scheme().to_string(),
            hostname,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_scheme() {
        assert_eq!(extract_scheme("https://example.com"), Some("https"));
        assert_eq!(extract_scheme("chrome-extension://abc/page.html"), Some("chrome-extension"));
        assert_eq!(extract_scheme("about:blank"), Some("about"));
        assert_eq!(extract_scheme("example.com/path"), None);
        assert_eq!(extract_scheme("1http://x"), None);
    }

    #[test]
    fn test_is_internal_url() {
        assert!(is_internal_url("chrome://settings"));
        assert!(is_internal_url("about:blank"));
        assert!(is_internal_url("MOZ-EXTENSION://id/popup.html"));
        assert!(!is_internal_url("https://example.com"));
        assert!(!is_internal_url("not a url"));
    }

    #[test]
    fn test_get_scheme_end() {
        assert_eq!(get_scheme_end("https://example.com"), Some(8));
        assert_eq!(get_scheme_end("example.com/a://b"), None);
        assert_eq!(get_scheme_end("example.com"), None);
    }

    #[test]
    fn test_split_host() {
        assert_eq!(split_host("example.com/path?q=1"), ("example.com", "/path?q=1"));
        assert_eq!(split_host("example.com:8080/path"), ("example.com", "/path"));
        assert_eq!(split_host("user:pass@example.com/path"), ("example.com", "/path"));
        assert_eq!(split_host("example.com?q"), ("example.com", "?q"));
        assert_eq!(split_host("example.com"), ("example.com", ""));
    }

    #[test]
    fn test_strip_conventional_prefix() {
        assert_eq!(strip_conventional_prefix("www.reddit.com"), "reddit.com");
        assert_eq!(strip_conventional_prefix("m.youtube.com"), "youtube.com");
        assert_eq!(strip_conventional_prefix("mail.google.com"), "mail.google.com");
        assert_eq!(strip_conventional_prefix("www.com"), "www.com");
    }

    #[test]
    fn test_url_parts() {
        let parts = UrlParts::parse("https://WWW.Reddit.com/r/cars/?sort=new#top").unwrap();
        assert_eq!(parts.scheme, "https");
        assert_eq!(parts.hostname, "www.reddit.com");
        assert_eq!(parts.path, "/r/cars/?sort=new");
    }

    #[test]
    fn test_url_parts_root_path() {
        let parts = UrlParts::parse("https://website.com").unwrap();
        assert_eq!(parts.path, "/");
    }

    #[test]
    fn test_url_parts_invalid() {
        assert!(matches!(
            UrlParts::parse("not a url"),
            Err(Degradation::InvalidUrl(_))
        ));
        assert!(UrlParts::parse("").is_err());
    }

    #[test]
    fn test_url_parts_idn_and_encoded_path() {
        let parts = UrlParts::parse("https://Bücher.de/Café?q=a b").unwrap();
        assert_eq!(parts.hostname, "xn--bcher-kva.de");
        assert_eq!(parts.path, "/caf%c3%a9?q=a%20b");
    }
}
