//! Host matching

use crate::pattern::{ParsedPattern, PatternKind};
use crate::url::strip_conventional_prefix;

/// Whether `url_hostname` satisfies the pattern's host constraint.
///
/// Raw regex patterns are never matched here; the engine tests their
/// regex against the whole URL instead.
pub fn domain_matches(url_hostname: &str, pattern: &ParsedPattern) -> bool {
    let p = match &pattern.kind {
        PatternKind::Url(p) => p,
        PatternKind::RawRegex(_) => return false,
    };

    let host = url_hostname.trim_end_matches('.').to_ascii_lowercase();
    let host = strip_conventional_prefix(&host);

    if p.is_wildcard_subdomain {
        host == p.base_domain || is_subdomain_of(host, &p.base_domain)
    } else {
        host == p.base_domain
    }
}

#[inline]
fn is_subdomain_of(host: &str, base: &str) -> bool {
    host.len() > base.len()
        && host.ends_with(base)
        && host.as_bytes()[host.len() - base.len() - 1] == b'.'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse_pattern;

    fn matches(host: &str, pattern: &str) -> bool {
        domain_matches(host, &parse_pattern(pattern).unwrap())
    }

    #[test]
    fn test_exact_host() {
        assert!(matches("website.com", "website.com"));
        assert!(matches("www.website.com", "website.com"));
        assert!(matches("m.website.com", "website.com"));
        assert!(matches("WEBSITE.com", "website.com"));
        assert!(!matches("sub.website.com", "website.com"));
        assert!(!matches("otherwebsite.com", "website.com"));
    }

    #[test]
    fn test_www_pattern_matches_bare_host() {
        assert!(matches("reddit.com", "www.reddit.com"));
        assert!(matches("www.reddit.com", "www.reddit.com"));
    }

    #[test]
    fn test_wildcard_subdomain() {
        assert!(matches("website.com", "*.website.com"));
        assert!(matches("sub.website.com", "*.website.com"));
        assert!(matches("a.b.website.com", "*.website.com"));
        assert!(!matches("notwebsite.com", "*.website.com"));
        assert!(!matches("website.com.evil.net", "*.website.com"));
    }

    #[test]
    fn test_raw_regex_not_evaluated() {
        assert!(!matches("example.com", "^.*example.*"));
    }

    #[test]
    fn test_trailing_dot() {
        assert!(matches("example.com.", "example.com"));
    }
}
