//! Keyword matching over the raw URL string
//!
//! A keyword written as `/body/flags` is compiled as a regular expression
//! when every flag comes from the safe set and none repeats. Everything
//! else, including regex bodies that fail to compile, is matched as a
//! case-insensitive literal substring of the whole entry.

use regex::{Regex, RegexBuilder};

use crate::error::Degradation;

// =============================================================================
// Keyword Flags
// =============================================================================

bitflags::bitflags! {
    /// Flags accepted after the closing `/` of a keyword regex.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeywordFlags: u8 {
        /// `g` - no effect on a single test
        const GLOBAL = 1 << 0;
        /// `i` - case-insensitive
        const IGNORE_CASE = 1 << 1;
        /// `m` - `^`/`$` match at line boundaries
        const MULTI_LINE = 1 << 2;
        /// `s` - `.` matches newlines
        const DOT_ALL = 1 << 3;
        /// `u` - unicode (always on)
        const UNICODE = 1 << 4;
        /// `y` - match must start at the beginning of the URL
        const STICKY = 1 << 5;
    }
}

impl KeywordFlags {
    /// Parse a flag string. `None` for unknown or repeated flags.
    pub fn parse(text: &str) -> Option<Self> {
        let mut flags = Self::empty();
        for c in text.chars() {
            let flag = match c {
                'g' => Self::GLOBAL,
                'i' => Self::IGNORE_CASE,
                'm' => Self::MULTI_LINE,
                's' => Self::DOT_ALL,
                'u' => Self::UNICODE,
                'y' => Self::STICKY,
                _ => return None,
            };
            if flags.contains(flag) {
                return None;
            }
            flags |= flag;
        }
        Some(flags)
    }
}

// =============================================================================
// Keyword Matcher
// =============================================================================

#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),
    /// Lowercased needle
    Literal(String),
}

/// One compiled keyword entry.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    raw: String,
    matcher: Matcher,
    degradation: Option<Degradation>,
}

impl KeywordMatcher {
    /// Compile a keyword entry. Returns `None` for blank entries.
    pub fn compile(entry: &str) -> Option<Self> {
        let raw = entry.trim();
        if raw.is_empty() {
            return None;
        }

        let (matcher, degradation) = match split_delimited(raw) {
            Some((body, flag_text)) => match KeywordFlags::parse(flag_text) {
                Some(flags) => match build_regex(body, flags) {
                    Ok(regex) => (Matcher::Regex(regex), None),
                    Err(e) => {
                        log::debug!("keyword '{}' is not a valid regex ({}), matching literally", raw, e);
                        (literal(raw), Some(Degradation::InvalidKeywordRegex(e.to_string())))
                    }
                },
                None => {
                    log::debug!("keyword '{}' has unsupported flags, matching literally", raw);
                    (literal(raw), Some(Degradation::UnsupportedRegexFlags(flag_text.to_string())))
                }
            },
            None => (literal(raw), None),
        };

        Some(Self {
            raw: raw.to_string(),
            matcher,
            degradation,
        })
    }

    /// Keyword text as authored (trimmed).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_regex(&self) -> bool {
        matches!(self.matcher, Matcher::Regex(_))
    }

    pub fn degradation(&self) -> Option<&Degradation> {
        self.degradation.as_ref()
    }

    /// Test the keyword against the full URL.
    pub fn is_match(&self, url: &str) -> bool {
        match &self.matcher {
            Matcher::Regex(regex) => regex.is_match(url),
            Matcher::Literal(needle) => url.to_lowercase().contains(needle.as_str()),
        }
    }
}

fn literal(raw: &str) -> Matcher {
    Matcher::Literal(raw.to_lowercase())
}

/// Split `/body/flags` into body and flag text. The body must be non-empty.
fn split_delimited(raw: &str) -> Option<(&str, &str)> {
    let inner = raw.strip_prefix('/')?;
    let close = inner.rfind('/')?;
    let body = &inner[..close];
    if body.is_empty() {
        return None;
    }
    Some((body, &inner[close + 1..]))
}

fn build_regex(body: &str, flags: KeywordFlags) -> Result<Regex, regex::Error> {
    let source = if flags.contains(KeywordFlags::STICKY) {
        format!(r"\A(?:{})", body)
    } else {
        body.to_string()
    };

    RegexBuilder::new(&source)
        .case_insensitive(flags.contains(KeywordFlags::IGNORE_CASE))
        .multi_line(flags.contains(KeywordFlags::MULTI_LINE))
        .dot_matches_new_line(flags.contains(KeywordFlags::DOT_ALL))
        .build()
}

/// Compile a keyword list, skipping blank entries.
pub fn compile_keywords<S: AsRef<str>>(entries: &[S]) -> Vec<KeywordMatcher> {
    entries
        .iter()
        .filter_map(|entry| KeywordMatcher::compile(entry.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword(entry: &str) -> KeywordMatcher {
        KeywordMatcher::compile(entry).unwrap()
    }

    #[test]
    fn test_flags_parse() {
        assert_eq!(KeywordFlags::parse(""), Some(KeywordFlags::empty()));
        assert_eq!(
            KeywordFlags::parse("gi"),
            Some(KeywordFlags::GLOBAL | KeywordFlags::IGNORE_CASE)
        );
        assert_eq!(KeywordFlags::parse("ii"), None);
        assert_eq!(KeywordFlags::parse("x"), None);
        assert_eq!(KeywordFlags::parse("d"), None);
    }

    #[test]
    fn test_regex_keyword_case_insensitive() {
        let k = keyword("/bar?/i");
        assert!(k.is_regex());
        assert!(k.is_match("https://example.com/BAR"));
        assert!(k.is_match("https://example.com/ba"));
        assert!(k.is_match("https://example.com/barr"));
        assert!(!k.is_match("https://example.com/b"));
    }

    #[test]
    fn test_regex_keyword_case_sensitive_without_flag() {
        let k = keyword("/Casino/");
        assert!(k.is_regex());
        assert!(k.is_match("https://example.com/Casino"));
        assert!(!k.is_match("https://example.com/casino"));
    }

    #[test]
    fn test_plain_keyword_is_escaped_literal() {
        let k = keyword("bar?");
        assert!(!k.is_regex());
        assert!(k.is_match("https://example.com/BAR?x=1"));
        assert!(!k.is_match("https://example.com/bar"));
        assert!(!k.is_match("https://example.com/ba"));
    }

    #[test]
    fn test_duplicate_flags_fall_back_to_literal() {
        let k = keyword("/doo.*/ii");
        assert!(!k.is_regex());
        assert_eq!(
            k.degradation(),
            Some(&Degradation::UnsupportedRegexFlags("ii".to_string()))
        );
        assert!(k.is_match("https://example.com/?q=/doo.*/ii"));
        assert!(!k.is_match("https://example.com/doom"));
    }

    #[test]
    fn test_invalid_regex_falls_back_to_literal() {
        let k = keyword("/(unclosed/");
        assert!(!k.is_regex());
        assert!(matches!(k.degradation(), Some(Degradation::InvalidKeywordRegex(_))));
        assert!(k.is_match("https://example.com/(UNCLOSED/"));
    }

    #[test]
    fn test_sticky_anchors_at_start() {
        let k = keyword("/https:/y");
        assert!(k.is_match("https://example.com"));
        let k = keyword("/example/y");
        assert!(!k.is_match("https://example.com"));
    }

    #[test]
    fn test_dot_all_flag() {
        let k = keyword("/a.b/s");
        assert!(k.is_regex());
        assert!(k.is_match("a\nb"));
        assert!(!keyword("/a.b/").is_match("a\nb"));
    }

    #[test]
    fn test_multi_line_flag() {
        let k = keyword("/^x/m");
        assert!(k.is_regex());
        assert!(k.is_match("a\nx"));
        assert!(!keyword("/^x/").is_match("a\nx"));
    }

    #[test]
    fn test_global_and_unicode_flags_do_not_change_matching() {
        let k = keyword("/bar/g");
        assert!(k.is_regex());
        assert!(k.is_match("https://example.com/bar"));
        assert!(!k.is_match("https://example.com/BAR"));

        let k = keyword("/café/u");
        assert!(k.is_regex());
        assert!(k.is_match("https://example.com/café"));
    }

    #[test]
    fn test_repeated_flag_among_valid_ones_is_literal() {
        let k = keyword("/x/gig");
        assert!(!k.is_regex());
        assert_eq!(
            k.degradation(),
            Some(&Degradation::UnsupportedRegexFlags("gig".to_string()))
        );
        assert!(k.is_match("https://example.com/?q=/X/GIG"));
        assert!(!k.is_match("https://example.com/x"));
    }

    #[test]
    fn test_slash_without_body_is_literal() {
        let k = keyword("//");
        assert!(!k.is_regex());
        assert!(k.is_match("https://example.com"));
        let k = keyword("/path");
        assert!(!k.is_regex());
        assert!(k.is_match("https://example.com/Path/x"));
    }

    #[test]
    fn test_blank_entries_skipped() {
        assert!(KeywordMatcher::compile("   ").is_none());
        assert_eq!(compile_keywords(&["poker", "", " /bet/i "]).len(), 2);
    }
}
