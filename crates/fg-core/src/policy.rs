//! Policy configuration
//!
//! The policy is owned and persisted by the host; this module only
//! describes its wire shape and normalizes the accepted representations
//! of list entries into plain rule strings.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::types::Mode;

/// A pattern list entry as the host stores it.
///
/// Accepts `"example.com"`, `{"pattern": "example.com"}` and
/// `{"url": "example.com"}` interchangeably.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternEntry {
    Text(String),
    Pattern { pattern: String },
    Url { url: String },
}

impl PatternEntry {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Pattern { pattern } => pattern,
            Self::Url { url } => url,
        }
    }
}

impl From<&str> for PatternEntry {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PatternEntry {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Caller-supplied blocking policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
    #[serde(alias = "isEnabled")]
    pub enabled: bool,
    pub mode: Mode,
    #[serde(alias = "allowPatterns", alias = "allowList")]
    pub allow: Vec<PatternEntry>,
    #[serde(alias = "denyPatterns", alias = "denyList")]
    pub deny: Vec<PatternEntry>,
    pub allow_keywords: Vec<String>,
    pub deny_keywords: Vec<String>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: Mode::default(),
            allow: Vec::new(),
            deny: Vec::new(),
            allow_keywords: Vec::new(),
            deny_keywords: Vec::new(),
        }
    }
}

impl Policy {
    /// Empty, enabled policy in the given mode.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Parse a policy from JSON text.
    pub fn from_json(text: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a policy from a JSON file.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn with_allow<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow
            .extend(entries.into_iter().map(|s| PatternEntry::Text(s.into())));
        self
    }

    pub fn with_deny<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deny
            .extend(entries.into_iter().map(|s| PatternEntry::Text(s.into())));
        self
    }

    pub fn with_allow_keywords<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_keywords.extend(entries.into_iter().map(Into::into));
        self
    }

    pub fn with_deny_keywords<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deny_keywords.extend(entries.into_iter().map(Into::into));
        self
    }

    /// Allow patterns as plain strings.
    pub fn allow_patterns(&self) -> Vec<&str> {
        self.allow.iter().map(PatternEntry::as_str).collect()
    }

    /// Deny patterns as plain strings.
    pub fn deny_patterns(&self) -> Vec<&str> {
        self.deny.iter().map(PatternEntry::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_shapes_normalize() {
        let json = r#"{
            "mode": "combined",
            "allow": ["reddit.com/r/rust/*", {"pattern": "docs.rs"}, {"url": "crates.io"}],
            "deny": [{"url": "reddit.com"}]
        }"#;
        let policy = Policy::from_json(json).unwrap();
        assert_eq!(policy.mode, Mode::Combined);
        assert_eq!(
            policy.allow_patterns(),
            vec!["reddit.com/r/rust/*", "docs.rs", "crates.io"]
        );
        assert_eq!(policy.deny_patterns(), vec!["reddit.com"]);
    }

    #[test]
    fn test_defaults() {
        let policy = Policy::from_json("{}").unwrap();
        assert!(policy.enabled);
        assert_eq!(policy.mode, Mode::Blacklist);
        assert!(policy.allow.is_empty());
        assert!(policy.deny_keywords.is_empty());
    }

    #[test]
    fn test_aliases() {
        let json = r#"{
            "isEnabled": false,
            "mode": "Allowlist",
            "allowPatterns": ["youtube.com"],
            "denyKeywords": ["/shorts/i"]
        }"#;
        let policy = Policy::from_json(json).unwrap();
        assert!(!policy.enabled);
        assert_eq!(policy.mode, Mode::Whitelist);
        assert_eq!(policy.allow_patterns(), vec!["youtube.com"]);
        assert_eq!(policy.deny_keywords, vec!["/shorts/i".to_string()]);
    }

    #[test]
    fn test_unknown_mode_falls_back() {
        let policy = Policy::from_json(r#"{"mode": "paranoid"}"#).unwrap();
        assert_eq!(policy.mode, Mode::Blacklist);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Policy::from_json("{not json"),
            Err(PolicyError::Json(_))
        ));
    }

    #[test]
    fn test_builder() {
        let policy = Policy::new(Mode::Combined)
            .with_allow(["a.com"])
            .with_deny(vec!["b.com".to_string()])
            .with_deny_keywords(["casino"]);
        assert_eq!(policy.allow_patterns(), vec!["a.com"]);
        assert_eq!(policy.deny_patterns(), vec!["b.com"]);
        assert_eq!(policy.deny_keywords, vec!["casino".to_string()]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let policy = Policy::new(Mode::Whitelist).with_allow_keywords(["docs"]);
        let value = serde_json::to_value(&policy).unwrap();
        assert_eq!(value["mode"], "whitelist");
        assert_eq!(value["allowKeywords"][0], "docs");
        assert_eq!(value["enabled"], true);
    }
}
