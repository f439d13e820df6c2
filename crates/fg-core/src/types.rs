//! Core type definitions for FocusGate
//!
//! These are the transient values of a single decision: the operating
//! mode, per-rule match results and the verdict handed back to the host.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// Mode
// =============================================================================

/// Policy operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Mode {
    /// Deny-first, default-allow (`blacklist` / `denylist`)
    #[default]
    Blacklist,
    /// Allow-first, default-deny (`whitelist` / `allowlist`)
    Whitelist,
    /// Both lists active, conflicts resolved by specificity
    Combined,
}

/// Mode name that is not one of the accepted spellings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown mode: {0}")]
pub struct UnknownMode(pub String);

impl Mode {
    /// Parse a mode name, falling back to [`Mode::Blacklist`] for unknown names.
    pub fn from_name_or_default(name: &str) -> Self {
        match name.parse() {
            Ok(mode) => mode,
            Err(UnknownMode(name)) => {
                log::warn!("unknown mode '{}', using blacklist", name);
                Self::Blacklist
            }
        }
    }

    /// Whether a URL with no matching rule is blocked.
    #[inline]
    pub fn blocks_by_default(self) -> bool {
        matches!(self, Self::Whitelist)
    }

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blacklist => "blacklist",
            Self::Whitelist => "whitelist",
            Self::Combined => "combined",
        }
    }
}

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blacklist" | "denylist" => Ok(Self::Blacklist),
            "whitelist" | "allowlist" => Ok(Self::Whitelist),
            "combined" => Ok(Self::Combined),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

impl From<String> for Mode {
    fn from(value: String) -> Self {
        Self::from_name_or_default(&value)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Rule provenance
// =============================================================================

/// Which list a rule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Allow,
    Deny,
}

impl ListKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

/// Whether a rule is a URL pattern or a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSource {
    Pattern,
    Keyword,
}

impl RuleSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Keyword => "keyword",
        }
    }
}

// =============================================================================
// Match Result
// =============================================================================

/// Outcome of testing one rule against one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchResult {
    pub matched: bool,
    pub specificity: u32,
}

impl MatchResult {
    pub const NONE: Self = Self {
        matched: false,
        specificity: 0,
    };

    #[inline]
    pub fn hit(specificity: u32) -> Self {
        Self {
            matched: true,
            specificity,
        }
    }
}

/// A rule that matched, with enough context to report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    pub list: ListKind,
    pub source: RuleSource,
    /// Raw rule text as authored
    pub literal: String,
    pub specificity: u32,
}

impl RuleMatch {
    pub fn reason(&self) -> Reason {
        match self.source {
            RuleSource::Pattern => Reason::Pattern(self.literal.clone()),
            RuleSource::Keyword => Reason::Keyword(self.literal.clone()),
        }
    }

    /// Keep whichever of `best` and `self` has the higher specificity.
    /// The first rule seen wins among equals.
    pub(crate) fn keep_best(self, best: &mut Option<RuleMatch>) {
        if best.as_ref().map_or(true, |b| self.specificity > b.specificity) {
            *best = Some(self);
        }
    }
}

// =============================================================================
// Reason
// =============================================================================

const PATTERN_PREFIX: &str = "pattern: ";
const KEYWORD_PREFIX: &str = "keyword: ";

/// Stable, machine-parseable explanation attached to every verdict.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reason {
    Disabled,
    InternalPage,
    InvalidUrl,
    NotInAllowList,
    NoMatchingRule,
    Pattern(String),
    Keyword(String),
}

impl Reason {
    /// The rule text behind a `pattern: ` / `keyword: ` reason.
    pub fn matched_text(&self) -> Option<&str> {
        match self {
            Self::Pattern(text) | Self::Keyword(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("disabled"),
            Self::InternalPage => f.write_str("internal page"),
            Self::InvalidUrl => f.write_str("invalid url"),
            Self::NotInAllowList => f.write_str("not in allow list"),
            Self::NoMatchingRule => f.write_str("no matching rule"),
            Self::Pattern(text) => write!(f, "{PATTERN_PREFIX}{text}"),
            Self::Keyword(text) => write!(f, "{KEYWORD_PREFIX}{text}"),
        }
    }
}

/// Text that is not a reason string produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized reason: {0}")]
pub struct UnknownReason(pub String);

impl FromStr for Reason {
    type Err = UnknownReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disabled" => Ok(Self::Disabled),
            "internal page" => Ok(Self::InternalPage),
            "invalid url" => Ok(Self::InvalidUrl),
            "not in allow list" => Ok(Self::NotInAllowList),
            "no matching rule" => Ok(Self::NoMatchingRule),
            _ => {
                if let Some(text) = s.strip_prefix(PATTERN_PREFIX) {
                    Ok(Self::Pattern(text.to_string()))
                } else if let Some(text) = s.strip_prefix(KEYWORD_PREFIX) {
                    Ok(Self::Keyword(text.to_string()))
                } else {
                    Err(UnknownReason(s.to_string()))
                }
            }
        }
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Reason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Verdict
// =============================================================================

/// The single output of one decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub blocked: bool,
    pub reason: Reason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specificity: Option<u32>,
}

impl Verdict {
    /// Allowed by one of the fixed-literal reasons.
    pub fn allowed(reason: Reason) -> Self {
        Self {
            blocked: false,
            reason,
            matched_pattern: None,
            specificity: None,
        }
    }

    /// Blocked by one of the fixed-literal reasons.
    pub fn blocked(reason: Reason) -> Self {
        Self {
            blocked: true,
            reason,
            matched_pattern: None,
            specificity: None,
        }
    }

    /// Decided by a specific rule.
    pub fn from_rule(blocked: bool, rule: &RuleMatch) -> Self {
        Self {
            blocked,
            reason: rule.reason(),
            matched_pattern: Some(rule.literal.clone()),
            specificity: Some(rule.specificity),
        }
    }
}
