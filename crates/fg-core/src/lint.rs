//! Policy diagnostics
//!
//! Reports the fallbacks the engine would apply silently, so a settings
//! screen or the CLI can point at rules that do not mean what their
//! author intended.

use serde::Serialize;

use crate::error::{Degradation, PatternError};
use crate::keyword::KeywordMatcher;
use crate::pattern::parse_pattern;
use crate::policy::Policy;
use crate::types::{ListKind, RuleSource};

/// One problem with one list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub list: ListKind,
    pub source: RuleSource,
    /// Position in its list
    pub index: usize,
    pub entry: String,
    pub message: String,
}

/// Lint every list of a policy.
pub fn lint(policy: &Policy) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    lint_patterns(ListKind::Allow, &policy.allow_patterns(), &mut out);
    lint_patterns(ListKind::Deny, &policy.deny_patterns(), &mut out);
    lint_keywords(ListKind::Allow, &policy.allow_keywords, &mut out);
    lint_keywords(ListKind::Deny, &policy.deny_keywords, &mut out);
    out
}

fn lint_patterns<S: AsRef<str>>(list: ListKind, entries: &[S], out: &mut Vec<Diagnostic>) {
    for (index, entry) in entries.iter().enumerate() {
        let entry = entry.as_ref();
        let message = match parse_pattern(entry) {
            Err(PatternError::EmptyInput) => Some(PatternError::EmptyInput.to_string()),
            Ok(parsed) => parsed.degradation.map(|d| d.to_string()),
        };
        if let Some(message) = message {
            out.push(Diagnostic {
                list,
                source: RuleSource::Pattern,
                index,
                entry: entry.to_string(),
                message,
            });
        }
    }
}

fn lint_keywords<S: AsRef<str>>(list: ListKind, entries: &[S], out: &mut Vec<Diagnostic>) {
    for (index, entry) in entries.iter().enumerate() {
        let entry = entry.as_ref();
        let message = match KeywordMatcher::compile(entry) {
            None => Some("Empty keyword".to_string()),
            Some(keyword) => keyword.degradation().map(Degradation::to_string),
        };
        if let Some(message) = message {
            out.push(Diagnostic {
                list,
                source: RuleSource::Keyword,
                index,
                entry: entry.to_string(),
                message,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mode;

    #[test]
    fn test_clean_policy_has_no_diagnostics() {
        let policy = Policy::new(Mode::Combined)
            .with_allow(["reddit.com/r/rust/*", "^https://docs\\.rs/"])
            .with_deny(["*.reddit.com"])
            .with_deny_keywords(["casino", "/poker|slots/i"]);
        assert!(lint(&policy).is_empty());
    }

    #[test]
    fn test_reports_each_degradation() {
        let policy = Policy::new(Mode::Blacklist)
            .with_deny(["", "^(broken", "/only/a/path"])
            .with_allow_keywords(["/doo.*/ii"])
            .with_deny_keywords(["ok", "/[a-/"]);
        let diagnostics = lint(&policy);

        let summary: Vec<(ListKind, RuleSource, usize)> = diagnostics
            .iter()
            .map(|d| (d.list, d.source, d.index))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ListKind::Deny, RuleSource::Pattern, 0),
                (ListKind::Deny, RuleSource::Pattern, 1),
                (ListKind::Deny, RuleSource::Pattern, 2),
                (ListKind::Allow, RuleSource::Keyword, 0),
                (ListKind::Deny, RuleSource::Keyword, 1),
            ]
        );
        assert_eq!(diagnostics[0].message, "Empty pattern");
        assert!(diagnostics[3].message.contains("'ii'"));
    }
}
