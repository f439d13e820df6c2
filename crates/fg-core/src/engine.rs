//! Decision Engine
//!
//! Composes the parser, host/path matchers, specificity scorer and keyword
//! matcher against a policy and produces one [`Verdict`] per URL.
//!
//! Resolution:
//! - `whitelist`: blocked unless some allow rule matches.
//! - `blacklist` / `combined`: allowed unless the best deny rule is at
//!   least as specific as the best allow rule. Ties block.

use serde::Serialize;

use crate::domain::domain_matches;
use crate::error::Degradation;
use crate::keyword::{compile_keywords, KeywordMatcher};
use crate::path::path_matches;
use crate::pattern::{parse_pattern, ParsedPattern, PatternKind};
use crate::policy::Policy;
use crate::specificity::{calculate_specificity, KEYWORD_SPECIFICITY};
use crate::types::{ListKind, MatchResult, Mode, Reason, RuleMatch, RuleSource, Verdict};
use crate::url::{is_internal_url, UrlParts};

// =============================================================================
// Pattern Matching
// =============================================================================

/// Test one parsed pattern against a parsed URL.
pub fn pattern_matches(url: &UrlParts, pattern: &ParsedPattern) -> MatchResult {
    if rule_matches(url, pattern) {
        MatchResult::hit(calculate_specificity(pattern))
    } else {
        MatchResult::NONE
    }
}

fn rule_matches(url: &UrlParts, pattern: &ParsedPattern) -> bool {
    match &pattern.kind {
        // Raw regexes see the whole URL; host and path are not split out.
        PatternKind::RawRegex(r) => r.regex.as_ref().map_or(false, |re| re.is_match(&url.full)),
        PatternKind::Url(p) => {
            p.protocol.as_deref().map_or(true, |proto| proto == url.scheme)
                && domain_matches(&url.hostname, pattern)
                && path_matches(&url.path, pattern)
        }
    }
}

/// A pattern parsed once, with its score.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub pattern: ParsedPattern,
    pub specificity: u32,
}

impl CompiledPattern {
    fn compile(entry: &str) -> Option<Self> {
        match parse_pattern(entry) {
            Ok(pattern) => {
                let specificity = calculate_specificity(&pattern);
                Some(Self {
                    pattern,
                    specificity,
                })
            }
            Err(e) => {
                log::debug!("skipping pattern entry: {}", e);
                None
            }
        }
    }

    #[inline]
    fn is_match(&self, url: &UrlParts) -> bool {
        rule_matches(url, &self.pattern)
    }
}

fn compile_patterns<S: AsRef<str>>(entries: &[S]) -> Vec<CompiledPattern> {
    entries
        .iter()
        .filter_map(|entry| CompiledPattern::compile(entry.as_ref()))
        .collect()
}

// =============================================================================
// Compiled Policy
// =============================================================================

/// One rule list with its patterns parsed and keywords compiled.
#[derive(Debug, Clone, Default)]
pub struct CompiledList {
    pub patterns: Vec<CompiledPattern>,
    pub keywords: Vec<KeywordMatcher>,
}

impl CompiledList {
    pub fn compile<P: AsRef<str>, K: AsRef<str>>(patterns: &[P], keywords: &[K]) -> Self {
        Self {
            patterns: compile_patterns(patterns),
            keywords: compile_keywords(keywords),
        }
    }

    /// Every rule of this list that matches, patterns first, in list order.
    fn matches<'s>(
        &'s self,
        list: ListKind,
        url: &'s UrlParts,
    ) -> impl Iterator<Item = RuleMatch> + 's {
        let patterns = self
            .patterns
            .iter()
            .filter(move |p| p.is_match(url))
            .map(move |p| RuleMatch {
                list,
                source: RuleSource::Pattern,
                literal: p.pattern.raw.clone(),
                specificity: p.specificity,
            });

        let keywords = self
            .keywords
            .iter()
            .filter(move |k| k.is_match(&url.full))
            .map(move |k| RuleMatch {
                list,
                source: RuleSource::Keyword,
                literal: k.raw().to_string(),
                specificity: KEYWORD_SPECIFICITY,
            });

        patterns.chain(keywords)
    }

    /// Highest-specificity match; the earliest rule wins among equals.
    fn best_match(&self, list: ListKind, url: &UrlParts) -> Option<RuleMatch> {
        let mut best = None;
        for candidate in self.matches(list, url) {
            candidate.keep_best(&mut best);
        }
        best
    }
}

/// An immutable, reusable snapshot of a policy ready for evaluation.
#[derive(Debug, Clone)]
pub struct CompiledPolicy {
    pub enabled: bool,
    pub mode: Mode,
    pub allow: CompiledList,
    pub deny: CompiledList,
}

impl CompiledPolicy {
    pub fn compile(policy: &Policy) -> Self {
        Self {
            enabled: policy.enabled,
            mode: policy.mode,
            allow: CompiledList::compile(&policy.allow_patterns(), &policy.allow_keywords),
            deny: CompiledList::compile(&policy.deny_patterns(), &policy.deny_keywords),
        }
    }

    /// Evaluate a URL. Never fails.
    pub fn evaluate(&self, url: &str) -> Verdict {
        let verdict = match self.prepare(url) {
            Ok(parts) => {
                let best_allow = self.allow.best_match(ListKind::Allow, &parts);
                let best_deny = self.deny.best_match(ListKind::Deny, &parts);
                resolve(self.mode, best_allow.as_ref(), best_deny.as_ref())
            }
            Err((verdict, _)) => verdict,
        };
        log::trace!("{} -> blocked={} ({})", url, verdict.blocked, verdict.reason);
        verdict
    }

    /// Evaluate a URL and report every rule that matched it.
    pub fn explain(&self, url: &str) -> Explanation {
        let parts = match self.prepare(url) {
            Ok(parts) => parts,
            Err((verdict, degradation)) => {
                return Explanation {
                    verdict,
                    matches: Vec::new(),
                    warning: degradation.map(|d| d.to_string()),
                }
            }
        };

        let mut matches: Vec<RuleMatch> = self
            .allow
            .matches(ListKind::Allow, &parts)
            .chain(self.deny.matches(ListKind::Deny, &parts))
            .collect();

        // Selected before sorting so list order still breaks ties.
        let mut best_allow = None;
        let mut best_deny = None;
        for m in &matches {
            match m.list {
                ListKind::Allow => m.clone().keep_best(&mut best_allow),
                ListKind::Deny => m.clone().keep_best(&mut best_deny),
            }
        }
        let verdict = resolve(self.mode, best_allow.as_ref(), best_deny.as_ref());

        matches.sort_by(|a, b| b.specificity.cmp(&a.specificity));

        Explanation {
            verdict,
            matches,
            warning: None,
        }
    }

    /// Steps that short-circuit before any rule is consulted.
    fn prepare(&self, url: &str) -> Result<UrlParts, (Verdict, Option<Degradation>)> {
        if !self.enabled {
            return Err((Verdict::allowed(Reason::Disabled), None));
        }
        if is_internal_url(url) {
            return Err((Verdict::allowed(Reason::InternalPage), None));
        }
        UrlParts::parse(url).map_err(|d| {
            log::debug!("'{}': {}", url, d);
            (Verdict::allowed(Reason::InvalidUrl), Some(d))
        })
    }
}

fn resolve(mode: Mode, best_allow: Option<&RuleMatch>, best_deny: Option<&RuleMatch>) -> Verdict {
    // Whitelist still evaluates deny rules, but they cannot change the outcome.
    let deny = best_deny.filter(|_| mode != Mode::Whitelist);
    match (best_allow, deny) {
        (allow, Some(deny)) if allow.map_or(true, |a| a.specificity <= deny.specificity) => {
            Verdict::from_rule(true, deny)
        }
        (Some(allow), _) => Verdict::from_rule(false, allow),
        _ if mode.blocks_by_default() => Verdict::blocked(Reason::NotInAllowList),
        _ => Verdict::allowed(Reason::NoMatchingRule),
    }
}

/// A verdict plus every rule that matched, most specific first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub verdict: Verdict,
    pub matches: Vec<RuleMatch>,
    /// Why the URL could not be evaluated, if it could not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

// =============================================================================
// Entry Points
// =============================================================================

/// Decide whether `url` is blocked under the given lists and mode.
///
/// Stateless: every call parses its own inputs and retains nothing.
/// An unknown `mode` is treated as `blacklist`.
pub fn decide<A, D, AK, DK>(
    url: &str,
    allow_patterns: &[A],
    deny_patterns: &[D],
    allow_keywords: &[AK],
    deny_keywords: &[DK],
    mode: &str,
    is_enabled: bool,
) -> Verdict
where
    A: AsRef<str>,
    D: AsRef<str>,
    AK: AsRef<str>,
    DK: AsRef<str>,
{
    let policy = CompiledPolicy {
        enabled: is_enabled,
        mode: Mode::from_name_or_default(mode),
        allow: CompiledList::compile(allow_patterns, allow_keywords),
        deny: CompiledList::compile(deny_patterns, deny_keywords),
    };
    policy.evaluate(url)
}

/// Decide under a configured [`Policy`].
pub fn decide_policy(url: &str, policy: &Policy) -> Verdict {
    CompiledPolicy::compile(policy).evaluate(url)
}

/// Explain a decision under a configured [`Policy`].
pub fn explain(url: &str, policy: &Policy) -> Explanation {
    CompiledPolicy::compile(policy).explain(url)
}
