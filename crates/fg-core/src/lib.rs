//! FocusGate Core Library
//!
//! This crate decides, for a URL and a caller-supplied policy, whether the
//! URL should be blocked and why. It is synchronous, allocation-light and
//! holds no state between calls: every decision is a pure function of the
//! URL, the allow/deny lists, the keyword lists, the mode and the enabled
//! flag.
//!
//! # Architecture
//!
//! Raw strings flow one way: the pattern parser produces structured rules,
//! the host and path matchers and the specificity scorer consume them, and
//! the decision engine combines their results with the keyword matcher to
//! produce a [`Verdict`].
//!
//! # Modules
//!
//! - `pattern`: Rule and URL parsing
//! - `domain`: Host matching
//! - `path`: Path matching
//! - `specificity`: Precision scoring for allow/deny conflicts
//! - `keyword`: Literal and `/regex/flags` keyword matching
//! - `engine`: Decision engine and compiled policies
//! - `policy`: Policy configuration model
//! - `lint`: Diagnostics for degraded rules
//! - `url`: URL helpers
//! - `types`: Shared type definitions
//!
//! # Example
//!
//! ```
//! use fg_core::decide;
//!
//! let verdict = decide(
//!     "https://www.reddit.com/r/cars/",
//!     &[] as &[&str],
//!     &["reddit.com/*"],
//!     &[] as &[&str],
//!     &[] as &[&str],
//!     "blacklist",
//!     true,
//! );
//! assert!(verdict.blocked);
//! assert_eq!(verdict.reason.to_string(), "pattern: reddit.com/*");
//! ```

pub mod domain;
pub mod engine;
pub mod error;
pub mod keyword;
pub mod lint;
pub mod path;
pub mod pattern;
pub mod policy;
pub mod specificity;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use domain::domain_matches;
pub use engine::{decide, decide_policy, explain, pattern_matches, CompiledPolicy, Explanation};
pub use error::{Degradation, PatternError, PolicyError};
pub use keyword::KeywordMatcher;
pub use lint::{lint, Diagnostic};
pub use path::path_matches;
pub use pattern::{parse_pattern, ParsedPattern, PatternKind, UrlPattern};
pub use policy::{PatternEntry, Policy};
pub use specificity::calculate_specificity;
pub use types::{ListKind, MatchResult, Mode, Reason, RuleMatch, RuleSource, Verdict};
