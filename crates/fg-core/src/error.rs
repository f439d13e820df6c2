//! Error and degradation types.
//!
//! The engine itself never fails: `decide` always returns a verdict. The
//! types here describe what went wrong while preparing inputs so that
//! callers (the CLI, the settings UI) can report it.

/// Hard parser failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("Empty pattern")]
    EmptyInput,
}

/// A silent, local fallback applied while compiling a policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Degradation {
    /// No host could be split out; the whole string is used as a literal host.
    #[error("Unparseable host, treated as literal host '{0}'")]
    UnparseableHost(String),
    /// A raw `^` pattern whose regex does not compile. It never matches.
    #[error("Invalid regex: {0}")]
    InvalidRegex(String),
    /// A `/body/flags` keyword with flags outside the safe set or repeated.
    #[error("Unsupported regex flags '{0}', matched as literal text")]
    UnsupportedRegexFlags(String),
    /// A `/body/flags` keyword whose body does not compile.
    #[error("Invalid keyword regex ({0}), matched as literal text")]
    InvalidKeywordRegex(String),
    /// The URL under evaluation could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Error type for policy loading.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("Failed to read policy: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid policy JSON: {0}")]
    Json(#[from] serde_json::Error),
}
