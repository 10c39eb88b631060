//! Usage errors.
//!
//! Only *caller bugs* surface as errors: mutating a locked [`Config`] or
//! building [`DelimiterRules`] that cannot be scanned. Bad input text never
//! produces an error; the scanner degrades instead (see `engine/scanner.rs`).
//!
//! [`Config`]: crate::Config
//! [`DelimiterRules`]: crate::DelimiterRules

/// Errors raised by wrong API sequencing or malformed configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A rule was added after [`Config::lock`](crate::Config::lock).
    #[error("configuration is locked; rules can no longer be added")]
    Locked,

    /// The delimiter rules cannot be used to scan input.
    #[error("invalid delimiter rules: {0}")]
    InvalidDelimiters(&'static str),
}
