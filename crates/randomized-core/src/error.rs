//! Error types for randomized-core.
//!
//! Every problem detected while resolving seeds, locales or configuration is
//! reported before the first test runs.

/// Result type alias for core harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Errors raised while preparing a randomized run.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Invalid suite or test configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A seed string could not be decoded.
    #[error("invalid seed {input:?}: {reason}")]
    InvalidSeed {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A locale tag could not be parsed.
    #[error("invalid locale tag {input:?}: {reason}")]
    InvalidLocale {
        /// The rejected tag.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An empty or inverted range was requested from a random stream.
    #[error("invalid range: min {min} is greater than max {max}")]
    InvalidRange {
        /// Lower bound (inclusive).
        min: i64,
        /// Upper bound (inclusive).
        max: i64,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl HarnessError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an invalid seed error.
    #[must_use]
    pub fn invalid_seed(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSeed {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid locale error.
    #[must_use]
    pub fn invalid_locale(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLocale {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error belongs to suite setup (bad user input)
    /// rather than to an individual draw.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::InvalidSeed { .. } | Self::InvalidLocale { .. }
        )
    }
}
