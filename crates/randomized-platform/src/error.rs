//! Platform error types.

/// Result type alias for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Errors raised while enumerating threads.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// Thread enumeration is not available on this platform.
    #[error("platform not supported: {0}")]
    Unsupported(String),

    /// A thread record could not be parsed.
    #[error("failed to parse {path}: {reason}")]
    Parse {
        /// File that was being parsed.
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlatformError {
    /// Creates an unsupported-platform error.
    #[must_use]
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if enumeration is unavailable rather than broken.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}
