//! Test error types.

use randomized_core::HarnessError;
use randomized_platform::PlatformError;

/// Result type alias for test operations and test bodies.
pub type Result<T> = std::result::Result<T, TestError>;

/// Testing errors.
#[derive(Debug, thiserror::Error)]
pub enum TestError {
    /// Expected-vs-actual check failed.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// A test assumption did not hold; the iteration is skipped.
    #[error("assumption violated: {0}")]
    Assumption(String),

    /// Threads outlived the test and no filter accepted them.
    #[error("{} thread(s) leaked: {}", .threads.len(), .threads.join(", "))]
    ThreadLeak {
        /// Names of the leaked threads.
        threads: Vec<String>,
    },

    /// Seed, locale or configuration error.
    #[error(transparent)]
    Harness(#[from] HarnessError),

    /// Thread enumeration error.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl TestError {
    /// Creates an assertion error.
    #[must_use]
    pub fn assertion(msg: impl Into<String>) -> Self {
        Self::Assertion(msg.into())
    }

    /// Creates an assumption error.
    #[must_use]
    pub fn assumption(msg: impl Into<String>) -> Self {
        Self::Assumption(msg.into())
    }

    /// Returns true if this error fails suite setup rather than a single test.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        match self {
            Self::Harness(e) => e.is_configuration(),
            _ => false,
        }
    }
}
