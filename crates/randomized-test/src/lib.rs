// Allow unwrap/expect/panic in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # randomized-test
//!
//! Runner for randomized test suites.
//!
//! This crate provides:
//! - **Seeded execution**: every iteration gets its own reproducible
//!   [`randomized_core::RandomStream`] through [`TestContext`]
//! - **Repetition**: tests run `repeat` times, with a pinned seed or a seed
//!   derived from the suite's master seed
//! - **Thread-leak detection**: threads that outlive a test fail it unless a
//!   [`ThreadFilter`] accepts them
//! - **Reporting**: a serializable [`SuiteReport`] and `tracing` log lines
//!   carrying the seed needed to reproduce each failure
//!
//! ## Example
//!
//! ```rust,no_run
//! use randomized_core::{SeedValue, TestConfig};
//! use randomized_test::{NameFilter, Suite, TestError};
//!
//! let suite = Suite::builder("example")
//!     .filter(NameFilter::new("friendly-zombie"))
//!     .test_with("seeded", TestConfig::new().seed(SeedValue::new(12345)), |ctx| {
//!         if ctx.random_int() == 1553932502 {
//!             Ok(())
//!         } else {
//!             Err(TestError::assertion("unexpected first draw"))
//!         }
//!     })
//!     .build();
//!
//! let report = suite.run()?;
//! assert!(report.is_success());
//! # Ok::<(), randomized_core::HarnessError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod detector;
pub mod error;
pub mod filter;
pub mod logging;
pub mod report;
pub mod runner;

pub use context::TestContext;
pub use detector::{LeakDetector, LeakStatus, find_leaks};
pub use error::{Result, TestError};
pub use filter::{FnFilter, NameFilter, PrefixFilter, ThreadFilter};
pub use report::{Failure, FailureKind, Outcome, Summary, SuiteReport, TestResult};
pub use runner::{Suite, SuiteBuilder, TestBody, TestCase};
