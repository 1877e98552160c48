//! Randomized: seeded, repeatable test suites with thread-leak detection.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use randomized::prelude::*;
//!
//! let report = Suite::builder("quick-start")
//!     .config(SuiteConfig::from_env()?)
//!     .filter(NameFilter::new("friendly-zombie"))
//!     .test_with("repeat", TestConfig::new().repeat(5), |ctx| {
//!         let value = ctx.random_int_between(0, 10)?;
//!         if (0..=10).contains(&value) {
//!             Ok(())
//!         } else {
//!             Err(TestError::assertion(format!("{value} out of range")))
//!         }
//!     })
//!     .build()
//!     .run()?;
//! println!("{}", report.summary());
//! # Ok::<(), randomized::core::HarnessError>(())
//! ```

pub use randomized_core as core;
pub use randomized_platform as platform;
pub use randomized_test as test;

/// Prelude module for common imports.
pub mod prelude {
    pub use randomized_core::{
        HarnessError, LeakScope, Locale, LocaleSetting, RandomStream, SeedValue, SuiteConfig,
        TestConfig, resolve_seed,
    };
    pub use randomized_platform::{ThreadLister, ThreadRecord, native_lister};
    pub use randomized_test::{
        FnFilter, LeakStatus, NameFilter, PrefixFilter, Suite, SuiteReport, TestContext,
        TestError, ThreadFilter,
    };
}
