//! Falsification tests for the randomized test runner.
//!
//! Thread activity is scripted so that these tests are unaffected by the
//! harness running them in parallel. Real threads are covered by
//! `live_threads.rs`.

// Allow test-specific patterns that are denied in production code
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod leaks;
mod locale;
mod seeds;

use std::sync::Arc;

use randomized_core::{Locale, LocaleRegistry, SuiteConfig};
use randomized_platform::ScriptedThreadLister;
use randomized_test::{Suite, SuiteBuilder};

/// Suite builder isolated from the process: scripted threads, private locale
/// registry, fixed master seed.
pub fn isolated_suite(name: &str, lister: &ScriptedThreadLister, seed: &str) -> SuiteBuilder {
    Suite::builder(name)
        .config(SuiteConfig {
            seed: Some(seed.to_string()),
            ..SuiteConfig::default()
        })
        .thread_lister(Arc::new(lister.clone()))
        .locale_registry(Arc::new(LocaleRegistry::new(Locale::fallback())))
}
