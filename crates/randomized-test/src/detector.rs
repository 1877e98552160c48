//! Thread-Leak Detector.
//!
//! Before a test body runs, the ids of all live threads are captured. After
//! it returns, threads that are live now but were absent before are "new";
//! new threads accepted by no filter are leaks.
//!
//! Detection is a single non-blocking comparison: leaked threads are neither
//! joined nor terminated, only reported.

use std::sync::Arc;

use randomized_platform::{PlatformError, ThreadLister, ThreadRecord, ThreadSnapshot};
use serde::Serialize;

use crate::filter::ThreadFilter;

/// Per-test leak detection result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum LeakStatus {
    /// No unfiltered new thread survived.
    Clean,
    /// These threads survived and no filter accepted them.
    Leaked(Vec<ThreadRecord>),
    /// Detection did not run (platform or scope).
    Unchecked(String),
}

impl LeakStatus {
    /// Returns true for [`LeakStatus::Leaked`].
    #[must_use]
    pub const fn is_leaked(&self) -> bool {
        matches!(self, Self::Leaked(_))
    }

    /// Names of the leaked threads (empty unless leaked).
    #[must_use]
    pub fn thread_names(&self) -> Vec<String> {
        match self {
            Self::Leaked(threads) => threads.iter().map(|t| t.name.clone()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Computes the leaked threads from a prior snapshot and the live set.
///
/// Filters are consulted in registration order; the first accepting filter
/// excuses the thread. The result does not depend on filter order.
#[must_use]
pub fn find_leaks(
    before: &ThreadSnapshot,
    live: Vec<ThreadRecord>,
    filters: &[Arc<dyn ThreadFilter>],
) -> Vec<ThreadRecord> {
    live.into_iter()
        .filter(|thread| !before.contains(&thread.id))
        .filter(|thread| {
            match filters.iter().find(|filter| filter.accepts(thread)) {
                Some(filter) => {
                    tracing::debug!(thread = %thread, filter = filter.name(), "surviving thread accepted by filter");
                    false
                }
                None => true,
            }
        })
        .collect()
}

/// Detects threads leaked by a test.
#[derive(Clone)]
pub struct LeakDetector {
    lister: Arc<dyn ThreadLister>,
    filters: Vec<Arc<dyn ThreadFilter>>,
}

impl LeakDetector {
    /// Creates a detector with no filters.
    #[must_use]
    pub fn new(lister: Arc<dyn ThreadLister>) -> Self {
        Self {
            lister,
            filters: Vec::new(),
        }
    }

    /// Registers a filter.
    #[must_use]
    pub fn with_filter(mut self, filter: impl ThreadFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Registers a shared filter.
    pub fn add_filter(&mut self, filter: Arc<dyn ThreadFilter>) {
        self.filters.push(filter);
    }

    /// Registered filters, in registration order.
    #[must_use]
    pub fn filters(&self) -> &[Arc<dyn ThreadFilter>] {
        &self.filters
    }

    /// Captures the ids of the threads live right now.
    ///
    /// # Errors
    /// Returns an error if the platform cannot enumerate threads.
    pub fn snapshot_threads_before(&self) -> Result<ThreadSnapshot, PlatformError> {
        self.lister.snapshot()
    }

    /// Returns the new, unfiltered threads still alive since `before`.
    ///
    /// Idempotent: without thread activity in between, repeated calls with
    /// the same snapshot return the same threads.
    ///
    /// # Errors
    /// Returns an error if the platform cannot enumerate threads.
    pub fn detect_leaks(&self, before: &ThreadSnapshot) -> Result<Vec<ThreadRecord>, PlatformError> {
        let live = self.lister.list_live_threads()?;
        Ok(find_leaks(before, live, &self.filters))
    }

    /// Runs [`Self::detect_leaks`] and folds the outcome into a [`LeakStatus`].
    pub fn check(&self, before: &ThreadSnapshot) -> LeakStatus {
        match self.detect_leaks(before) {
            Ok(leaked) if leaked.is_empty() => LeakStatus::Clean,
            Ok(leaked) => LeakStatus::Leaked(leaked),
            Err(e) => {
                tracing::warn!(error = %e, "thread leak detection skipped");
                LeakStatus::Unchecked(e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for LeakDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let filters: Vec<&str> = self.filters.iter().map(|filter| filter.name()).collect();
        f.debug_struct("LeakDetector")
            .field("filters", &filters)
            .finish_non_exhaustive()
    }
}
