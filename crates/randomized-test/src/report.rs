//! Suite results.

use std::fmt;
use std::time::Duration;

use randomized_core::{HarnessError, LeakScope, Locale, SeedValue};
use serde::Serialize;
use uuid::Uuid;

use crate::detector::LeakStatus;

/// Why an iteration failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The body returned an error or panicked.
    Assertion,
    /// Unfiltered threads outlived the body.
    ThreadLeak,
}

/// One failure of one iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Failure category.
    pub kind: FailureKind,
    /// Human-readable detail.
    pub message: String,
}

/// Final state of an iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Completed without failures.
    Passed,
    /// An assumption did not hold.
    Skipped {
        /// The violated assumption.
        reason: String,
    },
    /// At least one failure.
    Failed {
        /// Every failure, in detection order.
        failures: Vec<Failure>,
    },
}

/// Result of one iteration of one test.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    /// Test name.
    pub name: String,
    /// Zero-based iteration index.
    pub iteration: u32,
    /// Seed the iteration ran with.
    pub seed: SeedValue,
    /// Whether the seed was pinned by the test rather than derived.
    pub seed_pinned: bool,
    /// How to rerun this iteration with the same draws.
    pub reproduce: String,
    /// Wall-clock time of the body.
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    /// Final state.
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Leak detection result.
    pub leaks: LeakStatus,
}

impl TestResult {
    /// Returns true if the iteration passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed)
    }

    /// Returns true if the iteration failed.
    #[must_use]
    pub const fn failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }

    /// Returns true if the iteration was skipped.
    #[must_use]
    pub const fn skipped(&self) -> bool {
        matches!(self.outcome, Outcome::Skipped { .. })
    }

    /// Failures of this iteration (empty unless failed).
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        match &self.outcome {
            Outcome::Failed { failures } => failures,
            _ => &[],
        }
    }
}

/// Pass/fail/skip counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Iterations run.
    pub total: usize,
    /// Iterations passed.
    pub passed: usize,
    /// Iterations failed.
    pub failed: usize,
    /// Iterations skipped.
    pub skipped: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} run, {} passed, {} failed, {} skipped",
            self.total, self.passed, self.failed, self.skipped
        )
    }
}

/// Everything a suite run produced.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Suite name.
    pub suite: String,
    /// Unique id of this run.
    pub run_id: Uuid,
    /// Master seed; re-supply it to replay every derived seed.
    pub master_seed: SeedValue,
    /// Default locale installed for the run.
    pub locale: Locale,
    /// Leak detection scope.
    pub leak_scope: LeakScope,
    /// Per-iteration results, in execution order.
    pub results: Vec<TestResult>,
    /// Leak detection around the whole suite.
    pub suite_leaks: LeakStatus,
    /// Wall-clock time of the run.
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl SuiteReport {
    /// Counts outcomes.
    #[must_use]
    pub fn summary(&self) -> Summary {
        self.results.iter().fold(
            Summary {
                total: self.results.len(),
                ..Summary::default()
            },
            |mut summary, result| {
                match result.outcome {
                    Outcome::Passed => summary.passed += 1,
                    Outcome::Skipped { .. } => summary.skipped += 1,
                    Outcome::Failed { .. } => summary.failed += 1,
                }
                summary
            },
        )
    }

    /// Returns true if nothing failed and no thread leaked from the suite.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.results.iter().any(TestResult::failed) && !self.suite_leaks.is_leaked()
    }

    /// Failed iterations.
    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|result| result.failed())
    }

    /// Results of every iteration of the named test.
    pub fn results_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TestResult> {
        self.results.iter().filter(move |result| result.name == name)
    }

    /// Serializes the report as pretty JSON.
    ///
    /// # Errors
    /// Returns [`HarnessError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String, HarnessError> {
        serde_json::to_string_pretty(self).map_err(|e| HarnessError::Serialization(e.to_string()))
    }
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}
