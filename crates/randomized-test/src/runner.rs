//! Suite runner.
//!
//! A [`Suite`] owns its tests and everything needed to run them: the suite
//! configuration, the thread lister, the leak filters and the locale registry.
//! [`Suite::run`] validates all of it up front, so a malformed seed or locale
//! fails before any test body executes. After setup, failures stay local to
//! the iteration that produced them.

use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use randomized_core::config::ENV_SEED;
use randomized_core::{
    HarnessError, LeakScope, Locale, LocaleRegistry, RandomStream, SeedValue, SuiteConfig,
    TestConfig, derive_seed, resolve_seed,
};
use randomized_platform::{ThreadLister, ThreadSnapshot, native_lister};
use uuid::Uuid;

use crate::context::TestContext;
use crate::detector::{LeakDetector, LeakStatus};
use crate::error::{Result, TestError};
use crate::filter::{self, ThreadFilter};
use crate::report::{Failure, FailureKind, Outcome, SuiteReport, TestResult};

/// Label mixed into the master seed to draw the suite locale.
const LOCALE_STREAM_LABEL: &str = "suite-locale";

/// Body of a test: draws from the context, returns an error to fail.
pub type TestBody = Box<dyn Fn(&mut TestContext) -> Result<()> + Send + Sync>;

/// A registered test.
pub struct TestCase {
    name: String,
    config: TestConfig,
    body: TestBody,
}

impl TestCase {
    /// Test name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Per-test configuration.
    #[must_use]
    pub const fn config(&self) -> &TestConfig {
        &self.config
    }
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Suite`].
pub struct SuiteBuilder {
    name: String,
    config: SuiteConfig,
    lister: Option<Arc<dyn ThreadLister>>,
    registry: Option<Arc<LocaleRegistry>>,
    filters: Vec<Arc<dyn ThreadFilter>>,
    tests: Vec<TestCase>,
}

impl SuiteBuilder {
    /// Replaces the suite configuration (defaults to [`SuiteConfig::default`]).
    #[must_use]
    pub fn config(mut self, config: SuiteConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the thread lister (defaults to [`native_lister`]).
    #[must_use]
    pub fn thread_lister(mut self, lister: Arc<dyn ThreadLister>) -> Self {
        self.lister = Some(lister);
        self
    }

    /// Sets the locale registry (defaults to [`LocaleRegistry::global`]).
    #[must_use]
    pub fn locale_registry(mut self, registry: Arc<LocaleRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Registers a filter applied to every test in the suite.
    #[must_use]
    pub fn filter(mut self, filter: impl ThreadFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Registers a test with the default [`TestConfig`].
    #[must_use]
    pub fn test<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut TestContext) -> Result<()> + Send + Sync + 'static,
    {
        self.test_with(name, TestConfig::default(), body)
    }

    /// Registers a test with an explicit [`TestConfig`].
    #[must_use]
    pub fn test_with<F>(mut self, name: impl Into<String>, config: TestConfig, body: F) -> Self
    where
        F: Fn(&mut TestContext) -> Result<()> + Send + Sync + 'static,
    {
        self.tests.push(TestCase {
            name: name.into(),
            config,
            body: Box::new(body),
        });
        self
    }

    /// Finishes the suite.
    #[must_use]
    pub fn build(self) -> Suite {
        Suite {
            name: self.name,
            config: self.config,
            lister: self.lister.unwrap_or_else(native_lister),
            registry: self.registry.unwrap_or_else(LocaleRegistry::global),
            filters: self.filters,
            tests: self.tests,
        }
    }
}

impl std::fmt::Debug for SuiteBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteBuilder")
            .field("name", &self.name)
            .field("tests", &self.tests.len())
            .finish_non_exhaustive()
    }
}

/// A named collection of randomized tests.
pub struct Suite {
    name: String,
    config: SuiteConfig,
    lister: Arc<dyn ThreadLister>,
    registry: Arc<LocaleRegistry>,
    filters: Vec<Arc<dyn ThreadFilter>>,
    tests: Vec<TestCase>,
}

/// Everything resolved before the first test runs.
struct Plan {
    master_seed: SeedValue,
    locale: Locale,
    detector: LeakDetector,
}

impl Suite {
    /// Starts building a suite.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SuiteBuilder {
        SuiteBuilder {
            name: name.into(),
            config: SuiteConfig::default(),
            lister: None,
            registry: None,
            filters: Vec::new(),
            tests: Vec::new(),
        }
    }

    /// Suite name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered tests, in execution order.
    #[must_use]
    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    /// Runs every test and returns the report.
    ///
    /// The default locale is overridden for the duration of the run and
    /// restored on return, whether tests fail or panic.
    ///
    /// # Errors
    /// Returns a configuration error if the seed, locale or any test
    /// configuration is invalid. No test runs in that case.
    pub fn run(&self) -> std::result::Result<SuiteReport, HarnessError> {
        let started = Instant::now();
        let plan = self.prepare()?;
        let run_id = Uuid::new_v4();

        tracing::info!(
            suite = %self.name,
            run_id = %run_id,
            master_seed = %plan.master_seed,
            locale = %plan.locale,
            leak_scope = ?self.config.leak_scope,
            tests = self.tests.len(),
            "starting test suite"
        );

        let guard = self.registry.install(plan.locale.clone());

        let suite_before = match self.config.leak_scope {
            LeakScope::Suite => Some(snapshot(&plan.detector)),
            LeakScope::Test | LeakScope::None => None,
        };

        let mut results = Vec::new();
        for case in &self.tests {
            let iterations = self.config.iterations.unwrap_or(case.config.repeat);
            for iteration in 0..iterations {
                results.push(self.run_iteration(&plan, case, iteration));
            }
        }

        let suite_leaks = match suite_before {
            Some(Ok(before)) => plan.detector.check(&before),
            Some(Err(reason)) => LeakStatus::Unchecked(reason),
            None => LeakStatus::Unchecked(format!("leak scope is {:?}", self.config.leak_scope)),
        };
        if suite_leaks.is_leaked() {
            tracing::error!(
                suite = %self.name,
                threads = ?suite_leaks.thread_names(),
                reproduce = %format!("{ENV_SEED}={}", plan.master_seed),
                "threads leaked from suite"
            );
        }

        drop(guard);

        let report = SuiteReport {
            suite: self.name.clone(),
            run_id,
            master_seed: plan.master_seed,
            locale: plan.locale,
            leak_scope: self.config.leak_scope,
            results,
            suite_leaks,
            elapsed: started.elapsed(),
        };

        let summary = report.summary();
        tracing::info!(
            suite = %self.name,
            master_seed = %report.master_seed,
            elapsed = %humantime::format_duration(report.elapsed),
            "{summary}"
        );

        Ok(report)
    }

    fn prepare(&self) -> std::result::Result<Plan, HarnessError> {
        self.config.validate()?;

        let mut seen = HashSet::new();
        for case in &self.tests {
            case.config
                .validate()
                .map_err(|e| HarnessError::config(format!("test {:?}: {e}", case.name)))?;
            if !seen.insert(case.name.as_str()) {
                return Err(HarnessError::config(format!(
                    "duplicate test name {:?}",
                    case.name
                )));
            }
        }

        let master_seed = resolve_seed(self.config.master_seed()?);
        let mut locale_stream = RandomStream::new(derive_seed(master_seed, LOCALE_STREAM_LABEL, 0));
        let locale = self.config.locale_setting()?.resolve(&mut locale_stream);

        let mut detector = LeakDetector::new(Arc::clone(&self.lister));
        for spec in &self.config.thread_filters {
            detector.add_filter(Arc::from(filter::from_spec(spec)));
        }
        for filter in &self.filters {
            detector.add_filter(Arc::clone(filter));
        }

        Ok(Plan {
            master_seed,
            locale,
            detector,
        })
    }

    fn run_iteration(&self, plan: &Plan, case: &TestCase, iteration: u32) -> TestResult {
        let (seed, reproduce) = match case.config.seed {
            Some(pinned) => (pinned, format!("seed pinned to {pinned}")),
            None => (
                derive_seed(plan.master_seed, &case.name, iteration),
                format!("{ENV_SEED}={}", plan.master_seed),
            ),
        };

        tracing::info!(
            suite = %self.name,
            test = %case.name,
            iteration,
            seed = %seed,
            "starting test"
        );

        let before = match self.config.leak_scope {
            LeakScope::Test => Some(snapshot(&plan.detector)),
            LeakScope::Suite | LeakScope::None => None,
        };

        let mut ctx = TestContext::new(case.name.clone(), iteration, seed, plan.locale.clone());
        let started = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| (case.body)(&mut ctx)));
        let elapsed = started.elapsed();

        let leaks = match before {
            Some(Ok(before)) => plan.detector.check(&before),
            Some(Err(reason)) => LeakStatus::Unchecked(reason),
            None => LeakStatus::Unchecked(format!("leak scope is {:?}", self.config.leak_scope)),
        };

        let mut failures = Vec::new();
        let mut skipped = None;
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(TestError::Assumption(reason))) => skipped = Some(reason),
            Ok(Err(e)) => failures.push(Failure {
                kind: FailureKind::Assertion,
                message: e.to_string(),
            }),
            Err(panic) => failures.push(Failure {
                kind: FailureKind::Assertion,
                message: format!("test panicked: {}", panic_message(panic.as_ref())),
            }),
        }
        if leaks.is_leaked() {
            let leak = TestError::ThreadLeak {
                threads: leaks.thread_names(),
            };
            failures.push(Failure {
                kind: FailureKind::ThreadLeak,
                message: leak.to_string(),
            });
        }

        let outcome = if !failures.is_empty() {
            for failure in &failures {
                tracing::error!(
                    test = %case.name,
                    iteration,
                    seed = %seed,
                    kind = ?failure.kind,
                    reproduce = %reproduce,
                    "{}",
                    failure.message
                );
            }
            Outcome::Failed { failures }
        } else if let Some(reason) = skipped {
            tracing::warn!(test = %case.name, iteration, seed = %seed, reason = %reason, "test skipped");
            Outcome::Skipped { reason }
        } else {
            tracing::debug!(test = %case.name, iteration, elapsed_ms = elapsed.as_millis() as u64, "test passed");
            Outcome::Passed
        };

        TestResult {
            name: case.name.clone(),
            iteration,
            seed,
            seed_pinned: case.config.seed.is_some(),
            reproduce,
            elapsed,
            outcome,
            leaks,
        }
    }
}

impl std::fmt::Debug for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("tests", &self.tests)
            .finish_non_exhaustive()
    }
}

fn snapshot(detector: &LeakDetector) -> std::result::Result<ThreadSnapshot, String> {
    detector.snapshot_threads_before().map_err(|e| {
        tracing::warn!(error = %e, "thread leak detection skipped");
        e.to_string()
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
