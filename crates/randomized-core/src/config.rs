//! Suite and test configuration.
//!
//! Configuration is validated before any test runs: a malformed seed or
//! locale fails suite setup rather than an individual test.
//!
//! # Sources (later wins)
//!
//! 1. Defaults ([`SuiteConfig::default`])
//! 2. A TOML file ([`SuiteConfig::load`])
//! 3. Environment overrides ([`SuiteConfig::apply_env`]):
//!    `TESTS_SEED`, `TESTS_LOCALE`, `TESTS_ITERS`, `TESTS_LEAK_SCOPE`

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};
use crate::locale::{LocaleSetting, RANDOM_LOCALE};
use crate::seed::SeedValue;

/// Environment variable carrying the master seed.
pub const ENV_SEED: &str = "TESTS_SEED";
/// Environment variable carrying the locale (`random` or a tag).
pub const ENV_LOCALE: &str = "TESTS_LOCALE";
/// Environment variable overriding every test's repeat count.
pub const ENV_ITERS: &str = "TESTS_ITERS";
/// Environment variable selecting the leak detection scope.
pub const ENV_LEAK_SCOPE: &str = "TESTS_LEAK_SCOPE";

/// When leaked threads are looked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeakScope {
    /// Around every test iteration.
    #[default]
    Test,
    /// Once around the whole suite.
    Suite,
    /// Never.
    None,
}

impl LeakScope {
    /// Parses `test`, `suite` or `none` (any case).
    ///
    /// # Errors
    /// Returns a configuration error for any other value.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "test" => Ok(Self::Test),
            "suite" => Ok(Self::Suite),
            "none" => Ok(Self::None),
            other => Err(HarnessError::config(format!(
                "unknown leak scope {other:?} (expected test, suite or none)"
            ))),
        }
    }
}

/// Declarative thread filter, as written in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FilterSpec {
    /// Accept threads whose name equals the value.
    Name(String),
    /// Accept threads whose name starts with the value.
    Prefix(String),
}

impl FilterSpec {
    fn validate(&self) -> Result<()> {
        let value = match self {
            Self::Name(v) | Self::Prefix(v) => v,
        };
        if value.is_empty() {
            return Err(HarnessError::config("thread filter value cannot be empty"));
        }
        Ok(())
    }
}

/// Suite-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Master seed (decimal or `0x` hex). A fresh one is drawn when absent.
    #[serde(default)]
    pub seed: Option<String>,

    /// `"random"` or an explicit language tag.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Overrides the repeat count of every test.
    #[serde(default)]
    pub iterations: Option<u32>,

    /// When to look for leaked threads.
    #[serde(default)]
    pub leak_scope: LeakScope,

    /// Threads allowed to outlive a test.
    #[serde(default)]
    pub thread_filters: Vec<FilterSpec>,
}

fn default_locale() -> String {
    RANDOM_LOCALE.to_string()
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            seed: None,
            locale: default_locale(),
            iterations: None,
            leak_scope: LeakScope::default(),
            thread_filters: Vec::new(),
        }
    }
}

impl SuiteConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| HarnessError::config(format!("failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| HarnessError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with the process environment applied.
    ///
    /// # Errors
    /// Returns an error if an override is malformed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies overrides read through `lookup` (normally `std::env::var`).
    ///
    /// Empty values are ignored.
    ///
    /// # Errors
    /// Returns an error if an override is malformed.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(seed) = get(ENV_SEED) {
            tracing::debug!(seed = %seed, "master seed from environment");
            self.seed = Some(seed);
        }
        if let Some(locale) = get(ENV_LOCALE) {
            self.locale = locale;
        }
        if let Some(iters) = get(ENV_ITERS) {
            let iters = iters.trim().parse::<u32>().map_err(|e| {
                HarnessError::config(format!("{ENV_ITERS}={iters:?} is not a count: {e}"))
            })?;
            self.iterations = Some(iters);
        }
        if let Some(scope) = get(ENV_LEAK_SCOPE) {
            self.leak_scope = LeakScope::parse(&scope)?;
        }

        self.validate()
    }

    /// Validates the configuration without resolving anything random.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.master_seed()?;
        LocaleSetting::parse(&self.locale)?;
        if self.iterations == Some(0) {
            return Err(HarnessError::config("iterations must be at least 1"));
        }
        for filter in &self.thread_filters {
            filter.validate()?;
        }
        Ok(())
    }

    /// Parses the configured master seed, if any.
    ///
    /// # Errors
    /// Returns [`HarnessError::InvalidSeed`] if the seed is malformed.
    pub fn master_seed(&self) -> Result<Option<SeedValue>> {
        self.seed.as_deref().map(str::parse::<SeedValue>).transpose()
    }

    /// Parses the configured locale setting.
    ///
    /// # Errors
    /// Returns [`HarnessError::InvalidLocale`] if the tag is malformed.
    pub fn locale_setting(&self) -> Result<LocaleSetting> {
        LocaleSetting::parse(&self.locale)
    }
}

/// Per-test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestConfig {
    /// Pinned seed; every iteration reuses it.
    #[serde(default)]
    pub seed: Option<SeedValue>,
    /// Number of times the body runs.
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

const fn default_repeat() -> u32 {
    1
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            seed: None,
            repeat: default_repeat(),
        }
    }
}

impl TestConfig {
    /// One iteration, unpinned seed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the seed.
    #[must_use]
    pub const fn seed(mut self, seed: SeedValue) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the repeat count.
    #[must_use]
    pub const fn repeat(mut self, iterations: u32) -> Self {
        self.repeat = iterations;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error if the repeat count is zero.
    pub fn validate(&self) -> Result<()> {
        if self.repeat == 0 {
            return Err(HarnessError::config("repeat must be at least 1"));
        }
        Ok(())
    }
}
