//! Per-iteration test context.

use randomized_core::{Locale, RandomStream, SeedValue};

use crate::error::{Result, TestError};

/// State handed to a test body for one iteration.
///
/// The random stream is owned by this iteration alone and seeded from
/// [`TestContext::seed`], so every draw is reproducible.
#[derive(Debug)]
pub struct TestContext {
    name: String,
    iteration: u32,
    seed: SeedValue,
    locale: Locale,
    random: RandomStream,
}

impl TestContext {
    /// Creates a context for one iteration of `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, iteration: u32, seed: SeedValue, locale: Locale) -> Self {
        Self {
            name: name.into(),
            iteration,
            seed,
            locale,
            random: RandomStream::new(seed),
        }
    }

    /// Test name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zero-based iteration index.
    #[must_use]
    pub const fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Seed of this iteration's random stream.
    #[must_use]
    pub const fn seed(&self) -> SeedValue {
        self.seed
    }

    /// Default locale of the running suite.
    #[must_use]
    pub const fn locale(&self) -> &Locale {
        &self.locale
    }

    /// The iteration's random stream.
    pub fn random(&mut self) -> &mut RandomStream {
        &mut self.random
    }

    /// Draws an `i32`.
    pub fn random_int(&mut self) -> i32 {
        self.random.next_i32()
    }

    /// Draws an `i32` in `[min, max]`.
    ///
    /// # Errors
    /// Returns an error if `min > max`.
    pub fn random_int_between(&mut self, min: i32, max: i32) -> Result<i32> {
        Ok(self.random.int_between(min, max)?)
    }

    /// Draws a boolean.
    pub fn random_bool(&mut self) -> bool {
        self.random.next_bool()
    }

    /// Draws one of the available locales.
    pub fn random_locale(&mut self) -> Locale {
        Locale::random(&mut self.random)
    }

    /// Picks one element of `items`.
    ///
    /// # Errors
    /// Returns an assertion error if `items` is empty.
    pub fn random_from<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T> {
        self.random
            .pick(items)
            .ok_or_else(|| TestError::assertion("cannot pick from an empty slice"))
    }

    /// Skips the iteration unless `condition` holds.
    ///
    /// # Errors
    /// Returns [`TestError::Assumption`] when `condition` is false.
    pub fn assume(&self, condition: bool, reason: impl Into<String>) -> Result<()> {
        if condition {
            Ok(())
        } else {
            Err(TestError::assumption(reason))
        }
    }
}
