//! Reproducible pseudo-random streams.
//!
//! [`RandomStream`] is a 48-bit linear congruential generator
//! (multiplier `0x5DEECE66D`, increment `0xB`). Seeding scrambles the seed
//! with the multiplier, so the draw sequence for a given seed is identical on
//! every platform and matches the classic `java.util.Random` sequence.
//!
//! The stream is owned by exactly one test invocation; there is no shared
//! state between streams.

use crate::error::{HarnessError, Result};
use crate::seed::SeedValue;

const MULTIPLIER: u64 = 0x5_DEEC_E66D;
const INCREMENT: u64 = 0xB;
const MASK: u64 = (1 << 48) - 1;

/// Deterministic pseudo-random draw source.
#[derive(Debug, Clone)]
pub struct RandomStream {
    seed: SeedValue,
    state: u64,
    draws: u64,
}

impl RandomStream {
    /// Creates a stream for the given seed.
    #[must_use]
    pub const fn new(seed: SeedValue) -> Self {
        Self {
            seed,
            state: (seed.get() as u64 ^ MULTIPLIER) & MASK,
            draws: 0,
        }
    }

    /// Creates a stream from a fresh entropy seed.
    ///
    /// The seed is still recorded and available through [`Self::seed`].
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(SeedValue::from_entropy())
    }

    /// Returns the seed this stream was created from.
    #[must_use]
    pub const fn seed(&self) -> SeedValue {
        self.seed
    }

    /// Returns the number of state advances so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    fn next_bits(&mut self, bits: u32) -> i32 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & MASK;
        self.draws += 1;
        (self.state >> (48 - bits)) as i32
    }

    /// Draws a uniformly distributed `i32`.
    pub fn next_i32(&mut self) -> i32 {
        self.next_bits(32)
    }

    /// Draws a uniformly distributed `i64` (two 32-bit draws).
    pub fn next_i64(&mut self) -> i64 {
        let hi = i64::from(self.next_bits(32));
        let lo = i64::from(self.next_bits(32));
        (hi << 32).wrapping_add(lo)
    }

    /// Draws a boolean.
    pub fn next_bool(&mut self) -> bool {
        self.next_bits(1) != 0
    }

    /// Draws a double in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        let hi = i64::from(self.next_bits(26));
        let lo = i64::from(self.next_bits(27));
        ((hi << 27) + lo) as f64 * (1.0 / (1_u64 << 53) as f64)
    }

    /// Draws an `i32` in `[0, bound)`.
    ///
    /// # Errors
    /// Returns [`HarnessError::InvalidRange`] when `bound <= 0`.
    pub fn next_i32_below(&mut self, bound: i32) -> Result<i32> {
        if bound <= 0 {
            return Err(HarnessError::InvalidRange {
                min: 0,
                max: i64::from(bound) - 1,
            });
        }

        if bound & (bound - 1) == 0 {
            let bits = i64::from(self.next_bits(31));
            return Ok(((i64::from(bound) * bits) >> 31) as i32);
        }

        // Reject the tail that would bias the modulo.
        loop {
            let bits = self.next_bits(31);
            let val = bits % bound;
            if bits.checked_add(bound - 1 - val).is_some() {
                return Ok(val);
            }
        }
    }

    /// Draws an `i32` in `[min, max]` (both inclusive).
    ///
    /// # Errors
    /// Returns [`HarnessError::InvalidRange`] when `min > max`.
    pub fn int_between(&mut self, min: i32, max: i32) -> Result<i32> {
        if min > max {
            return Err(HarnessError::InvalidRange {
                min: i64::from(min),
                max: i64::from(max),
            });
        }

        let span = i64::from(max) - i64::from(min) + 1;
        if let Ok(bound) = i32::try_from(span) {
            return Ok(min + self.next_i32_below(bound)?);
        }

        // Span wider than i32::MAX: reject draws outside the range.
        loop {
            let candidate = self.next_i32();
            if (min..=max).contains(&candidate) {
                return Ok(candidate);
            }
        }
    }

    /// Picks one element of `items`, or `None` if the slice is empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let len = i32::try_from(items.len()).ok()?;
        if len == 0 {
            return None;
        }
        let index = self.next_i32_below(len).ok()?;
        items.get(index as usize)
    }
}
