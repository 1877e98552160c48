//! Seed Controller.
//!
//! A [`SeedValue`] identifies one deterministic random stream. Seeds are
//! resolved once per test invocation: an explicit seed is returned unchanged,
//! otherwise a fresh one is drawn from the OS entropy source and must be
//! reported so the run can be reproduced.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// Integer seed of a deterministic pseudo-random stream.
///
/// Zero and negative values are ordinary seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedValue(i64);

impl SeedValue {
    /// Wraps a raw seed.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw seed.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Draws a fresh seed from the OS entropy source.
    #[must_use]
    pub fn from_entropy() -> Self {
        // v4 UUIDs are filled from getrandom. The version nibble (high word)
        // and variant bits (low word) sit at different positions, so the XOR
        // of both words has no fixed bits.
        let (hi, lo) = uuid::Uuid::new_v4().as_u64_pair();
        Self((hi ^ lo) as i64)
    }
}

impl From<i64> for SeedValue {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SeedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SeedValue {
    type Err = HarnessError;

    /// Accepts decimal (`12345`, `-7`) or `0x`-prefixed hexadecimal
    /// (`0xDEADBEEF`, `-0x10`).
    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(HarnessError::invalid_seed(input, "empty seed"));
        }

        let (negative, magnitude) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let hex = magnitude
            .strip_prefix("0x")
            .or_else(|| magnitude.strip_prefix("0X"));

        let value = match hex {
            Some(digits) => {
                let raw = u64::from_str_radix(digits, 16).map_err(|e| {
                    HarnessError::invalid_seed(input, format!("bad hexadecimal seed: {e}"))
                })?;
                // Hex seeds denote a 64-bit pattern, so 0xFFFF_FFFF_FFFF_FFFF is -1.
                let value = raw as i64;
                if negative { value.wrapping_neg() } else { value }
            }
            None => trimmed
                .parse::<i64>()
                .map_err(|e| HarnessError::invalid_seed(input, format!("bad decimal seed: {e}")))?,
        };

        Ok(Self(value))
    }
}

/// Resolves the seed for one test invocation.
///
/// An explicit seed is returned unchanged so a failing run can be replayed.
/// Without one, a fresh seed is drawn; the caller is responsible for
/// reporting it.
#[must_use]
pub fn resolve_seed(explicit: Option<SeedValue>) -> SeedValue {
    match explicit {
        Some(seed) => seed,
        None => {
            let seed = SeedValue::from_entropy();
            tracing::debug!(seed = %seed, "generated fresh seed");
            seed
        }
    }
}

/// Derives the seed for a test iteration from the suite's master seed.
///
/// Stable across platforms and releases: the test name is hashed with
/// FNV-1a and combined with the master seed and iteration through the
/// MurmurHash3 64-bit finalizer.
#[must_use]
pub fn derive_seed(master: SeedValue, test_name: &str, iteration: u32) -> SeedValue {
    let name_hash = fnv1a64(test_name.as_bytes());
    let mixed = fmix64(master.0 as u64 ^ name_hash)
        ^ fmix64((u64::from(iteration)).wrapping_add(0x9E37_79B9_7F4A_7C15));
    SeedValue(fmix64(mixed) as i64)
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, &b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}

const fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}
