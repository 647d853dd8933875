//! Base seed type and resolution
//!
//! A [`Seed`] is always inside `[1, 300]`. Anything else a caller hands in
//! (missing, non-numeric, non-finite, out of range) resolves to
//! [`Seed::CANONICAL`], which reproduces the original content.

use crate::channel::{Channel, ChannelTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Smallest valid seed
pub const MIN_SEED: u16 = 1;

/// Largest valid seed
pub const MAX_SEED: u16 = 300;

/// Number of distinct seeds
pub const SEED_SPACE: u32 = MAX_SEED as u32;

/// A validated base seed in `[1, 300]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Seed(u16);

impl Seed {
    /// The canonical seed: original layout, index-0 variants, bundled data
    pub const CANONICAL: Seed = Seed(MIN_SEED);

    /// Create a seed, rejecting values outside `[1, 300]`
    ///
    /// # Errors
    /// Returns [`SeedError::OutOfRange`] for values outside the seed space.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(value: u32) -> Result<Self, SeedError> {
        if (u32::from(MIN_SEED)..=SEED_SPACE).contains(&value) {
            // In range, so the narrowing cannot truncate.
            Ok(Self(value as u16))
        } else {
            Err(SeedError::OutOfRange(i64::from(value)))
        }
    }

    /// Strictly parse a raw textual seed
    ///
    /// Integers are accepted as-is, decimals are truncated toward zero.
    ///
    /// # Errors
    /// Returns a [`SeedError`] describing why the input is not a seed.
    pub fn parse_strict(raw: &str) -> Result<Self, SeedError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SeedError::NotANumber(raw.to_string()));
        }

        if let Ok(int) = trimmed.parse::<i64>() {
            return Self::from_i64(int);
        }

        let float: f64 = trimmed
            .parse()
            .map_err(|_| SeedError::NotANumber(raw.to_string()))?;
        Self::from_f64(float)
    }

    /// Convert a signed integer, rejecting out-of-range values
    ///
    /// # Errors
    /// Returns [`SeedError::OutOfRange`] for values outside the seed space.
    #[inline]
    pub fn from_i64(value: i64) -> Result<Self, SeedError> {
        u32::try_from(value)
            .map_err(|_| SeedError::OutOfRange(value))
            .and_then(|v| Self::new(v).map_err(|_| SeedError::OutOfRange(value)))
    }

    /// Convert a float, truncating toward zero
    ///
    /// # Errors
    /// Returns [`SeedError::NonFinite`] for NaN/infinite input and
    /// [`SeedError::OutOfRange`] for values outside the seed space.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_f64(value: f64) -> Result<Self, SeedError> {
        if !value.is_finite() {
            return Err(SeedError::NonFinite);
        }
        let truncated = value.trunc();
        if truncated < f64::from(MIN_SEED) || truncated > f64::from(MAX_SEED) {
            return Err(SeedError::OutOfRange(truncated as i64));
        }
        Self::from_i64(truncated as i64)
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Raw value widened for arithmetic
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0 as u32
    }

    /// Whether this is the canonical seed
    #[inline]
    #[must_use]
    pub const fn is_canonical(self) -> bool {
        self.0 == MIN_SEED
    }

    /// Zero-based offset into a table of `len` entries
    #[inline]
    #[must_use]
    pub fn offset(self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        usize::from(self.0 - MIN_SEED) % len
    }

    /// Iterate over every valid seed
    pub fn all() -> impl Iterator<Item = Seed> {
        (MIN_SEED..=MAX_SEED).map(Seed)
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::CANONICAL
    }
}

impl Display for Seed {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Seed {
    type Error = SeedError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Seed> for u32 {
    fn from(seed: Seed) -> Self {
        seed.as_u32()
    }
}

/// Why a raw input is not a valid seed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeedError {
    /// Input is not numeric
    #[error("not a number: '{0}'")]
    NotANumber(String),

    /// Input is NaN or infinite
    #[error("seed is not finite")]
    NonFinite,

    /// Input is outside `[1, 300]`
    #[error("seed {0} outside [1, 300]")]
    OutOfRange(i64),
}

/// Seed value for one named channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivedSeed {
    /// Channel the seed was derived for
    pub channel: Channel,
    /// Derived value
    pub seed: Seed,
}

/// Sub-seeds for every channel of a table, in channel order
pub type DerivedSeeds = BTreeMap<Channel, Seed>;

/// Resolves raw input into base seeds and derives channel sub-seeds
///
/// Resolution never fails: invalid input clamps to [`Seed::CANONICAL`].
#[derive(Debug, Clone, Default)]
pub struct SeedResolver {
    channels: ChannelTable,
}

impl SeedResolver {
    /// Create resolver over a channel table
    #[inline]
    #[must_use]
    pub fn new(channels: ChannelTable) -> Self {
        Self { channels }
    }

    /// Resolve textual input (query parameter, stored value)
    #[must_use]
    pub fn resolve_base(&self, raw: &str) -> Seed {
        Seed::parse_strict(raw).unwrap_or_else(|err| {
            tracing::debug!(raw, %err, "seed clamped to canonical");
            Seed::CANONICAL
        })
    }

    /// Resolve optional textual input, missing input is canonical
    #[must_use]
    pub fn resolve_optional(&self, raw: Option<&str>) -> Seed {
        raw.map_or(Seed::CANONICAL, |r| self.resolve_base(r))
    }

    /// Resolve a numeric input
    #[must_use]
    pub fn resolve_number(&self, raw: f64) -> Seed {
        Seed::from_f64(raw).unwrap_or_else(|err| {
            tracing::debug!(raw, %err, "seed clamped to canonical");
            Seed::CANONICAL
        })
    }

    /// Resolve an integer input
    #[must_use]
    pub fn resolve_int(&self, raw: i64) -> Seed {
        Seed::from_i64(raw).unwrap_or(Seed::CANONICAL)
    }

    /// Derive the sub-seed for one channel
    #[must_use]
    pub fn derive(&self, base: Seed, channel: &Channel) -> DerivedSeed {
        DerivedSeed {
            channel: channel.clone(),
            seed: self.channels.rule(channel).apply(base),
        }
    }

    /// Derive every channel configured in the table
    #[must_use]
    pub fn derive_all(&self, base: Seed) -> DerivedSeeds {
        self.channels
            .iter()
            .map(|(channel, rule)| (channel.clone(), rule.apply(base)))
            .collect()
    }

    /// Channel table in use
    #[inline]
    #[must_use]
    pub fn channels(&self) -> &ChannelTable {
        &self.channels
    }
}
