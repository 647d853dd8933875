//! Vary Seed - base seeds, derived channels and seeded selection
//!
//! The foundation every variation engine builds on:
//! - [`Seed`]: a validated base seed in `[1, 300]`, seed 1 being canonical
//! - [`SeedResolver`]: clamps raw input and derives per-channel sub-seeds
//! - [`VariantSelector`]: pure `(seed, key)` → index / permutation
//! - [`prng`] and [`hash`]: the pinned generators and hashes behind it
//!
//! # Example
//!
//! ```rust
//! use vary_seed::{Channel, SeedResolver, VariantSelector};
//!
//! let resolver = SeedResolver::default();
//! let base = resolver.resolve_base("42");
//! let layout = resolver.derive(base, &Channel::Layout).seed;
//!
//! let selector = VariantSelector::default();
//! let index = selector.index(layout, "layout", 12);
//! assert!(index < 12);
//! ```

#![warn(unreachable_pub)]

pub mod channel;
pub mod hash;
pub mod prng;
pub mod seed;
pub mod selector;

pub use channel::{Channel, ChannelRule, ChannelTable};
pub use seed::{DerivedSeed, DerivedSeeds, Seed, SeedError, SeedResolver, MAX_SEED, MIN_SEED};
pub use selector::{SelectionMode, ShuffleProfile, VariantSelector};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
