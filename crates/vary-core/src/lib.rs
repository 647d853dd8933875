//! Vary Core - deterministic seed-driven variation sessions
//!
//! Ties the workspace together:
//! - [`VariationConfig`]: explicit configuration (flags, channels, sources)
//! - [`SeedInput`]: `seed` / `seed-structure` query input with a persisted fallback
//! - [`VariationSession`]: derived seeds fanned out to the presentation
//!   engines and the data provisioning chain
//!
//! # Example
//!
//! ```rust
//! use vary_core::prelude::*;
//!
//! let session = VariationSession::new(VariationConfig::new("market")).unwrap();
//! session.set_seed(Seed::new(42).unwrap());
//!
//! let layout = session.layout();
//! let id = session.element_id("search-input", 0);
//! let label = session.text("search.button", "Search");
//! assert!(!layout.sections.is_empty() && !id.is_empty() && !label.is_empty());
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod input;
pub mod session;

pub use config::{DatasetConfig, FeatureFlags, GenerationConfig, VariationConfig};
pub use error::{ConfigError, ConfigResult};
pub use input::{persisted_seed_key, resolve_input, ResolvedInput, SeedInput, SeedOrigin};
pub use session::{SessionBuilder, SessionSeeds, VariationSession};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for variation sessions
    pub use crate::{FeatureFlags, SeedInput, SessionSeeds, VariationConfig, VariationSession};
    pub use vary_data::{LoadOutcome, Stage};
    pub use vary_present::{ElementNode, Region};
    pub use vary_seed::{Channel, ChannelTable, Seed};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
