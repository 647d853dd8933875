//! Vary Data - seeded data provisioning
//!
//! Resolves entity collections through a prioritized fallback chain:
//! - bundled static data for the canonical seed
//! - a persistent, checksummed cache of earlier results
//! - a seeded dataset source and a generation source, each time-bounded
//! - a deterministic local generator that always answers
//!
//! [`DataProvisioningChain`] is the only I/O-performing component of the
//! variation stack. Its public entry points never fail; the worst case is
//! the bundled dataset. [`ReadinessGate`] opens once the first pass over all
//! tracked entity types has settled.
//!
//! # Example
//!
//! ```rust
//! use vary_data::{ChainSettings, DataProvisioningChain, Stage};
//! use vary_seed::Seed;
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     let chain = DataProvisioningChain::new(ChainSettings::new("market").with_tracked(["jobs"]));
//!     let outcomes = chain.load_all(Seed::new(42).unwrap()).await;
//!     assert_eq!(outcomes[0].stage, Stage::Local);
//!     chain.when_ready().await;
//! });
//! ```

#![warn(unreachable_pub)]

pub mod bundled;
pub mod cache;
pub mod chain;
pub mod entity;
pub mod error;
pub mod generator;
pub mod local;
pub mod readiness;
pub mod source;
pub mod store;

pub use bundled::BundledCatalog;
pub use cache::{cache_key, CacheEntry, GeneratedCache};
pub use chain::{ChainSettings, DataProvisioningChain, LoadOutcome, Stage};
pub use entity::{Entity, EntitySchema, SchemaRegistry};
pub use error::{SourceError, StageFailure, StoreError};
pub use generator::{FieldGen, LocalGenerator, Template};
pub use local::LocalDatasetService;
pub use readiness::{ReadinessGate, ReadinessState};
pub use source::{
    DatasetMethod, DatasetRequest, DatasetSource, GenerationRequest, GenerationSource,
    HttpDatasetSource, HttpGenerationSource,
};
pub use store::{FileStore, MemoryStore, PersistentStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for data provisioning
    pub use crate::{
        ChainSettings, DataProvisioningChain, DatasetSource, Entity, GenerationSource,
        LoadOutcome, PersistentStore, ReadinessGate, Stage,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
