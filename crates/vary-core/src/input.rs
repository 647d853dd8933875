//! Seed input resolution
//!
//! Order of precedence for the base seed:
//! 1. the `seed` query parameter (persisted once resolved)
//! 2. the value persisted under `"<project>_seed"`
//! 3. the canonical seed
//!
//! An optional `seed-structure` parameter overrides the derived structure
//! channel. Malformed values clamp to the canonical seed like any other
//! invalid input.

use serde::Serialize;
use url::Url;
use vary_data::PersistentStore;
use vary_seed::{Seed, SeedResolver};

/// Query parameter carrying the base seed
pub const SEED_PARAM: &str = "seed";

/// Query parameter overriding the structure channel
pub const STRUCTURE_SEED_PARAM: &str = "seed-structure";

/// Store key of the persisted base seed
#[must_use]
pub fn persisted_seed_key(project_key: &str) -> String {
    format!("{project_key}_seed")
}

/// Raw, unvalidated seed input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedInput {
    /// Raw `seed` value
    pub seed: Option<String>,
    /// Raw `seed-structure` value
    pub structure: Option<String>,
}

impl SeedInput {
    /// No input at all
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Input with an explicit base seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, raw: impl Into<String>) -> Self {
        self.seed = Some(raw.into());
        self
    }

    /// Input with an explicit structure seed
    #[inline]
    #[must_use]
    pub fn with_structure(mut self, raw: impl Into<String>) -> Self {
        self.structure = Some(raw.into());
        self
    }

    /// Parse a query string, with or without the leading `?`
    ///
    /// The first occurrence of each parameter wins.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut input = Self::none();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                SEED_PARAM if input.seed.is_none() => input.seed = Some(value.into_owned()),
                STRUCTURE_SEED_PARAM if input.structure.is_none() => {
                    input.structure = Some(value.into_owned());
                }
                _ => {}
            }
        }
        input
    }

    /// Parse the query of a full URL
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self::from_query(url.query().unwrap_or_default())
    }
}

/// Where the base seed came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedOrigin {
    /// Query parameter
    Query,
    /// Persisted store
    Persisted,
    /// Nothing supplied
    Default,
}

/// Validated seed input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedInput {
    /// Base seed
    pub base: Seed,
    /// Source of the base seed
    pub origin: SeedOrigin,
    /// Structure channel override
    pub structure: Option<Seed>,
}

/// Resolve raw input against the persisted store
///
/// Never fails: store errors are logged and skipped.
pub async fn resolve_input(
    resolver: &SeedResolver,
    input: &SeedInput,
    store: &dyn PersistentStore,
    project_key: &str,
) -> ResolvedInput {
    let key = persisted_seed_key(project_key);
    let structure = input
        .structure
        .as_deref()
        .map(|raw| resolver.resolve_base(raw));

    if let Some(raw) = input.seed.as_deref() {
        let base = resolver.resolve_base(raw);
        if let Err(err) = store.write(&key, base.to_string()).await {
            tracing::warn!(%err, "failed to persist seed");
        }
        return ResolvedInput {
            base,
            origin: SeedOrigin::Query,
            structure,
        };
    }

    match store.read(&key).await {
        Ok(Some(raw)) => ResolvedInput {
            base: resolver.resolve_base(&raw),
            origin: SeedOrigin::Persisted,
            structure,
        },
        Ok(None) => ResolvedInput {
            base: Seed::CANONICAL,
            origin: SeedOrigin::Default,
            structure,
        },
        Err(err) => {
            tracing::warn!(%err, "failed to read persisted seed");
            ResolvedInput {
                base: Seed::CANONICAL,
                origin: SeedOrigin::Default,
                structure,
            }
        }
    }
}
