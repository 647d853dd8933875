//! Session configuration
//!
//! Everything a session needs is passed in as a [`VariationConfig`] value;
//! nothing reads process environment. Configs load from TOML:
//!
//! ```toml
//! project_key = "market"
//! tracked_entities = ["jobs", "hotels"]
//!
//! [flags]
//! remote_mode = true
//!
//! [dataset]
//! method = "distribute"
//! filter_key = "location"
//!
//! [channels.layout]
//! rule = "canonical"
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;
use vary_data::{ChainSettings, DatasetMethod};
use vary_present::text::DEFAULT_BUCKETS;
use vary_seed::{ChannelTable, VariantSelector};

/// Behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Vary layouts, attributes, sibling order and decoys
    pub structural_variation: bool,
    /// Query the seeded dataset source
    pub remote_mode: bool,
    /// Query the generation source
    pub ai_generate: bool,
    /// Never read or write the generated-data cache
    pub unique_mode: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            structural_variation: true,
            remote_mode: false,
            ai_generate: false,
            unique_mode: false,
        }
    }
}

/// Seeded dataset source settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Maximum records kept per entity
    pub limit: usize,
    /// Slicing method
    pub method: DatasetMethod,
    /// Distribution field
    pub filter_key: Option<String>,
    /// Time budget per request
    pub fetch_timeout_ms: u64,
    /// HTTP endpoint; without one the bundled data is sliced locally
    pub endpoint: Option<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            limit: 50,
            method: DatasetMethod::Select,
            filter_key: None,
            fetch_timeout_ms: 5_000,
            endpoint: None,
        }
    }
}

/// Generation source settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Records requested per entity
    pub count: usize,
    /// Time budget per request
    pub timeout_ms: u64,
    /// HTTP endpoint
    pub endpoint: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            count: 20,
            timeout_ms: 15_000,
            endpoint: None,
        }
    }
}

/// Complete session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariationConfig {
    /// Namespace for cache keys, persisted seeds and service requests
    pub project_key: String,
    /// Behaviour switches
    pub flags: FeatureFlags,
    /// Derived-seed rule per channel
    pub channels: ChannelTable,
    /// Variant selection mode and shuffle profile
    pub selection: VariantSelector,
    /// Dataset source settings
    pub dataset: DatasetConfig,
    /// Generation source settings
    pub generation: GenerationConfig,
    /// Entity types loaded before the session reports ready
    pub tracked_entities: Vec<String>,
    /// Number of phrasing buckets
    pub text_buckets: u8,
    /// Directory for persisted seeds and generated data; in-memory when unset
    pub store_dir: Option<PathBuf>,
}

impl Default for VariationConfig {
    fn default() -> Self {
        Self {
            project_key: "default".to_string(),
            flags: FeatureFlags::default(),
            channels: ChannelTable::standard(),
            selection: VariantSelector::default(),
            dataset: DatasetConfig::default(),
            generation: GenerationConfig::default(),
            tracked_entities: vec!["jobs".to_string()],
            text_buckets: DEFAULT_BUCKETS,
            store_dir: None,
        }
    }
}

impl VariationConfig {
    /// Default configuration for a project
    #[must_use]
    pub fn new(project_key: impl Into<String>) -> Self {
        Self {
            project_key: project_key.into(),
            ..Self::default()
        }
    }

    /// With feature flags
    #[inline]
    #[must_use]
    pub fn with_flags(mut self, flags: FeatureFlags) -> Self {
        self.flags = flags;
        self
    }

    /// With a channel table
    #[inline]
    #[must_use]
    pub fn with_channels(mut self, channels: ChannelTable) -> Self {
        self.channels = channels;
        self
    }

    /// With a selection mode and shuffle profile
    #[inline]
    #[must_use]
    pub fn with_selection(mut self, selection: VariantSelector) -> Self {
        self.selection = selection;
        self
    }

    /// With dataset settings
    #[inline]
    #[must_use]
    pub fn with_dataset(mut self, dataset: DatasetConfig) -> Self {
        self.dataset = dataset;
        self
    }

    /// With generation settings
    #[inline]
    #[must_use]
    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    /// With tracked entity types
    #[must_use]
    pub fn with_tracked<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tracked_entities = entities.into_iter().map(Into::into).collect();
        self
    }

    /// With a store directory
    #[inline]
    #[must_use]
    pub fn with_store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store_dir = Some(dir.into());
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(raw: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), project = %config.project_key, "configuration loaded");
        Ok(config)
    }

    /// Check constraints serde cannot express
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.project_key.trim().is_empty() {
            return Err(ConfigError::invalid("project_key must not be empty"));
        }
        if self.dataset.limit == 0 {
            return Err(ConfigError::invalid("dataset.limit must be positive"));
        }
        if self.dataset.fetch_timeout_ms == 0 {
            return Err(ConfigError::invalid("dataset.fetch_timeout_ms must be positive"));
        }
        if self.generation.timeout_ms == 0 {
            return Err(ConfigError::invalid("generation.timeout_ms must be positive"));
        }
        if self.text_buckets == 0 {
            return Err(ConfigError::invalid("text_buckets must be positive"));
        }
        if self.dataset.method == DatasetMethod::Distribute && self.dataset.filter_key.is_none() {
            tracing::warn!("distribute method without filter_key behaves like shuffle");
        }
        self.dataset_endpoint()?;
        self.generation_endpoint()?;
        Ok(())
    }

    /// Parsed dataset endpoint
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for malformed URLs.
    pub fn dataset_endpoint(&self) -> ConfigResult<Option<Url>> {
        parse_endpoint("dataset.endpoint", self.dataset.endpoint.as_deref())
    }

    /// Parsed generation endpoint
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for malformed URLs.
    pub fn generation_endpoint(&self) -> ConfigResult<Option<Url>> {
        parse_endpoint("generation.endpoint", self.generation.endpoint.as_deref())
    }

    /// Settings for the data provisioning chain
    #[must_use]
    pub fn chain_settings(&self) -> ChainSettings {
        ChainSettings::new(self.project_key.clone())
            .with_remote(self.flags.remote_mode)
            .with_ai(self.flags.ai_generate)
            .with_unique(self.flags.unique_mode)
            .with_limit(self.dataset.limit)
            .with_method(self.dataset.method, self.dataset.filter_key.clone())
            .with_timeouts(
                Duration::from_millis(self.dataset.fetch_timeout_ms),
                Duration::from_millis(self.generation.timeout_ms),
            )
            .with_generation_count(self.generation.count)
            .with_tracked(self.tracked_entities.iter().cloned())
    }
}

fn parse_endpoint(field: &str, raw: Option<&str>) -> ConfigResult<Option<Url>> {
    raw.map(|raw| {
        Url::parse(raw).map_err(|err| ConfigError::invalid(format!("{field}: {err}")))
    })
    .transpose()
}
