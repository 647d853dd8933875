//! Variation session
//!
//! A [`VariationSession`] is constructed once per user session or request
//! and threaded through the rendering layer. It owns:
//! - the seed resolver and the session's current seeds
//! - the presentation engines (pure, synchronous)
//! - the data provisioning chain (the only I/O)
//!
//! Seed changes are explicit: call [`VariationSession::set_seed`] and then
//! reload whatever depends on data.

use crate::config::VariationConfig;
use crate::error::ConfigResult;
use crate::input::{resolve_input, ResolvedInput, SeedInput};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use vary_data::{
    BundledCatalog, DataProvisioningChain, DatasetSource, Entity, FileStore, GenerationSource,
    HttpDatasetSource, HttpGenerationSource, LoadOutcome, LocalDatasetService, MemoryStore,
    PersistentStore,
};
use vary_present::{
    AttributeObfuscationEngine, ContentVariantEngine, DecoyPlan, ElementNode, LayoutRecord,
    LayoutTable, LayoutVariationEngine, PhraseTable, ReorderPlan,
};
use vary_seed::{Channel, DerivedSeeds, Seed, SeedResolver};

/// Seeds in effect for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSeeds {
    /// Base seed
    pub base: Seed,
    /// Layout channel
    pub layout: Seed,
    /// Data channel
    pub data: Seed,
    /// Text channel
    pub text: Seed,
    /// Structure channel (ids, classes, ordering)
    pub structure: Seed,
}

impl SessionSeeds {
    fn derive(resolver: &SeedResolver, base: Seed, structure_override: Option<Seed>) -> Self {
        Self {
            base,
            layout: resolver.derive(base, &Channel::Layout).seed,
            data: resolver.derive(base, &Channel::Data).seed,
            text: resolver.derive(base, &Channel::Text).seed,
            structure: structure_override
                .unwrap_or_else(|| resolver.derive(base, &Channel::Structure).seed),
        }
    }
}

/// Builder for [`VariationSession`]
pub struct SessionBuilder {
    config: VariationConfig,
    store: Option<Arc<dyn PersistentStore>>,
    remote: Option<Arc<dyn DatasetSource>>,
    generation: Option<Arc<dyn GenerationSource>>,
    catalog: Option<Arc<BundledCatalog>>,
    phrases: Option<Arc<PhraseTable>>,
    layouts: Option<LayoutTable>,
}

impl SessionBuilder {
    /// Persist seeds and generated data in `store`
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn PersistentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a specific dataset source
    #[must_use]
    pub fn with_remote(mut self, source: Arc<dyn DatasetSource>) -> Self {
        self.remote = Some(source);
        self
    }

    /// Use a specific generation source
    #[must_use]
    pub fn with_generation(mut self, source: Arc<dyn GenerationSource>) -> Self {
        self.generation = Some(source);
        self
    }

    /// Use a specific bundled catalog
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<BundledCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Use a specific phrase table
    #[must_use]
    pub fn with_phrases(mut self, phrases: Arc<PhraseTable>) -> Self {
        self.phrases = Some(phrases);
        self
    }

    /// Use a specific layout table
    #[must_use]
    pub fn with_layouts(mut self, layouts: LayoutTable) -> Self {
        self.layouts = Some(layouts);
        self
    }

    /// Validate configuration and assemble the session
    ///
    /// Sources not supplied explicitly come from configured endpoints; a
    /// session without a dataset endpoint slices the bundled catalog locally.
    ///
    /// # Errors
    /// Returns [`crate::ConfigError`] if the configuration is invalid.
    pub fn build(self) -> ConfigResult<VariationSession> {
        let config = self.config;
        config.validate()?;

        let catalog = self.catalog.unwrap_or_else(BundledCatalog::builtin);
        let store: Arc<dyn PersistentStore> = match (self.store, &config.store_dir) {
            (Some(store), _) => store,
            (None, Some(dir)) => Arc::new(FileStore::new(dir.clone())),
            (None, None) => Arc::new(MemoryStore::new()),
        };
        let remote: Arc<dyn DatasetSource> = match (self.remote, config.dataset_endpoint()?) {
            (Some(source), _) => source,
            (None, Some(url)) => Arc::new(HttpDatasetSource::new(url)),
            (None, None) => Arc::new(
                LocalDatasetService::new(Arc::clone(&catalog)).with_selector(config.selection),
            ),
        };
        let generation: Option<Arc<dyn GenerationSource>> =
            match (self.generation, config.generation_endpoint()?) {
                (Some(source), _) => Some(source),
                (None, Some(url)) => Some(Arc::new(HttpGenerationSource::new(url))),
                (None, None) => None,
            };

        let mut data = DataProvisioningChain::new(config.chain_settings())
            .with_catalog(catalog)
            .with_store(Arc::clone(&store))
            .with_remote(remote);
        if let Some(generation) = generation {
            data = data.with_generation(generation);
        }

        let structural = config.flags.structural_variation;
        let layout = LayoutVariationEngine::new(config.selection, self.layouts.unwrap_or_default())
            .with_enabled(structural);
        let attributes = AttributeObfuscationEngine::new(config.selection).with_enabled(structural);
        let content = ContentVariantEngine::new(self.phrases.unwrap_or_else(PhraseTable::builtin))
            .with_buckets(config.text_buckets);
        let resolver = SeedResolver::new(config.channels.clone());
        let seeds = SessionSeeds::derive(&resolver, Seed::CANONICAL, None);

        tracing::info!(
            project = %config.project_key,
            structural,
            remote = config.flags.remote_mode,
            ai = config.flags.ai_generate,
            unique = config.flags.unique_mode,
            "variation session created"
        );

        Ok(VariationSession {
            config,
            resolver,
            seeds: RwLock::new(seeds),
            structure_override: RwLock::new(None),
            layout,
            attributes,
            content,
            data: Arc::new(data),
            store,
        })
    }
}

/// Explicit context object wiring every variation engine
pub struct VariationSession {
    config: VariationConfig,
    resolver: SeedResolver,
    seeds: RwLock<SessionSeeds>,
    structure_override: RwLock<Option<Seed>>,
    layout: LayoutVariationEngine,
    attributes: AttributeObfuscationEngine,
    content: ContentVariantEngine,
    data: Arc<DataProvisioningChain>,
    store: Arc<dyn PersistentStore>,
}

impl std::fmt::Debug for VariationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariationSession")
            .field("project_key", &self.config.project_key)
            .field("seeds", &*self.seeds.read())
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

impl VariationSession {
    /// Start building a session
    #[must_use]
    pub fn builder(config: VariationConfig) -> SessionBuilder {
        SessionBuilder {
            config,
            store: None,
            remote: None,
            generation: None,
            catalog: None,
            phrases: None,
            layouts: None,
        }
    }

    /// Session with defaults for everything but the config
    ///
    /// # Errors
    /// Returns [`crate::ConfigError`] if the configuration is invalid.
    pub fn new(config: VariationConfig) -> ConfigResult<Self> {
        Self::builder(config).build()
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &VariationConfig {
        &self.config
    }

    /// Seed resolver in use
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &SeedResolver {
        &self.resolver
    }

    /// Resolve query/persisted input and make it the current seed
    pub async fn apply_input(&self, input: &SeedInput) -> ResolvedInput {
        let resolved =
            resolve_input(&self.resolver, input, self.store.as_ref(), &self.config.project_key).await;
        *self.structure_override.write() = resolved.structure;
        self.set_seed(resolved.base);
        tracing::info!(seed = %resolved.base, origin = ?resolved.origin, "seed input applied");
        resolved
    }

    /// Make `base` the current seed; in-flight data loads become superseded
    pub fn set_seed(&self, base: Seed) -> SessionSeeds {
        let seeds = SessionSeeds::derive(&self.resolver, base, *self.structure_override.read());
        *self.seeds.write() = seeds;
        self.data.set_current_seed(seeds.data);
        seeds
    }

    /// Override (or clear) the structure channel
    pub fn set_structure_seed(&self, structure: Option<Seed>) -> SessionSeeds {
        *self.structure_override.write() = structure;
        let base = self.seeds.read().base;
        self.set_seed(base)
    }

    /// Current seeds
    #[must_use]
    pub fn seeds(&self) -> SessionSeeds {
        *self.seeds.read()
    }

    /// Every configured channel's derived seed
    #[must_use]
    pub fn derived_seeds(&self) -> DerivedSeeds {
        self.resolver.derive_all(self.seeds().base)
    }

    /// Layout for the current layout seed
    #[must_use]
    pub fn layout(&self) -> &'static LayoutRecord {
        self.layout.layout_for(self.seeds().layout)
    }

    /// Id for the `index`-th element of a semantic type
    #[must_use]
    pub fn element_id(&self, element_type: &str, index: usize) -> String {
        self.attributes.id_for(self.seeds().structure, element_type, index)
    }

    /// Class string for a semantic type
    #[must_use]
    pub fn element_class(&self, element_type: &str) -> String {
        self.attributes.class_for(self.seeds().structure, element_type)
    }

    /// Phrasing for a semantic text key
    #[must_use]
    pub fn text(&self, semantic_key: &str, fallback: &str) -> String {
        self.content.text_for(self.seeds().text, semantic_key, fallback)
    }

    /// Decoys for a text slot, built from the phrasings not rendered
    #[must_use]
    pub fn decoys(&self, semantic_key: &str, protected: bool) -> DecoyPlan {
        self.attributes
            .decoys_for(self.seeds().text, semantic_key, protected, &self.content)
    }

    /// Reorder plan for an element tree
    #[must_use]
    pub fn reorder_plan(&self, root: &ElementNode) -> ReorderPlan {
        self.attributes.plan(root, self.seeds().structure)
    }

    /// Reordered copy of a sibling collection
    #[must_use]
    pub fn reorder<T, F>(&self, items: &[T], context_key: &str, is_protected: F) -> Vec<T>
    where
        T: Clone,
        F: Fn(&T) -> bool,
    {
        self.attributes
            .reorder(items, self.seeds().structure, context_key, is_protected)
    }

    /// Shuffled copy of a collection without protected entries
    #[must_use]
    pub fn shuffle<T: Clone>(&self, items: &[T], context_key: &str) -> Vec<T> {
        self.reorder(items, context_key, |_| false)
    }

    /// Load one entity under the current data seed
    pub async fn load(&self, entity: &str) -> LoadOutcome {
        self.data.load(entity, self.seeds().data).await
    }

    /// Records for one entity under the current data seed
    pub async fn initialize(&self, entity: &str) -> Arc<Vec<Entity>> {
        self.load(entity).await.items
    }

    /// Load every tracked entity and open the readiness gate
    pub async fn load_all(&self) -> Vec<LoadOutcome> {
        self.data.load_all(self.seeds().data).await
    }

    /// Resolve once the first full load has settled
    pub async fn when_ready(&self) {
        self.data.when_ready().await;
    }

    /// Data provisioning chain
    #[inline]
    #[must_use]
    pub fn data(&self) -> &Arc<DataProvisioningChain> {
        &self.data
    }

    /// Layout engine
    #[inline]
    #[must_use]
    pub fn layout_engine(&self) -> &LayoutVariationEngine {
        &self.layout
    }

    /// Attribute engine
    #[inline]
    #[must_use]
    pub fn attribute_engine(&self) -> &AttributeObfuscationEngine {
        &self.attributes
    }

    /// Content engine
    #[inline]
    #[must_use]
    pub fn content_engine(&self) -> &ContentVariantEngine {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureFlags;
    use vary_seed::ChannelTable;

    fn seed(v: u32) -> Seed {
        Seed::new(v).unwrap()
    }

    fn session(config: VariationConfig) -> VariationSession {
        VariationSession::new(config).unwrap()
    }

    #[test]
    fn starts_canonical() {
        let s = session(VariationConfig::new("market"));
        let seeds = s.seeds();
        assert_eq!(seeds.base, Seed::CANONICAL);
        assert_eq!(s.layout().name, "classic");
        assert_eq!(s.text("cta.book_now", "Book now"), "Book now");
        assert_eq!(s.element_id("search-input", 0), "search-input");
    }

    #[test]
    fn set_seed_derives_channels() {
        let s = session(VariationConfig::new("market"));
        let seeds = s.set_seed(seed(2));
        assert_eq!(seeds.data, seed(124));
        assert_eq!(s.data().current_seed(), seed(124));
        assert_eq!(s.derived_seeds().len(), 4);
    }

    #[test]
    fn structure_only_profile_pins_layout() {
        let s = session(VariationConfig::new("market").with_channels(ChannelTable::structure_only()));
        for base in Seed::all() {
            let seeds = s.set_seed(base);
            assert_eq!(seeds.layout, Seed::CANONICAL);
        }
        assert_eq!(s.layout().name, "classic");
    }

    #[test]
    fn structure_override_replaces_derived_channel() {
        let s = session(VariationConfig::new("market"));
        s.set_seed(seed(42));
        assert_eq!(s.set_structure_seed(Some(seed(9))).structure, seed(9));
        assert_ne!(s.set_structure_seed(None).structure, seed(9));
    }

    #[test]
    fn disabled_structure_keeps_canonical_presentation() {
        let flags = FeatureFlags {
            structural_variation: false,
            ..FeatureFlags::default()
        };
        let s = session(VariationConfig::new("market").with_flags(flags));
        s.set_seed(seed(42));
        assert_eq!(s.layout().name, "classic");
        assert_eq!(s.element_class("card"), s.attribute_engine().class_for(Seed::CANONICAL, "card"));
        assert!(s.decoys("cta.book_now", false).is_empty());
        assert_eq!(s.shuffle(&[1, 2, 3, 4], "nav"), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn apply_input_sets_seeds() {
        let s = session(VariationConfig::new("market"));
        let resolved = s
            .apply_input(&SeedInput::from_query("seed=42&seed-structure=5"))
            .await;
        assert_eq!(resolved.base, seed(42));
        assert_eq!(s.seeds().structure, seed(5));
        assert_eq!(s.seeds().base, seed(42));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = VariationConfig::new("market");
        config.dataset.limit = 0;
        assert!(VariationSession::new(config).is_err());
    }
}
