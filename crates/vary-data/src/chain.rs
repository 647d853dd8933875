//! Prioritized data provisioning
//!
//! Per entity type the chain walks, stopping at the first stage that yields
//! usable records:
//!
//! 1. bundled data, unconditionally for the canonical seed
//! 2. the generated-data cache (skipped in unique mode)
//! 3. the seeded dataset source, when remote mode is on
//! 4. the generation source, when AI mode is on
//! 5. the local deterministic generator, which always answers
//!
//! Source failures, empty results and timeouts are logged and advance the
//! chain. A load whose seed is no longer current when it finishes is
//! returned to its caller but neither committed to the snapshots nor
//! written to the cache. Only remote and generated records are cached.
//!
//! The readiness gate opens once every tracked entity has settled one load,
//! whether through [`DataProvisioningChain::load_all`] or individual calls.

use crate::bundled::BundledCatalog;
use crate::cache::GeneratedCache;
use crate::entity::{Entity, SchemaRegistry};
use crate::error::{SourceError, StageFailure};
use crate::generator::LocalGenerator;
use crate::readiness::ReadinessGate;
use crate::source::{DatasetMethod, DatasetRequest, DatasetSource, GenerationRequest, GenerationSource};
use crate::store::{MemoryStore, PersistentStore};
use dashmap::{DashMap, DashSet};
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use vary_seed::Seed;

/// Stage that produced a load's records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Static bundled dataset
    Bundled,
    /// Generated-data cache
    Cached,
    /// Seeded dataset source
    Remote,
    /// Generation source
    Generated,
    /// Local deterministic generator
    Local,
}

impl Stage {
    /// Stable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bundled => "bundled",
            Self::Cached => "cached",
            Self::Remote => "remote",
            Self::Generated => "generated",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of loading one entity type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadOutcome {
    /// Entity type
    pub entity: String,
    /// Seed the load ran under
    pub seed: Seed,
    /// Stage that answered
    pub stage: Stage,
    /// Read-only records
    pub items: Arc<Vec<Entity>>,
    /// Whether the result became the current snapshot
    pub committed: bool,
}

/// Chain behaviour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSettings {
    /// Project namespace for requests and cache keys
    pub project_key: String,
    /// Query the seeded dataset source
    pub remote_enabled: bool,
    /// Query the generation source
    pub ai_enabled: bool,
    /// Bypass the cache entirely
    pub unique_mode: bool,
    /// Maximum records kept from the dataset source
    pub limit: usize,
    /// Dataset slicing method
    pub method: DatasetMethod,
    /// Dataset distribution field
    pub filter_key: Option<String>,
    /// Time budget for the dataset source
    pub fetch_timeout: Duration,
    /// Records requested from generators
    pub generation_count: usize,
    /// Time budget for the generation source
    pub generation_timeout: Duration,
    /// Entity types loaded by [`DataProvisioningChain::load_all`]
    pub tracked_entities: Vec<String>,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            project_key: "default".to_string(),
            remote_enabled: false,
            ai_enabled: false,
            unique_mode: false,
            limit: 50,
            method: DatasetMethod::Select,
            filter_key: None,
            fetch_timeout: Duration::from_secs(5),
            generation_count: 20,
            generation_timeout: Duration::from_secs(15),
            tracked_entities: Vec::new(),
        }
    }
}

impl ChainSettings {
    /// Settings for a project
    #[must_use]
    pub fn new(project_key: impl Into<String>) -> Self {
        Self {
            project_key: project_key.into(),
            ..Self::default()
        }
    }

    /// Toggle the dataset stage
    #[must_use]
    pub fn with_remote(mut self, enabled: bool) -> Self {
        self.remote_enabled = enabled;
        self
    }

    /// Toggle the generation stage
    #[must_use]
    pub fn with_ai(mut self, enabled: bool) -> Self {
        self.ai_enabled = enabled;
        self
    }

    /// Toggle unique mode
    #[must_use]
    pub fn with_unique(mut self, enabled: bool) -> Self {
        self.unique_mode = enabled;
        self
    }

    /// Set the dataset limit
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the dataset method and distribution field
    #[must_use]
    pub fn with_method(mut self, method: DatasetMethod, filter_key: Option<String>) -> Self {
        self.method = method;
        self.filter_key = filter_key;
        self
    }

    /// Set both stage time budgets
    #[must_use]
    pub fn with_timeouts(mut self, fetch: Duration, generation: Duration) -> Self {
        self.fetch_timeout = fetch;
        self.generation_timeout = generation;
        self
    }

    /// Set the generation count
    #[must_use]
    pub fn with_generation_count(mut self, count: usize) -> Self {
        self.generation_count = count;
        self
    }

    /// Set the tracked entity types
    #[must_use]
    pub fn with_tracked<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tracked_entities = entities.into_iter().map(Into::into).collect();
        self
    }
}

async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, SourceError>
where
    F: Future<Output = Result<T, SourceError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout(
            u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        )),
    }
}

/// Session-scoped data provider
pub struct DataProvisioningChain {
    settings: ChainSettings,
    catalog: Arc<BundledCatalog>,
    schemas: SchemaRegistry,
    generator: LocalGenerator,
    remote: Option<Arc<dyn DatasetSource>>,
    generation: Option<Arc<dyn GenerationSource>>,
    cache: GeneratedCache,
    current: RwLock<Seed>,
    snapshots: DashMap<String, LoadOutcome>,
    settled: DashSet<String>,
    gate: ReadinessGate,
}

impl fmt::Debug for DataProvisioningChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataProvisioningChain")
            .field("settings", &self.settings)
            .field("remote", &self.remote.is_some())
            .field("generation", &self.generation.is_some())
            .field("current", &*self.current.read())
            .field("snapshots", &self.snapshots.len())
            .field("gate", &self.gate.state())
            .finish_non_exhaustive()
    }
}

impl DataProvisioningChain {
    /// Chain with built-in data, no external sources and an in-memory store
    #[must_use]
    pub fn new(settings: ChainSettings) -> Self {
        let cache = GeneratedCache::new(settings.project_key.clone(), Arc::new(MemoryStore::new()));
        Self {
            settings,
            catalog: BundledCatalog::builtin(),
            schemas: SchemaRegistry::builtin(),
            generator: LocalGenerator::default(),
            remote: None,
            generation: None,
            cache,
            current: RwLock::new(Seed::CANONICAL),
            snapshots: DashMap::new(),
            settled: DashSet::new(),
            gate: ReadinessGate::new(),
        }
    }

    /// Replace the bundled catalog
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<BundledCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the schema registry
    #[must_use]
    pub fn with_schemas(mut self, schemas: SchemaRegistry) -> Self {
        self.schemas = schemas;
        self
    }

    /// Replace the local generator
    #[must_use]
    pub fn with_generator(mut self, generator: LocalGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Attach the seeded dataset source
    #[must_use]
    pub fn with_remote(mut self, source: Arc<dyn DatasetSource>) -> Self {
        self.remote = Some(source);
        self
    }

    /// Attach the generation source
    #[must_use]
    pub fn with_generation(mut self, source: Arc<dyn GenerationSource>) -> Self {
        self.generation = Some(source);
        self
    }

    /// Persist generated data in `store`
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn PersistentStore>) -> Self {
        self.cache = GeneratedCache::new(self.settings.project_key.clone(), store);
        self
    }

    /// Settings in use
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    /// Generated-data cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &GeneratedCache {
        &self.cache
    }

    /// Readiness gate for the first `load_all` pass
    #[inline]
    #[must_use]
    pub fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    /// Authoritative seed; loads under any other seed are not committed
    #[must_use]
    pub fn current_seed(&self) -> Seed {
        *self.current.read()
    }

    /// Change the authoritative seed, superseding in-flight loads
    pub fn set_current_seed(&self, seed: Seed) {
        let mut current = self.current.write();
        if *current != seed {
            tracing::debug!(from = %*current, to = %seed, "current data seed changed");
            *current = seed;
        }
    }

    /// Records for `entity` under `seed`; never fails
    pub async fn initialize(&self, entity: &str, seed: Seed) -> Arc<Vec<Entity>> {
        self.load(entity, seed).await.items
    }

    /// Load one entity type and report how it was resolved
    ///
    /// `seed` becomes the authoritative seed for the duration of the call.
    pub async fn load(&self, entity: &str, seed: Seed) -> LoadOutcome {
        self.set_current_seed(seed);
        let (stage, items) = self.resolve(entity, seed).await;
        tracing::info!(entity, %seed, %stage, items = items.len(), "entity resolved");

        let mut outcome = LoadOutcome {
            entity: entity.to_string(),
            seed,
            stage,
            items,
            committed: false,
        };
        outcome.committed = self.commit(&outcome);
        if outcome.committed && self.cacheable(stage) {
            self.cache
                .put(entity, seed, outcome.items.as_ref().clone())
                .await;
        }
        self.settle(entity);
        outcome
    }

    /// Load every tracked entity concurrently, then open the readiness gate
    pub async fn load_all(&self, seed: Seed) -> Vec<LoadOutcome> {
        self.set_current_seed(seed);
        let outcomes = futures::future::join_all(
            self.settings
                .tracked_entities
                .iter()
                .map(|entity| self.load(entity, seed)),
        )
        .await;
        self.gate.mark_ready();
        outcomes
    }

    /// Resolve once every tracked entity has settled a first load
    pub async fn when_ready(&self) {
        self.gate.when_ready().await;
    }

    /// Latest committed outcome for an entity
    #[must_use]
    pub fn snapshot(&self, entity: &str) -> Option<LoadOutcome> {
        self.snapshots.get(entity).map(|o| o.value().clone())
    }

    /// Latest committed records for an entity
    #[must_use]
    pub fn items(&self, entity: &str) -> Option<Arc<Vec<Entity>>> {
        self.snapshots.get(entity).map(|o| Arc::clone(&o.items))
    }

    /// Every committed outcome, sorted by entity
    #[must_use]
    pub fn snapshots(&self) -> Vec<LoadOutcome> {
        let mut all: Vec<LoadOutcome> = self.snapshots.iter().map(|o| o.value().clone()).collect();
        all.sort_by(|a, b| a.entity.cmp(&b.entity));
        all
    }

    fn cacheable(&self, stage: Stage) -> bool {
        !self.settings.unique_mode && matches!(stage, Stage::Remote | Stage::Generated)
    }

    fn settle(&self, entity: &str) {
        if self.gate.is_ready() {
            return;
        }
        let tracked = &self.settings.tracked_entities;
        if tracked.iter().any(|t| t == entity) {
            self.settled.insert(entity.to_string());
        }
        if tracked.iter().all(|t| self.settled.contains(t)) {
            self.gate.mark_ready();
        }
    }

    fn commit(&self, outcome: &LoadOutcome) -> bool {
        // Holding the read guard keeps `set_current_seed` out until the insert lands.
        let current = self.current.read();
        if *current != outcome.seed {
            tracing::debug!(
                entity = %outcome.entity,
                seed = %outcome.seed,
                current = %*current,
                "load superseded, not committing"
            );
            return false;
        }
        self.snapshots.insert(outcome.entity.clone(), outcome.clone());
        true
    }

    async fn resolve(&self, entity: &str, seed: Seed) -> (Stage, Arc<Vec<Entity>>) {
        if seed.is_canonical() {
            let items = self.catalog.dataset(entity);
            if items.is_empty() {
                tracing::warn!(entity, "no bundled dataset for entity");
            }
            return (Stage::Bundled, items);
        }

        if !self.settings.unique_mode {
            if let Some(entry) = self.cache.get(entity, seed).await {
                return (Stage::Cached, Arc::new(entry.payload.clone()));
            }
        }

        let schema = self.schemas.schema(entity);

        if self.settings.remote_enabled {
            match self.fetch_remote(entity, seed).await {
                Ok(items) => {
                    let items = schema.normalize(items, seed, Some(self.settings.limit));
                    if !items.is_empty() {
                        return (Stage::Remote, Arc::new(items));
                    }
                    log_fallback(entity, seed, Stage::Remote, &StageFailure::Empty);
                }
                Err(failure) => log_fallback(entity, seed, Stage::Remote, &failure),
            }
        }

        if self.settings.ai_enabled {
            match self.fetch_generated(entity).await {
                Ok(items) => {
                    let items = schema.normalize(items, seed, None);
                    if !items.is_empty() {
                        return (Stage::Generated, Arc::new(items));
                    }
                    log_fallback(entity, seed, Stage::Generated, &StageFailure::Empty);
                }
                Err(failure) => log_fallback(entity, seed, Stage::Generated, &failure),
            }
        }

        let generated = self
            .generator
            .generate(entity, seed, self.settings.generation_count);
        (Stage::Local, Arc::new(schema.normalize(generated, seed, None)))
    }

    async fn fetch_remote(&self, entity: &str, seed: Seed) -> Result<Vec<Entity>, StageFailure> {
        let Some(source) = &self.remote else {
            return Err(SourceError::unavailable("no dataset source configured").into());
        };
        let request = DatasetRequest {
            project_key: self.settings.project_key.clone(),
            entity_type: entity.to_string(),
            seed_value: seed.as_u32(),
            limit: self.settings.limit,
            method: self.settings.method,
            filter_key: self.settings.filter_key.clone(),
        };
        non_empty(bounded(self.settings.fetch_timeout, source.fetch(&request)).await?)
    }

    async fn fetch_generated(&self, entity: &str) -> Result<Vec<Entity>, StageFailure> {
        let Some(source) = &self.generation else {
            return Err(SourceError::unavailable("no generation source configured").into());
        };
        let request = GenerationRequest {
            project_key: self.settings.project_key.clone(),
            entity_type: entity.to_string(),
            count: self.settings.generation_count,
        };
        non_empty(bounded(self.settings.generation_timeout, source.generate(&request)).await?)
    }

}

fn non_empty(items: Vec<Entity>) -> Result<Vec<Entity>, StageFailure> {
    if items.is_empty() {
        Err(StageFailure::Empty)
    } else {
        Ok(items)
    }
}

fn log_fallback(entity: &str, seed: Seed, stage: Stage, failure: &StageFailure) {
    tracing::warn!(entity, %seed, %stage, %failure, "stage produced nothing usable, falling back");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MockDatasetSource, MockGenerationSource};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn seed(v: u32) -> Seed {
        Seed::new(v).unwrap()
    }

    fn settings() -> ChainSettings {
        ChainSettings::new("market")
            .with_timeouts(Duration::from_millis(100), Duration::from_millis(100))
            .with_tracked(["jobs", "hotels"])
    }

    fn remote_items(n: usize) -> Vec<Entity> {
        (0..n).map(|i| json!({"title": format!("Role {i}")})).collect()
    }

    struct SlowSource(Duration);

    /// Delay depends on the requested seed
    struct SeedPacedSource;

    #[async_trait]
    impl DatasetSource for SeedPacedSource {
        async fn fetch(&self, request: &DatasetRequest) -> Result<Vec<Entity>, SourceError> {
            let delay = if request.seed_value == 42 { 80 } else { 5 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(remote_items(2))
        }
    }

    /// Fails the first fetch, then recovers
    #[derive(Default)]
    struct RecoveringSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DatasetSource for RecoveringSource {
        async fn fetch(&self, _request: &DatasetRequest) -> Result<Vec<Entity>, SourceError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(SourceError::unavailable("warming up"))
            } else {
                Ok(remote_items(4))
            }
        }
    }

    #[async_trait]
    impl DatasetSource for SlowSource {
        async fn fetch(&self, _request: &DatasetRequest) -> Result<Vec<Entity>, SourceError> {
            tokio::time::sleep(self.0).await;
            Ok(remote_items(3))
        }
    }

    #[tokio::test]
    async fn canonical_seed_returns_bundled_data_without_io() {
        let mut remote = MockDatasetSource::new();
        remote.expect_fetch().never();
        let chain = DataProvisioningChain::new(settings().with_remote(true))
            .with_remote(Arc::new(remote));

        let outcome = chain.load("jobs", Seed::CANONICAL).await;
        assert_eq!(outcome.stage, Stage::Bundled);
        assert_eq!(*outcome.items, *BundledCatalog::builtin().dataset("jobs"));
        assert!(outcome.committed);
    }

    #[tokio::test]
    async fn remote_results_are_normalized_and_cached() {
        let mut remote = MockDatasetSource::new();
        remote
            .expect_fetch()
            .withf(|req| req.seed_value == 42 && req.entity_type == "jobs" && req.limit == 50)
            .times(1)
            .returning(|_| Ok(remote_items(60)));
        let chain = DataProvisioningChain::new(settings().with_remote(true))
            .with_remote(Arc::new(remote));

        let first = chain.load("jobs", seed(42)).await;
        assert_eq!(first.stage, Stage::Remote);
        assert_eq!(first.items.len(), 50);
        assert_eq!(first.items[0]["company"], json!("Unknown company"));
        assert_eq!(first.items[0]["id"], json!("jobs-42-0"));

        let second = chain.load("jobs", seed(42)).await;
        assert_eq!(second.stage, Stage::Cached);
        assert_eq!(second.items, first.items);
    }

    #[tokio::test]
    async fn unique_mode_bypasses_cache() {
        let mut remote = MockDatasetSource::new();
        remote.expect_fetch().times(2).returning(|_| Ok(remote_items(2)));
        let chain = DataProvisioningChain::new(settings().with_remote(true).with_unique(true))
            .with_remote(Arc::new(remote));

        assert_eq!(chain.load("jobs", seed(42)).await.stage, Stage::Remote);
        assert_eq!(chain.load("jobs", seed(42)).await.stage, Stage::Remote);
        assert_eq!(chain.cache().front_entry_count(), 0);
    }

    #[tokio::test]
    async fn empty_remote_falls_through_to_generation() {
        let mut remote = MockDatasetSource::new();
        remote.expect_fetch().returning(|_| Ok(Vec::new()));
        let mut generation = MockGenerationSource::new();
        generation
            .expect_generate()
            .withf(|req| req.count == 20 && req.project_key == "market")
            .returning(|_| Ok(vec![json!({"title": "Generated"})]));
        let chain = DataProvisioningChain::new(settings().with_remote(true).with_ai(true))
            .with_remote(Arc::new(remote))
            .with_generation(Arc::new(generation));

        let outcome = chain.load("jobs", seed(42)).await;
        assert_eq!(outcome.stage, Stage::Generated);
        assert_eq!(outcome.items[0]["title"], json!("Generated"));
    }

    #[tokio::test]
    async fn failures_end_in_local_generation() {
        let mut remote = MockDatasetSource::new();
        remote
            .expect_fetch()
            .returning(|_| Err(SourceError::unavailable("down")));
        let mut generation = MockGenerationSource::new();
        generation
            .expect_generate()
            .returning(|_| Err(SourceError::decode("garbage")));
        let chain = DataProvisioningChain::new(settings().with_remote(true).with_ai(true).with_unique(true))
            .with_remote(Arc::new(remote))
            .with_generation(Arc::new(generation));

        let a = chain.load("jobs", seed(42)).await;
        let b = chain.load("jobs", seed(42)).await;
        assert_eq!(a.stage, Stage::Local);
        assert_eq!(
            serde_json::to_string(&*a.items).unwrap(),
            serde_json::to_string(&*b.items).unwrap()
        );
        assert_eq!(*a.items, LocalGenerator::default().generate("jobs", seed(42), 20));
    }

    #[tokio::test]
    async fn enabled_stage_without_source_is_skipped() {
        let chain = DataProvisioningChain::new(settings().with_remote(true).with_ai(true));
        assert_eq!(chain.load("jobs", seed(9)).await.stage, Stage::Local);
    }

    #[tokio::test]
    async fn slow_source_times_out() {
        let chain = DataProvisioningChain::new(settings().with_remote(true))
            .with_remote(Arc::new(SlowSource(Duration::from_secs(30))));
        let outcome = tokio::time::timeout(Duration::from_secs(5), chain.load("jobs", seed(42)))
            .await
            .expect("chain must not hang");
        assert_eq!(outcome.stage, Stage::Local);
    }

    #[tokio::test]
    async fn superseded_load_is_not_committed() {
        let chain = DataProvisioningChain::new(
            settings()
                .with_remote(true)
                .with_timeouts(Duration::from_secs(5), Duration::from_secs(5)),
        )
        .with_remote(Arc::new(SlowSource(Duration::from_millis(50))));

        let (stale, ()) = tokio::join!(chain.load("jobs", seed(42)), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            chain.set_current_seed(seed(7));
        });

        assert_eq!(stale.stage, Stage::Remote);
        assert!(!stale.committed);
        assert!(chain.snapshot("jobs").is_none());
    }

    #[tokio::test]
    async fn load_all_opens_gate_when_everything_fails() {
        let mut remote = MockDatasetSource::new();
        remote
            .expect_fetch()
            .returning(|_| Err(SourceError::Timeout(1)));
        let chain = DataProvisioningChain::new(settings().with_remote(true))
            .with_remote(Arc::new(remote));

        assert!(!chain.gate().is_ready());
        let outcomes = chain.load_all(seed(42)).await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.stage == Stage::Local && o.committed));

        tokio::time::timeout(Duration::from_secs(1), chain.when_ready())
            .await
            .expect("gate opens");
        assert_eq!(
            chain.snapshots().iter().map(|o| o.entity.as_str()).collect::<Vec<_>>(),
            vec!["hotels", "jobs"]
        );
    }

    #[tokio::test]
    async fn individual_initializes_open_gate_once_all_tracked_settle() {
        let chain = DataProvisioningChain::new(settings());

        chain.initialize("jobs", seed(42)).await;
        assert!(!chain.gate().is_ready());
        chain.initialize("products", seed(42)).await;
        assert!(!chain.gate().is_ready());

        let (_, _, ()) = tokio::join!(
            chain.initialize("hotels", seed(42)),
            chain.initialize("jobs", seed(42)),
            async {
                tokio::time::timeout(Duration::from_millis(500), chain.when_ready())
                    .await
                    .expect("gate opens after every tracked entity settled");
            }
        );
        assert!(chain.gate().is_ready());
    }

    #[tokio::test]
    async fn untracked_chain_opens_gate_on_first_load() {
        let chain = DataProvisioningChain::new(settings().with_tracked(Vec::<String>::new()));
        assert!(!chain.gate().is_ready());
        chain.initialize("emails", seed(3)).await;
        tokio::time::timeout(Duration::from_millis(500), chain.when_ready())
            .await
            .expect("gate opens");
    }

    #[tokio::test]
    async fn superseded_load_does_not_touch_cache() {
        let chain = DataProvisioningChain::new(
            settings()
                .with_remote(true)
                .with_timeouts(Duration::from_secs(5), Duration::from_secs(5)),
        )
        .with_remote(Arc::new(SeedPacedSource));

        let (stale, fresh) = tokio::join!(chain.load("jobs", seed(42)), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            chain.load("jobs", seed(7)).await
        });

        assert!(!stale.committed);
        assert!(fresh.committed);
        assert_eq!(chain.snapshot("jobs").map(|o| o.seed), Some(seed(7)));
        assert!(chain.cache().get("jobs", seed(7)).await.is_some());
        assert!(chain.cache().get("jobs", seed(42)).await.is_none());
        assert_eq!(chain.load("jobs", seed(7)).await.stage, Stage::Cached);
    }

    #[tokio::test]
    async fn local_fallback_is_not_cached() {
        let source = Arc::new(RecoveringSource::default());
        let chain = DataProvisioningChain::new(settings().with_remote(true))
            .with_remote(Arc::clone(&source) as Arc<dyn DatasetSource>);

        let first = chain.load("jobs", seed(42)).await;
        assert_eq!(first.stage, Stage::Local);
        assert!(chain.cache().get("jobs", seed(42)).await.is_none());

        let second = chain.load("jobs", seed(42)).await;
        assert_eq!(second.stage, Stage::Remote);
        assert_eq!(second.items[0]["title"], json!("Role 0"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        assert_eq!(chain.load("jobs", seed(42)).await.stage, Stage::Cached);
    }
}
