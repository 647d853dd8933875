//! Testing utilities for the vary workspace
//!
//! Stub sources, fixtures and session setup shared by integration tests.

#![allow(missing_docs)]

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use vary_core::{DatasetConfig, FeatureFlags, GenerationConfig, VariationConfig, VariationSession};
use vary_data::{
    DatasetRequest, DatasetSource, Entity, GenerationRequest, GenerationSource, MemoryStore,
    SourceError,
};
use vary_present::ElementNode;
use vary_seed::Seed;

pub fn seed(value: u32) -> Seed {
    Seed::new(value).unwrap()
}

/// Records carrying only a title, so normalization has defaults to fill
pub fn partial_records(entity: &str, count: usize) -> Vec<Entity> {
    (0..count)
        .map(|i| json!({"title": format!("{entity} {i}")}))
        .collect()
}

#[derive(Debug, Default)]
pub struct FailingDatasetSource;

#[async_trait]
impl DatasetSource for FailingDatasetSource {
    async fn fetch(&self, _request: &DatasetRequest) -> Result<Vec<Entity>, SourceError> {
        Err(SourceError::Status {
            status: 503,
            url: "http://stub/datasets".to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct EmptyDatasetSource;

#[async_trait]
impl DatasetSource for EmptyDatasetSource {
    async fn fetch(&self, _request: &DatasetRequest) -> Result<Vec<Entity>, SourceError> {
        Ok(Vec::new())
    }
}

#[derive(Debug)]
pub struct FixedDatasetSource {
    pub count: usize,
}

#[async_trait]
impl DatasetSource for FixedDatasetSource {
    async fn fetch(&self, request: &DatasetRequest) -> Result<Vec<Entity>, SourceError> {
        Ok(partial_records(&request.entity_type, self.count))
    }
}

#[derive(Debug)]
pub struct SlowDatasetSource {
    pub delay: Duration,
}

#[async_trait]
impl DatasetSource for SlowDatasetSource {
    async fn fetch(&self, request: &DatasetRequest) -> Result<Vec<Entity>, SourceError> {
        tokio::time::sleep(self.delay).await;
        Ok(partial_records(&request.entity_type, 3))
    }
}

/// Wraps a source and counts calls
#[derive(Debug)]
pub struct CountingDatasetSource<S> {
    inner: S,
    calls: Arc<AtomicUsize>,
}

impl<S> CountingDatasetSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl<S: DatasetSource> DatasetSource for CountingDatasetSource<S> {
    async fn fetch(&self, request: &DatasetRequest) -> Result<Vec<Entity>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(request).await
    }
}

#[derive(Debug, Default)]
pub struct FailingGenerationSource;

#[async_trait]
impl GenerationSource for FailingGenerationSource {
    async fn generate(&self, _request: &GenerationRequest) -> Result<Vec<Entity>, SourceError> {
        Err(SourceError::Timeout(1))
    }
}

#[derive(Debug, Default)]
pub struct FixedGenerationSource;

#[async_trait]
impl GenerationSource for FixedGenerationSource {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Entity>, SourceError> {
        Ok(partial_records(&request.entity_type, request.count))
    }
}

/// Landing page with a protected hero holding one exempt row
pub fn landing_tree() -> ElementNode {
    let leaves = |prefix: &str, n: usize| -> Vec<ElementNode> {
        (0..n).map(|i| ElementNode::new(format!("{prefix}-{i}"))).collect()
    };
    ElementNode::new("page").with_children([
        ElementNode::new("nav").with_children(leaves("link", 5)),
        ElementNode::new("hero").protected().with_children([
            ElementNode::new("headline"),
            ElementNode::new("actions").exempt().with_children(leaves("action", 3)),
            ElementNode::new("stats").with_children(leaves("stat", 4)),
        ]),
        ElementNode::new("cards").with_children(leaves("card", 8)),
        ElementNode::new("footer").with_children(leaves("col", 3)),
    ])
}

pub fn test_config() -> VariationConfig {
    VariationConfig::new("test")
        .with_tracked(["jobs", "hotels"])
        .with_dataset(DatasetConfig {
            fetch_timeout_ms: 200,
            ..DatasetConfig::default()
        })
        .with_generation(GenerationConfig {
            timeout_ms: 200,
            ..GenerationConfig::default()
        })
}

pub fn flags(remote_mode: bool, ai_generate: bool, unique_mode: bool) -> FeatureFlags {
    FeatureFlags {
        structural_variation: true,
        remote_mode,
        ai_generate,
        unique_mode,
    }
}

/// Session with an in-memory store and the given sources
pub fn setup_test_session(
    config: VariationConfig,
    remote: Arc<dyn DatasetSource>,
    generation: Arc<dyn GenerationSource>,
) -> VariationSession {
    VariationSession::builder(config)
        .with_store(Arc::new(MemoryStore::new()))
        .with_remote(remote)
        .with_generation(generation)
        .build()
        .unwrap()
}

/// Session over bundled data only
pub fn setup_offline_session(config: VariationConfig) -> VariationSession {
    VariationSession::builder(config)
        .with_store(Arc::new(MemoryStore::new()))
        .build()
        .unwrap()
}
