//! In-process dataset service over bundled data
//!
//! Implements the [`DatasetSource`] contract locally so deployments without
//! a dataset backend still get seeded slices from the remote stage.

use crate::bundled::BundledCatalog;
use crate::entity::Entity;
use crate::error::SourceError;
use crate::source::{DatasetMethod, DatasetRequest, DatasetSource};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use vary_seed::{Seed, VariantSelector};

/// Seeded slices of the bundled catalog
#[derive(Debug, Clone)]
pub struct LocalDatasetService {
    catalog: Arc<BundledCatalog>,
    selector: VariantSelector,
}

impl LocalDatasetService {
    /// Create service over a catalog
    #[inline]
    #[must_use]
    pub fn new(catalog: Arc<BundledCatalog>) -> Self {
        Self {
            catalog,
            selector: VariantSelector::default(),
        }
    }

    /// Use a specific selector profile
    #[inline]
    #[must_use]
    pub fn with_selector(mut self, selector: VariantSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Compute the slice for a request
    ///
    /// # Errors
    /// Returns [`SourceError::Unavailable`] for entity types the catalog lacks.
    pub fn slice(&self, request: &DatasetRequest) -> Result<Vec<Entity>, SourceError> {
        if !self.catalog.contains(&request.entity_type) {
            return Err(SourceError::unavailable(format!(
                "no dataset for {}",
                request.entity_type
            )));
        }
        let items = self.catalog.dataset(&request.entity_type);
        let seed = Seed::new(request.seed_value).unwrap_or(Seed::CANONICAL);
        let context = format!("dataset:{}", request.entity_type);

        let mut out = match (request.method, request.filter_key.as_deref()) {
            (DatasetMethod::Select, _) => window(&items, seed),
            (DatasetMethod::Shuffle, _) | (DatasetMethod::Distribute, None) => {
                self.selector.shuffle(&items, seed, &context)
            }
            (DatasetMethod::Distribute, Some(key)) => self.distribute(&items, seed, &context, key),
        };
        out.truncate(request.limit);
        Ok(out)
    }

    /// Round-robin over the groups of `key`, each group shuffled
    fn distribute(&self, items: &[Entity], seed: Seed, context: &str, key: &str) -> Vec<Entity> {
        let mut groups: IndexMap<String, Vec<Entity>> = IndexMap::new();
        for item in items {
            let bucket = match item.get(key) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            groups.entry(bucket).or_default().push(item.clone());
        }

        let mut queues: Vec<std::vec::IntoIter<Entity>> = groups
            .iter()
            .map(|(bucket, members)| {
                self.selector
                    .shuffle(members, seed, &format!("{context}:{bucket}"))
                    .into_iter()
            })
            .collect();

        let mut out = Vec::with_capacity(items.len());
        while out.len() < items.len() {
            for queue in &mut queues {
                if let Some(item) = queue.next() {
                    out.push(item);
                }
            }
        }
        out
    }
}

/// Contiguous wrap-around window starting at the seed offset
fn window(items: &[Entity], seed: Seed) -> Vec<Entity> {
    if items.is_empty() {
        return Vec::new();
    }
    let start = seed.offset(items.len());
    items[start..].iter().chain(&items[..start]).cloned().collect()
}

#[async_trait]
impl DatasetSource for LocalDatasetService {
    async fn fetch(&self, request: &DatasetRequest) -> Result<Vec<Entity>, SourceError> {
        self.slice(request)
    }
}
