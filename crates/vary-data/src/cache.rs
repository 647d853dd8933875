//! Generated-data cache
//!
//! Two tiers:
//! - a `moka` front cache holding verified entries in memory
//! - a [`PersistentStore`] holding serialized [`CacheEntry`] values
//!
//! Every entry records the seed it was generated for and a BLAKE3 checksum
//! of its payload. Wrong seed, bad checksum or unparseable data all read as
//! a miss; nothing here fails a load.

use crate::entity::Entity;
use crate::error::StoreError;
use crate::store::PersistentStore;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vary_seed::Seed;

/// Cache format version, part of every key
pub const CACHE_VERSION: &str = "v1";

/// Store key for one entity type of one project
#[must_use]
pub fn cache_key(project_key: &str, entity: &str) -> String {
    format!("{project_key}_generated_{entity}_{CACHE_VERSION}")
}

/// Hex BLAKE3 checksum of a payload's JSON encoding
#[must_use]
pub fn payload_checksum(payload: &[Entity]) -> String {
    // Serializing `Value`s cannot fail.
    let bytes = serde_json::to_vec(payload).unwrap_or_default();
    hex::encode(blake3::hash(&bytes).as_bytes())
}

/// One persisted generation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Store key
    pub key: String,
    /// Seed the payload belongs to
    pub seed: Seed,
    /// Normalized records
    pub payload: Vec<Entity>,
    /// Write time
    pub written_at: DateTime<Utc>,
    /// Hex BLAKE3 of `payload`
    pub checksum: String,
}

impl CacheEntry {
    /// Create entry stamped now
    #[must_use]
    pub fn new(key: impl Into<String>, seed: Seed, payload: Vec<Entity>) -> Self {
        let checksum = payload_checksum(&payload);
        Self {
            key: key.into(),
            seed,
            payload,
            written_at: Utc::now(),
            checksum,
        }
    }

    /// Check the payload against its checksum
    ///
    /// # Errors
    /// Returns [`StoreError::ChecksumMismatch`] if the payload was altered.
    pub fn verify(&self) -> Result<(), StoreError> {
        if payload_checksum(&self.payload) == self.checksum {
            Ok(())
        } else {
            Err(StoreError::ChecksumMismatch {
                key: self.key.clone(),
            })
        }
    }

    /// Parse and verify a stored value
    ///
    /// # Errors
    /// Returns [`StoreError::Corrupt`] or [`StoreError::ChecksumMismatch`].
    pub fn decode(key: &str, raw: &str) -> Result<Self, StoreError> {
        let entry: Self = serde_json::from_str(raw).map_err(|e| StoreError::corrupt(key, e))?;
        entry.verify()?;
        Ok(entry)
    }

    /// Serialized form
    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Generated-data cache for one project
#[derive(Clone)]
pub struct GeneratedCache {
    project_key: String,
    store: Arc<dyn PersistentStore>,
    front: Cache<String, Arc<CacheEntry>>,
}

impl std::fmt::Debug for GeneratedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedCache")
            .field("project_key", &self.project_key)
            .field("front_entries", &self.front.entry_count())
            .finish_non_exhaustive()
    }
}

impl GeneratedCache {
    /// Create cache over a store
    #[must_use]
    pub fn new(project_key: impl Into<String>, store: Arc<dyn PersistentStore>) -> Self {
        Self {
            project_key: project_key.into(),
            store,
            front: Cache::new(1_000),
        }
    }

    /// Store key for an entity type
    #[inline]
    #[must_use]
    pub fn key_for(&self, entity: &str) -> String {
        cache_key(&self.project_key, entity)
    }

    /// Cached records for `(entity, seed)`, `None` on any kind of miss
    pub async fn get(&self, entity: &str, seed: Seed) -> Option<Arc<CacheEntry>> {
        let key = self.key_for(entity);

        if let Some(entry) = self.front.get(&key).await {
            if entry.seed == seed {
                tracing::debug!(entity, %seed, "front cache hit");
                return Some(entry);
            }
        }

        let raw = match self.store.read(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(entity, %err, "cache read failed, treating as miss");
                return None;
            }
        };

        let entry = match CacheEntry::decode(&key, &raw) {
            Ok(entry) => Arc::new(entry),
            Err(err) => {
                tracing::warn!(entity, %err, "discarding unreadable cache entry");
                return None;
            }
        };

        if entry.seed != seed {
            tracing::debug!(entity, cached = %entry.seed, %seed, "cache entry belongs to another seed");
            return None;
        }

        self.front.insert(key, Arc::clone(&entry)).await;
        tracing::debug!(entity, %seed, "store cache hit");
        Some(entry)
    }

    /// Write records for `(entity, seed)`; returns whether the store accepted them
    pub async fn put(&self, entity: &str, seed: Seed, payload: Vec<Entity>) -> bool {
        let key = self.key_for(entity);
        let entry = Arc::new(CacheEntry::new(key.clone(), seed, payload));
        let written = match self.store.write(&key, entry.encode()).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(entity, %err, "cache write failed");
                false
            }
        };
        self.front.insert(key, entry).await;
        written
    }

    /// Drop an entity's entry from both tiers
    pub async fn invalidate(&self, entity: &str) {
        let key = self.key_for(entity);
        self.front.invalidate(&key).await;
        if let Err(err) = self.store.remove(&key).await {
            tracing::warn!(entity, %err, "cache remove failed");
        }
    }

    /// Entries held in memory
    #[inline]
    #[must_use]
    pub fn front_entry_count(&self) -> u64 {
        self.front.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn seed(v: u32) -> Seed {
        Seed::new(v).unwrap()
    }

    fn cache_with(store: Arc<MemoryStore>) -> GeneratedCache {
        GeneratedCache::new("market", store)
    }

    #[test]
    fn key_format() {
        assert_eq!(cache_key("market", "jobs"), "market_generated_jobs_v1");
    }

    #[tokio::test]
    async fn round_trip_through_store() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(Arc::clone(&store));
        assert!(cache.put("jobs", seed(42), vec![json!({"id": "a"})]).await);

        // fresh front tier, same store
        let reopened = cache_with(store);
        let entry = reopened.get("jobs", seed(42)).await.unwrap();
        assert_eq!(entry.payload, vec![json!({"id": "a"})]);
        assert_eq!(entry.key, "market_generated_jobs_v1");
    }

    #[tokio::test]
    async fn other_seed_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(Arc::clone(&store));
        cache.put("jobs", seed(42), vec![json!({"id": "a"})]).await;
        assert!(cache.get("jobs", seed(43)).await.is_none());
        assert!(cache_with(store).get("jobs", seed(43)).await.is_none());
    }

    #[tokio::test]
    async fn corrupt_entry_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        store.put_raw("market_generated_jobs_v1", "{not json");
        assert!(cache_with(store).get("jobs", seed(42)).await.is_none());
    }

    #[tokio::test]
    async fn tampered_payload_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        let mut entry = CacheEntry::new("market_generated_jobs_v1", seed(42), vec![json!({"id": "a"})]);
        entry.payload.push(json!({"id": "b"}));
        store.put_raw("market_generated_jobs_v1", entry.encode());
        assert!(cache_with(store).get("jobs", seed(42)).await.is_none());
    }

    #[tokio::test]
    async fn invalidate_clears_both_tiers() {
        let store = Arc::new(MemoryStore::new());
        let cache = cache_with(Arc::clone(&store));
        cache.put("jobs", seed(42), vec![json!({})]).await;
        cache.invalidate("jobs").await;
        assert!(cache.get("jobs", seed(42)).await.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn decode_reports_reason() {
        assert!(matches!(CacheEntry::decode("k", "[]"), Err(StoreError::Corrupt { .. })));
    }
}
