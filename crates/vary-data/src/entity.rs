//! Entity records and their canonical shapes
//!
//! Entities are JSON objects. Each entity type has an [`EntitySchema`] with
//! ordered default fields; normalization fills missing fields, synthesizes
//! ids and truncates to a limit.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use vary_seed::Seed;

/// One entity record (a JSON object)
pub type Entity = Value;

/// Default id field
pub const ID_FIELD: &str = "id";

/// Canonical shape of one entity type
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    entity: String,
    id_field: String,
    defaults: IndexMap<String, Value>,
}

impl EntitySchema {
    /// Schema with only an id field
    #[must_use]
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            id_field: ID_FIELD.to_string(),
            defaults: IndexMap::new(),
        }
    }

    /// Add a default field value
    #[must_use]
    pub fn with_default(mut self, field: impl Into<String>, value: Value) -> Self {
        self.defaults.insert(field.into(), value);
        self
    }

    /// Use another field as the id
    #[must_use]
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Entity type name
    #[inline]
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Default fields in declaration order
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.defaults.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Synthesized id for the `n`-th record of a seed
    #[must_use]
    pub fn synthesize_id(&self, seed: Seed, n: usize) -> String {
        format!("{}-{seed}-{n}", self.entity)
    }

    /// Normalize one record; non-objects are unusable and dropped
    #[must_use]
    pub fn normalize_one(&self, item: Entity, seed: Seed, n: usize) -> Option<Entity> {
        let Value::Object(mut fields) = item else {
            return None;
        };
        let missing_id = fields
            .get(&self.id_field)
            .map_or(true, |id| id.is_null() || id.as_str() == Some(""));
        if missing_id {
            fields.insert(self.id_field.clone(), Value::String(self.synthesize_id(seed, n)));
        }
        for (field, default) in &self.defaults {
            match fields.get(field) {
                Some(v) if !v.is_null() => {}
                _ => {
                    fields.insert(field.clone(), default.clone());
                }
            }
        }
        Some(Value::Object(fields))
    }

    /// Normalize a batch, keeping at most `limit` usable records
    #[must_use]
    pub fn normalize(&self, items: Vec<Entity>, seed: Seed, limit: Option<usize>) -> Vec<Entity> {
        let limit = limit.unwrap_or(usize::MAX);
        let before = items.len();
        let normalized: Vec<Entity> = items
            .into_iter()
            .filter(Value::is_object)
            .take(limit)
            .enumerate()
            .filter_map(|(n, item)| self.normalize_one(item, seed, n))
            .collect();
        if normalized.len() < before.min(limit) {
            tracing::debug!(
                entity = %self.entity,
                dropped = before.min(limit) - normalized.len(),
                "dropped non-object records"
            );
        }
        normalized
    }
}

/// Schemas by entity type; unknown types get an id-only schema
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, EntitySchema>,
}

impl SchemaRegistry {
    /// Empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema
    #[must_use]
    pub fn with_schema(mut self, schema: EntitySchema) -> Self {
        self.schemas.insert(schema.entity.clone(), schema);
        self
    }

    /// Schema for an entity type
    #[must_use]
    pub fn schema(&self, entity: &str) -> EntitySchema {
        self.schemas
            .get(entity)
            .cloned()
            .unwrap_or_else(|| EntitySchema::new(entity))
    }

    /// Whether a schema is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: &str) -> bool {
        self.schemas.contains_key(entity)
    }

    /// Schemas for the built-in demo entities
    #[must_use]
    pub fn builtin() -> Self {
        Self::new()
            .with_schema(
                EntitySchema::new("jobs")
                    .with_default("title", json!("Untitled role"))
                    .with_default("company", json!("Unknown company"))
                    .with_default("location", json!("Remote"))
                    .with_default("salary", json!(0))
                    .with_default("type", json!("full-time"))
                    .with_default("tags", json!([]))
                    .with_default("featured", json!(false)),
            )
            .with_schema(
                EntitySchema::new("hotels")
                    .with_default("name", json!("Unnamed stay"))
                    .with_default("city", json!("Unknown"))
                    .with_default("price", json!(0))
                    .with_default("rating", json!(0))
                    .with_default("amenities", json!([]))
                    .with_default("available", json!(true)),
            )
            .with_schema(
                EntitySchema::new("products")
                    .with_default("name", json!("Unnamed product"))
                    .with_default("category", json!("general"))
                    .with_default("price", json!(0))
                    .with_default("stock", json!(0))
                    .with_default("rating", json!(0)),
            )
            .with_schema(
                EntitySchema::new("emails")
                    .with_default("from", json!("unknown@example.com"))
                    .with_default("subject", json!("(no subject)"))
                    .with_default("body", json!(""))
                    .with_default("read", json!(false))
                    .with_default("labels", json!([])),
            )
    }
}

/// Borrow a record's fields
#[must_use]
pub fn fields(entity: &Entity) -> Option<&Map<String, Value>> {
    entity.as_object()
}
