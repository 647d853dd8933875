//! Static datasets shipped with the application
//!
//! The bundled catalog is the unconditional answer for the canonical seed
//! and the last resort when every other stage fails.

use crate::entity::Entity;
use once_cell::sync::Lazy;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

static BUILTIN: Lazy<Arc<BundledCatalog>> = Lazy::new(|| {
    Arc::new(
        BundledCatalog::new()
            .with_dataset(
                "jobs",
                vec![
                    json!({"id": "job-1", "title": "Frontend Engineer", "company": "Brightline", "location": "Berlin", "salary": 72000, "type": "full-time", "tags": ["react", "css"], "featured": true}),
                    json!({"id": "job-2", "title": "Data Analyst", "company": "Northwind", "location": "Remote", "salary": 64000, "type": "full-time", "tags": ["sql"], "featured": false}),
                    json!({"id": "job-3", "title": "Product Designer", "company": "Kitestring", "location": "Lisbon", "salary": 58000, "type": "contract", "tags": ["figma"], "featured": false}),
                    json!({"id": "job-4", "title": "Site Reliability Engineer", "company": "Harbor Labs", "location": "Dublin", "salary": 91000, "type": "full-time", "tags": ["linux", "k8s"], "featured": true}),
                    json!({"id": "job-5", "title": "Support Specialist", "company": "Northwind", "location": "Remote", "salary": 41000, "type": "part-time", "tags": ["zendesk"], "featured": false}),
                    json!({"id": "job-6", "title": "Backend Engineer", "company": "Quarry", "location": "Madrid", "salary": 78000, "type": "full-time", "tags": ["rust", "postgres"], "featured": false}),
                    json!({"id": "job-7", "title": "Marketing Lead", "company": "Brightline", "location": "Paris", "salary": 69000, "type": "full-time", "tags": ["seo"], "featured": false}),
                    json!({"id": "job-8", "title": "QA Engineer", "company": "Harbor Labs", "location": "Remote", "salary": 55000, "type": "contract", "tags": ["playwright"], "featured": false}),
                ],
            )
            .with_dataset(
                "hotels",
                vec![
                    json!({"id": "hotel-1", "name": "Harbor View", "city": "Lisbon", "price": 140, "rating": 4.6, "amenities": ["wifi", "pool"], "available": true}),
                    json!({"id": "hotel-2", "name": "The Linden", "city": "Berlin", "price": 115, "rating": 4.2, "amenities": ["wifi"], "available": true}),
                    json!({"id": "hotel-3", "name": "Casa Alta", "city": "Madrid", "price": 98, "rating": 4.0, "amenities": ["breakfast"], "available": false}),
                    json!({"id": "hotel-4", "name": "Pier Nine", "city": "Dublin", "price": 172, "rating": 4.8, "amenities": ["wifi", "gym", "spa"], "available": true}),
                    json!({"id": "hotel-5", "name": "Rue Verte", "city": "Paris", "price": 210, "rating": 4.4, "amenities": ["wifi", "bar"], "available": true}),
                    json!({"id": "hotel-6", "name": "Old Mill Inn", "city": "Lisbon", "price": 85, "rating": 3.9, "amenities": [], "available": true}),
                ],
            )
            .with_dataset(
                "products",
                vec![
                    json!({"id": "product-1", "name": "Trail Backpack", "category": "outdoor", "price": 89.0, "stock": 14, "rating": 4.5}),
                    json!({"id": "product-2", "name": "Ceramic Mug", "category": "kitchen", "price": 12.5, "stock": 120, "rating": 4.1}),
                    json!({"id": "product-3", "name": "Desk Lamp", "category": "home", "price": 39.9, "stock": 32, "rating": 4.3}),
                    json!({"id": "product-4", "name": "Running Shoes", "category": "outdoor", "price": 110.0, "stock": 8, "rating": 4.7}),
                    json!({"id": "product-5", "name": "Chef Knife", "category": "kitchen", "price": 64.0, "stock": 21, "rating": 4.8}),
                    json!({"id": "product-6", "name": "Wool Throw", "category": "home", "price": 49.0, "stock": 0, "rating": 4.0}),
                ],
            )
            .with_dataset(
                "emails",
                vec![
                    json!({"id": "email-1", "from": "ana@example.com", "subject": "Quarterly plan", "body": "Draft attached.", "read": false, "labels": ["work"]}),
                    json!({"id": "email-2", "from": "billing@example.com", "subject": "Your invoice", "body": "Invoice #2231 is ready.", "read": true, "labels": ["billing"]}),
                    json!({"id": "email-3", "from": "sam@example.com", "subject": "Lunch?", "body": "Thursday works for me.", "read": false, "labels": []}),
                    json!({"id": "email-4", "from": "noreply@example.com", "subject": "Password changed", "body": "If this wasn't you, reset it.", "read": true, "labels": ["security"]}),
                    json!({"id": "email-5", "from": "lee@example.com", "subject": "Re: venue", "body": "Booked the hall.", "read": false, "labels": ["events"]}),
                ],
            ),
    )
});

/// Static entity arrays by type
#[derive(Debug, Clone, Default)]
pub struct BundledCatalog {
    datasets: HashMap<String, Arc<Vec<Entity>>>,
}

impl BundledCatalog {
    /// Empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a dataset
    #[must_use]
    pub fn with_dataset(mut self, entity: impl Into<String>, items: Vec<Entity>) -> Self {
        self.datasets.insert(entity.into(), Arc::new(items));
        self
    }

    /// Dataset for an entity type; unknown types are empty
    #[must_use]
    pub fn dataset(&self, entity: &str) -> Arc<Vec<Entity>> {
        self.datasets.get(entity).cloned().unwrap_or_default()
    }

    /// Whether a dataset exists
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: &str) -> bool {
        self.datasets.contains_key(entity)
    }

    /// Entity types with datasets, sorted
    #[must_use]
    pub fn entities(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.datasets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Demo datasets compiled into the binary
    #[must_use]
    pub fn builtin() -> Arc<BundledCatalog> {
        Arc::clone(&BUILTIN)
    }
}
