//! Seeded attribute names and sibling ordering
//!
//! Maps semantic element types ("search-input", "book-now-button") to
//! surface id/class strings drawn from fixed per-type candidate lists, and
//! reorders sibling collections without moving protected entries.

use crate::decoy::{build_decoys, DecoyPlan};
use crate::reorder::{plan_tree, ElementNode, ReorderPlan};
use crate::text::ContentVariantEngine;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use vary_seed::{Seed, VariantSelector};

static NON_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("identifier pattern compiles"));

/// Built-in id candidates; entry 0 is the original id
const DEFAULT_IDS: &[(&str, &[&str])] = &[
    ("search-input", &["search-input", "query-field", "find-box", "lookup-input", "term-entry", "search-query", "q-input", "keyword-field"]),
    ("search-button", &["search-button", "query-submit", "find-trigger", "lookup-go", "search-action", "run-search"]),
    ("book-now-button", &["book-now-button", "reserve-action", "booking-cta", "secure-spot", "reserve-trigger", "book-cta", "confirm-stay"]),
    ("nav-link", &["nav-link", "menu-item", "route-anchor", "nav-entry", "site-link", "primary-link"]),
    ("listing-card", &["listing-card", "item-tile", "result-panel", "offer-card", "entry-box", "catalog-cell", "record-card"]),
    ("filter-panel", &["filter-panel", "refine-box", "facet-area", "narrow-down", "criteria-pane"]),
    ("price-label", &["price-label", "cost-tag", "amount-text", "rate-value", "fare-chip", "price-tag"]),
    ("submit-button", &["submit-button", "send-form", "form-go", "commit-action", "confirm-submit", "apply-btn"]),
    ("login-form", &["login-form", "signin-panel", "auth-box", "access-form", "session-form"]),
    ("email-input", &["email-input", "mail-field", "address-entry", "contact-mail", "email-box"]),
    ("cart-button", &["cart-button", "basket-trigger", "bag-action", "add-item", "cart-cta", "purchase-add"]),
    ("modal-close", &["modal-close", "dialog-dismiss", "overlay-exit", "popup-close", "sheet-hide"]),
    ("pagination", &["pagination", "page-nav", "pager", "results-pages", "page-links"]),
    ("hero-title", &["hero-title", "banner-heading", "lead-title", "intro-head", "splash-title"]),
];

/// Built-in class candidates; entry 0 is the original class
const DEFAULT_CLASSES: &[(&str, &[&str])] = &[
    ("search-input", &["search-input", "input-search", "field-query", "txt-find", "control-lookup"]),
    ("search-button", &["btn-search", "button-query", "action-find", "trigger-lookup", "btn-go"]),
    ("book-now-button", &["btn-book", "button-reserve", "cta-booking", "action-reserve", "btn-primary-cta"]),
    ("nav-link", &["nav-link", "menu-link", "nav-anchor", "link-route", "nav-item-link"]),
    ("listing-card", &["card", "tile", "panel-item", "result-box", "entry-card", "grid-cell"]),
    ("filter-panel", &["filters", "refine", "facets", "criteria", "narrowing"]),
    ("price-label", &["price", "cost", "amount", "rate", "fare"]),
    ("submit-button", &["btn-submit", "button-send", "action-commit", "btn-confirm", "submit-control"]),
    ("cart-button", &["btn-cart", "button-basket", "action-bag", "cart-trigger", "btn-add"]),
];

/// Candidate lists per element type
#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    entries: HashMap<String, Vec<String>>,
}

impl AttributeTable {
    /// Empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn from_static(source: &[(&str, &[&str])]) -> Self {
        let entries = source
            .iter()
            .map(|(kind, candidates)| {
                (
                    (*kind).to_string(),
                    candidates.iter().map(|c| (*c).to_string()).collect(),
                )
            })
            .collect();
        Self { entries }
    }

    /// Built-in id candidates
    #[must_use]
    pub fn default_ids() -> Self {
        Self::from_static(DEFAULT_IDS)
    }

    /// Built-in class candidates
    #[must_use]
    pub fn default_classes() -> Self {
        Self::from_static(DEFAULT_CLASSES)
    }

    /// Register candidates for an element type; empty lists are ignored
    #[must_use]
    pub fn with_candidates<I, S>(mut self, element_type: &str, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<String> = candidates.into_iter().map(Into::into).collect();
        if !list.is_empty() {
            self.entries.insert(element_type.to_string(), list);
        }
        self
    }

    /// Candidates for an element type
    #[must_use]
    pub fn candidates(&self, element_type: &str) -> Option<&[String]> {
        self.entries.get(element_type).map(Vec::as_slice)
    }

    /// Registered element types
    pub fn element_types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Lower-case, hyphen-separated identifier for arbitrary input
#[must_use]
pub fn sanitize_identifier(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let replaced = NON_IDENT.replace_all(&lowered, "-");
    let trimmed = replaced.trim_matches('-');
    if trimmed.is_empty() {
        "element".to_string()
    } else if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("el-{trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// Seeded attribute names, sibling order and decoys
#[derive(Debug, Clone)]
pub struct AttributeObfuscationEngine {
    selector: VariantSelector,
    ids: AttributeTable,
    classes: AttributeTable,
    enabled: bool,
}

impl AttributeObfuscationEngine {
    /// Create engine with built-in candidate tables
    #[must_use]
    pub fn new(selector: VariantSelector) -> Self {
        Self {
            selector,
            ids: AttributeTable::default_ids(),
            classes: AttributeTable::default_classes(),
            enabled: true,
        }
    }

    /// Replace the id candidate table
    #[inline]
    #[must_use]
    pub fn with_ids(mut self, ids: AttributeTable) -> Self {
        self.ids = ids;
        self
    }

    /// Replace the class candidate table
    #[inline]
    #[must_use]
    pub fn with_classes(mut self, classes: AttributeTable) -> Self {
        self.classes = classes;
        self
    }

    /// Toggle structural variation; disabled engines emit canonical output
    #[inline]
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether variation applies to `seed`
    #[inline]
    #[must_use]
    pub fn varies(&self, seed: Seed) -> bool {
        self.enabled && !seed.is_canonical()
    }

    fn choose(&self, table: &AttributeTable, seed: Seed, element_type: &str) -> String {
        let Some(candidates) = table.candidates(element_type) else {
            return sanitize_identifier(element_type);
        };
        let chosen = if self.varies(seed) {
            self.selector.pick(seed, element_type, candidates)
        } else {
            candidates.first()
        };
        chosen.map_or_else(|| sanitize_identifier(element_type), Clone::clone)
    }

    /// Id for the `index`-th element of a semantic type
    ///
    /// The first element (`index == 0`) carries the bare name; later ones get
    /// a numeric suffix so ids stay unique on a page.
    #[must_use]
    pub fn id_for(&self, seed: Seed, element_type: &str, index: usize) -> String {
        let base = self.choose(&self.ids, seed, element_type);
        if index == 0 {
            base
        } else {
            format!("{base}-{index}")
        }
    }

    /// Class string for a semantic type
    #[must_use]
    pub fn class_for(&self, seed: Seed, element_type: &str) -> String {
        self.choose(&self.classes, seed, element_type)
    }

    /// Sibling order for `len` entries, keeping pinned positions in place
    ///
    /// `pinned[i] == true` fixes entry `i`; the remaining entries are shuffled
    /// among the remaining positions.
    #[must_use]
    pub fn order(&self, len: usize, seed: Seed, context_key: &str, pinned: &[bool]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..len).collect();
        if !self.varies(seed) {
            return order;
        }
        let free: Vec<usize> = (0..len)
            .filter(|i| !pinned.get(*i).copied().unwrap_or(false))
            .collect();
        let perm = self.selector.permutation(free.len(), seed, context_key);
        for (slot, source) in free.iter().zip(perm) {
            order[*slot] = free[source];
        }
        order
    }

    /// Reordered copy of `items`; entries matching `is_protected` keep their position
    #[must_use]
    pub fn reorder<T, F>(&self, items: &[T], seed: Seed, context_key: &str, is_protected: F) -> Vec<T>
    where
        T: Clone,
        F: Fn(&T) -> bool,
    {
        let pinned: Vec<bool> = items.iter().map(is_protected).collect();
        self.order(items.len(), seed, context_key, &pinned)
            .into_iter()
            .map(|i| items[i].clone())
            .collect()
    }

    /// Declarative reorder plan for a whole element tree
    #[must_use]
    pub fn plan(&self, root: &ElementNode, seed: Seed) -> ReorderPlan {
        if !self.varies(seed) {
            return ReorderPlan::identity();
        }
        plan_tree(root, |path, pinned| self.order(pinned.len(), seed, path, pinned))
    }

    /// Decoy nodes for one text slot
    #[must_use]
    pub fn decoys_for(
        &self,
        seed: Seed,
        semantic_key: &str,
        protected: bool,
        content: &ContentVariantEngine,
    ) -> DecoyPlan {
        if protected || !self.varies(seed) {
            return DecoyPlan::empty(semantic_key);
        }
        build_decoys(&self.selector, seed, semantic_key, content)
    }
}

impl Default for AttributeObfuscationEngine {
    fn default() -> Self {
        Self::new(VariantSelector::default())
    }
}
