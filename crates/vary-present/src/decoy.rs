//! Inert decoy nodes carrying alternate phrasing
//!
//! A decoy is hidden from rendering and assistive technology; it only exists
//! so naive text extraction sees more than one candidate phrasing.

use crate::text::ContentVariantEngine;
use serde::Serialize;
use vary_seed::hash::polynomial_hash;
use vary_seed::prng::{below, Lcg};
use vary_seed::{Seed, VariantSelector};

/// Upper bound on decoys per slot
pub const MAX_DECOYS: usize = 2;

/// Hidden class names decoys may carry
const HIDDEN_CLASSES: &[&str] = &["sr-skip", "offscreen-copy", "ghost-text", "aux-label", "shadow-copy"];

/// Where a decoy sits relative to the real content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoyPosition {
    /// Preceding sibling
    Before,
    /// Following sibling
    After,
}

/// One inert node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoy {
    /// Alternate phrasing
    pub text: String,
    /// Placement
    pub position: DecoyPosition,
    /// Hidden class
    pub class_name: String,
    /// Extra attributes keeping the node out of rendering
    pub attributes: Vec<(String, String)>,
}

/// Decoys planned for one semantic text slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecoyPlan {
    /// Slot key
    pub semantic_key: String,
    /// Planned decoys, possibly none
    pub decoys: Vec<Decoy>,
}

impl DecoyPlan {
    /// Plan without decoys
    #[must_use]
    pub fn empty(semantic_key: &str) -> Self {
        Self {
            semantic_key: semantic_key.to_string(),
            decoys: Vec::new(),
        }
    }

    /// Whether nothing is inserted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decoys.is_empty()
    }

    /// Decoys placed before the real content
    pub fn before(&self) -> impl Iterator<Item = &Decoy> {
        self.decoys
            .iter()
            .filter(|d| d.position == DecoyPosition::Before)
    }

    /// Decoys placed after the real content
    pub fn after(&self) -> impl Iterator<Item = &Decoy> {
        self.decoys
            .iter()
            .filter(|d| d.position == DecoyPosition::After)
    }
}

fn hidden_attributes() -> Vec<(String, String)> {
    vec![
        ("aria-hidden".to_string(), "true".to_string()),
        ("hidden".to_string(), String::new()),
        ("tabindex".to_string(), "-1".to_string()),
    ]
}

pub(crate) fn build_decoys(
    selector: &VariantSelector,
    seed: Seed,
    semantic_key: &str,
    content: &ContentVariantEngine,
) -> DecoyPlan {
    let alternates = content.alternates_for(seed, semantic_key);
    if alternates.is_empty() {
        return DecoyPlan::empty(semantic_key);
    }

    let context = format!("decoy:{semantic_key}");
    let order = selector.permutation(alternates.len(), seed, &context);
    let mut rng = Lcg::new(polynomial_hash(&context) ^ seed.as_u32());
    let count = 1 + below(&mut rng, MAX_DECOYS.min(alternates.len()));

    let decoys = order
        .into_iter()
        .take(count)
        .map(|i| Decoy {
            text: alternates[i].to_string(),
            position: if below(&mut rng, 2) == 0 {
                DecoyPosition::Before
            } else {
                DecoyPosition::After
            },
            class_name: HIDDEN_CLASSES[below(&mut rng, HIDDEN_CLASSES.len())].to_string(),
            attributes: hidden_attributes(),
        })
        .collect();

    DecoyPlan {
        semantic_key: semantic_key.to_string(),
        decoys,
    }
}
