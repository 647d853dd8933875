//! Vary Present - seeded presentation variation
//!
//! Pure functions of `(seed, slot key)` that the rendering layer consumes:
//! - [`LayoutVariationEngine`]: picks a structural layout from a closed table
//! - [`AttributeObfuscationEngine`]: id/class names, sibling order, decoys
//! - [`ContentVariantEngine`]: one phrasing per semantic text key
//!
//! Nothing here performs I/O or keeps state between calls, so presentation can
//! render before any data has loaded.
//!
//! # Example
//!
//! ```rust
//! use vary_present::{AttributeObfuscationEngine, ElementNode, LayoutVariationEngine};
//! use vary_seed::Seed;
//!
//! let seed = Seed::new(42).unwrap();
//! let layout = LayoutVariationEngine::default().layout_for(seed);
//! assert!(!layout.sections.is_empty());
//!
//! let tree = ElementNode::new("nav").with_children(
//!     ["home", "deals", "help"].map(ElementNode::new),
//! );
//! let plan = AttributeObfuscationEngine::default().plan(&tree, seed);
//! let rendered = plan.apply(&tree);
//! assert_eq!(rendered.children.len(), 3);
//! ```

#![warn(unreachable_pub)]

pub mod attributes;
pub mod decoy;
pub mod layout;
pub mod reorder;
pub mod text;

pub use attributes::{sanitize_identifier, AttributeObfuscationEngine, AttributeTable};
pub use decoy::{Decoy, DecoyPlan, DecoyPosition};
pub use layout::{Grouping, LayoutRecord, LayoutTable, LayoutVariationEngine, Section, SidebarPosition};
pub use reorder::{ElementNode, Region, ReorderPlan};
pub use text::{ContentVariantEngine, PhraseTable};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with presentation variation
    pub use crate::{
        AttributeObfuscationEngine, ContentVariantEngine, ElementNode, LayoutRecord,
        LayoutVariationEngine, Region, ReorderPlan,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
