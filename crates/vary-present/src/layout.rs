//! Structural layout variation
//!
//! Layouts come from a closed, versioned, hand-authored table. Seeds never
//! compute new layouts; they only pick an entry, wrapping past the end.

use serde::Serialize;
use vary_seed::{Seed, VariantSelector};

/// Slot key layouts are selected under
pub const LAYOUT_SLOT: &str = "layout";

/// Version of the built-in layout table
pub const BUILTIN_LAYOUT_VERSION: u32 = 1;

/// Page sections a layout orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    /// Site header and navigation
    Header,
    /// Headline banner
    Hero,
    /// Search bar
    Search,
    /// Filter panel
    Filters,
    /// Main result listing
    Listings,
    /// Promoted items
    Featured,
    /// Customer quotes
    Testimonials,
    /// Signup box
    Newsletter,
    /// Site footer
    Footer,
}

/// Where the sidebar sits relative to the main content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SidebarPosition {
    /// Left of the content
    Left,
    /// Right of the content
    Right,
    /// Above the content
    Top,
    /// Below the content
    Bottom,
    /// No sidebar
    None,
}

/// How the main content groups its items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Grouping {
    /// Flex row
    Flex,
    /// Fixed-column grid
    Grid,
    /// Stacked blocks
    Block,
}

/// One structural layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutRecord {
    /// Stable layout name
    pub name: &'static str,
    /// Section order top to bottom
    pub sections: &'static [Section],
    /// Sidebar placement
    pub sidebar: SidebarPosition,
    /// Content grouping
    pub grouping: Grouping,
    /// Columns for grid/flex grouping
    pub columns: u8,
    /// Whether the header sticks on scroll
    pub sticky_header: bool,
}

use Section::{
    Featured, Filters, Footer, Header, Hero, Listings, Newsletter, Search, Testimonials,
};

const fn layout(
    name: &'static str,
    sections: &'static [Section],
    sidebar: SidebarPosition,
    grouping: Grouping,
    columns: u8,
    sticky_header: bool,
) -> LayoutRecord {
    LayoutRecord {
        name,
        sections,
        sidebar,
        grouping,
        columns,
        sticky_header,
    }
}

/// Built-in layouts; entry 0 is the original page
pub static BUILTIN_LAYOUTS: &[LayoutRecord] = &[
    layout("classic", &[Header, Hero, Search, Filters, Listings, Featured, Footer], SidebarPosition::Left, Grouping::Grid, 3, false),
    layout("mirrored", &[Header, Hero, Search, Filters, Listings, Featured, Footer], SidebarPosition::Right, Grouping::Grid, 3, false),
    layout("search-first", &[Header, Search, Hero, Listings, Filters, Footer], SidebarPosition::None, Grouping::Flex, 2, true),
    layout("stacked", &[Header, Hero, Filters, Search, Listings, Newsletter, Footer], SidebarPosition::Top, Grouping::Block, 1, false),
    layout("showcase", &[Header, Featured, Hero, Search, Listings, Testimonials, Footer], SidebarPosition::Bottom, Grouping::Grid, 4, true),
    layout("compact", &[Header, Search, Filters, Listings, Footer], SidebarPosition::Left, Grouping::Flex, 2, true),
    layout("editorial", &[Header, Hero, Testimonials, Search, Listings, Featured, Footer], SidebarPosition::Right, Grouping::Block, 1, false),
    layout("catalog", &[Header, Filters, Search, Listings, Featured, Newsletter, Footer], SidebarPosition::Left, Grouping::Grid, 4, false),
    layout("magazine", &[Header, Featured, Listings, Hero, Search, Footer], SidebarPosition::Top, Grouping::Grid, 2, true),
    layout("minimal", &[Header, Search, Listings, Footer], SidebarPosition::None, Grouping::Block, 1, false),
    layout("banner-bottom", &[Header, Search, Listings, Filters, Hero, Footer], SidebarPosition::Bottom, Grouping::Flex, 3, false),
    layout("social-proof", &[Header, Hero, Testimonials, Featured, Search, Filters, Listings, Footer], SidebarPosition::Right, Grouping::Grid, 3, true),
    layout("newsletter-led", &[Header, Newsletter, Hero, Search, Listings, Footer], SidebarPosition::None, Grouping::Flex, 2, false),
    layout("split", &[Header, Filters, Listings, Search, Featured, Footer], SidebarPosition::Left, Grouping::Flex, 2, true),
    layout("gallery", &[Header, Hero, Featured, Listings, Testimonials, Newsletter, Footer], SidebarPosition::Top, Grouping::Grid, 5, false),
];

/// A closed, versioned layout table
#[derive(Debug, Clone, Copy)]
pub struct LayoutTable {
    version: u32,
    records: &'static [LayoutRecord],
}

impl LayoutTable {
    /// Custom table; an empty record list falls back to the built-in table
    #[must_use]
    pub fn new(version: u32, records: &'static [LayoutRecord]) -> Self {
        if records.is_empty() {
            tracing::warn!(version, "empty layout table, using built-in layouts");
            return Self::builtin();
        }
        Self { version, records }
    }

    /// The built-in table
    #[inline]
    #[must_use]
    pub const fn builtin() -> Self {
        Self {
            version: BUILTIN_LAYOUT_VERSION,
            records: BUILTIN_LAYOUTS,
        }
    }

    /// Table version
    #[inline]
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// All records
    #[inline]
    #[must_use]
    pub const fn records(&self) -> &'static [LayoutRecord] {
        self.records
    }

    /// Number of layouts
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false: tables are non-empty by construction
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The canonical layout
    #[inline]
    #[must_use]
    pub const fn canonical(&self) -> &'static LayoutRecord {
        &self.records[0]
    }
}

impl Default for LayoutTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Picks a layout record per seed
#[derive(Debug, Clone, Copy)]
pub struct LayoutVariationEngine {
    selector: VariantSelector,
    table: LayoutTable,
    enabled: bool,
}

impl LayoutVariationEngine {
    /// Create engine over a table
    #[inline]
    #[must_use]
    pub fn new(selector: VariantSelector, table: LayoutTable) -> Self {
        Self {
            selector,
            table,
            enabled: true,
        }
    }

    /// Disable structural variation; every seed gets the canonical layout
    #[inline]
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Index of the layout chosen for `seed`
    #[must_use]
    pub fn index_for(&self, seed: Seed) -> usize {
        if !self.enabled {
            return 0;
        }
        self.selector.index(seed, LAYOUT_SLOT, self.table.len())
    }

    /// Layout for `seed`
    #[must_use]
    pub fn layout_for(&self, seed: Seed) -> &'static LayoutRecord {
        self.table
            .records()
            .get(self.index_for(seed))
            .unwrap_or_else(|| self.table.canonical())
    }

    /// Section order for `seed`
    #[inline]
    #[must_use]
    pub fn sections_for(&self, seed: Seed) -> &'static [Section] {
        self.layout_for(seed).sections
    }

    /// Table in use
    #[inline]
    #[must_use]
    pub fn table(&self) -> &LayoutTable {
        &self.table
    }
}

impl Default for LayoutVariationEngine {
    fn default() -> Self {
        Self::new(VariantSelector::default(), LayoutTable::builtin())
    }
}
