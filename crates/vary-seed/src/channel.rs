//! Derived-seed channels
//!
//! Each variation channel (layout, data, text, structure, or a custom name)
//! owns a [`ChannelRule`] that maps the base seed to its sub-seed. Rules are
//! table driven and configured per application through a [`ChannelTable`].

use crate::seed::{Seed, SEED_SPACE};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A named variation channel
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Channel {
    /// Structural layout selection
    Layout,
    /// Dataset slicing and generation
    Data,
    /// Text phrasing
    Text,
    /// Attribute names, sibling order and decoys
    Structure,
    /// Application-specific channel
    Custom(String),
}

impl Channel {
    /// Stable channel name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Layout => "layout",
            Self::Data => "data",
            Self::Text => "text",
            Self::Structure => "structure",
            Self::Custom(name) => name,
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Channel {
    fn from(name: String) -> Self {
        match name.as_str() {
            "layout" => Self::Layout,
            "data" => Self::Data,
            "text" => Self::Text,
            "structure" => Self::Structure,
            _ => Self::Custom(name),
        }
    }
}

impl From<&str> for Channel {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.as_str().to_string()
    }
}

impl FromStr for Channel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// How a channel derives its sub-seed from the base seed
///
/// Every rule maps the canonical base seed to the canonical sub-seed,
/// independent of its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ChannelRule {
    /// Always canonical (channel disabled)
    Canonical,
    /// Sub-seed equals base seed
    Identity,
    /// Pinned to a fixed seed for every non-canonical base
    Fixed {
        /// Pinned value
        seed: Seed,
    },
    /// `((base * a + b) mod 300) + 1`
    Affine {
        /// Multiplier
        a: u32,
        /// Offset
        b: u32,
    },
}

impl ChannelRule {
    /// Affine rule constructor
    #[inline]
    #[must_use]
    pub const fn affine(a: u32, b: u32) -> Self {
        Self::Affine { a, b }
    }

    /// Apply the rule to a base seed
    #[must_use]
    pub fn apply(self, base: Seed) -> Seed {
        if base.is_canonical() {
            return Seed::CANONICAL;
        }
        match self {
            Self::Canonical => Seed::CANONICAL,
            Self::Identity => base,
            Self::Fixed { seed } => seed,
            Self::Affine { a, b } => {
                let raw = (u64::from(base.as_u32()) * u64::from(a) + u64::from(b))
                    % u64::from(SEED_SPACE);
                // raw + 1 is in [1, 300].
                #[allow(clippy::cast_possible_truncation)]
                let value = raw as u32 + 1;
                Seed::new(value).unwrap_or(Seed::CANONICAL)
            }
        }
    }
}

/// Per-application channel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelTable {
    rules: BTreeMap<Channel, ChannelRule>,
}

impl ChannelTable {
    /// Table with no channels; every lookup falls back to identity
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Standard table: every built-in channel derived independently
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(Channel::Layout, ChannelRule::affine(37, 11))
            .with_rule(Channel::Data, ChannelRule::affine(53, 17))
            .with_rule(Channel::Text, ChannelRule::affine(71, 23))
            .with_rule(Channel::Structure, ChannelRule::affine(97, 41))
    }

    /// Layout pinned to canonical, structure derived from the base seed
    #[must_use]
    pub fn structure_only() -> Self {
        Self::standard().with_rule(Channel::Layout, ChannelRule::Canonical)
    }

    /// Every built-in channel follows the base seed directly
    #[must_use]
    pub fn passthrough() -> Self {
        Self::empty()
            .with_rule(Channel::Layout, ChannelRule::Identity)
            .with_rule(Channel::Data, ChannelRule::Identity)
            .with_rule(Channel::Text, ChannelRule::Identity)
            .with_rule(Channel::Structure, ChannelRule::Identity)
    }

    /// Set or replace one channel's rule
    #[inline]
    #[must_use]
    pub fn with_rule(mut self, channel: Channel, rule: ChannelRule) -> Self {
        self.rules.insert(channel, rule);
        self
    }

    /// Rule for a channel, identity when unconfigured
    #[must_use]
    pub fn rule(&self, channel: &Channel) -> ChannelRule {
        self.rules
            .get(channel)
            .copied()
            .unwrap_or(ChannelRule::Identity)
    }

    /// Iterate configured channels in order
    pub fn iter(&self) -> btree_map::Iter<'_, Channel, ChannelRule> {
        self.rules.iter()
    }

    /// Number of configured channels
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no channel is configured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for ChannelTable {
    fn default() -> Self {
        Self::standard()
    }
}
