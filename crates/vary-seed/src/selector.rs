//! Variant selection and seeded shuffles
//!
//! [`VariantSelector`] turns `(seed, slot key)` into a table index and
//! `(seed, context key)` into a permutation. Both are pure: no state is kept
//! between calls, so call order never affects results.

use crate::hash::{fnv1a, polynomial_hash};
use crate::prng::{below, Lcg, Xorshift32};
use crate::seed::Seed;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// How a slot index is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// `(seed - 1) mod len`; the slot key is ignored
    #[default]
    Sequential,
    /// Slot key salts the seed so different slots move independently
    Salted,
}

/// Pinned hash + generator pair used for shuffles and salted picks
///
/// Profiles are independent tables. They are not expected to agree with each
/// other for the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleProfile {
    /// Polynomial ×31 hash feeding the Numerical Recipes LCG
    #[default]
    Classic,
    /// FNV-1a hash feeding xorshift32
    Fnv,
}

impl ShuffleProfile {
    /// Generator seeded from `hash(context) ^ seed`
    fn generator(self, seed: Seed, context_key: &str) -> Box<dyn RngCore> {
        match self {
            Self::Classic => Box::new(Lcg::new(polynomial_hash(context_key) ^ seed.as_u32())),
            Self::Fnv => Box::new(Xorshift32::new(fnv1a(context_key) ^ seed.as_u32())),
        }
    }
}

/// Pure `(seed, key)` → index / permutation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VariantSelector {
    /// Index selection mode
    #[serde(default)]
    pub mode: SelectionMode,
    /// Shuffle profile
    #[serde(default)]
    pub profile: ShuffleProfile,
}

impl VariantSelector {
    /// Create selector
    #[inline]
    #[must_use]
    pub const fn new(mode: SelectionMode, profile: ShuffleProfile) -> Self {
        Self { mode, profile }
    }

    /// Index into a table of `len` variants, always `< len` (or `0`)
    ///
    /// The canonical seed selects index `0` in every mode.
    #[must_use]
    pub fn index(&self, seed: Seed, slot_key: &str, len: usize) -> usize {
        if len == 0 || seed.is_canonical() {
            return 0;
        }
        match self.mode {
            SelectionMode::Sequential => seed.offset(len),
            SelectionMode::Salted => {
                let mut rng = self.profile.generator(seed, slot_key);
                below(&mut rng, len)
            }
        }
    }

    /// Pick the variant for a slot, `None` only for empty tables
    #[inline]
    #[must_use]
    pub fn pick<'a, T>(&self, seed: Seed, slot_key: &str, table: &'a [T]) -> Option<&'a T> {
        table.get(self.index(seed, slot_key, table.len()))
    }

    /// Seeded Fisher–Yates permutation of `0..len`
    ///
    /// Walks from the last position down to 1, swapping each position with
    /// `next() % (i + 1)`.
    #[must_use]
    pub fn permutation(&self, len: usize, seed: Seed, context_key: &str) -> Vec<usize> {
        let mut order: Vec<usize> = (0..len).collect();
        if len < 2 {
            return order;
        }
        let mut rng = self.profile.generator(seed, context_key);
        for i in (1..len).rev() {
            let j = below(&mut rng, i + 1);
            order.swap(i, j);
        }
        order
    }

    /// Shuffled copy of `items`; the input is left untouched
    #[must_use]
    pub fn shuffle<T: Clone>(&self, items: &[T], seed: Seed, context_key: &str) -> Vec<T> {
        self.permutation(items.len(), seed, context_key)
            .into_iter()
            .map(|i| items[i].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(v: u32) -> Seed {
        Seed::new(v).unwrap()
    }

    #[test]
    fn sequential_index_formula() {
        let selector = VariantSelector::default();
        assert_eq!(selector.index(seed(1), "layout", 12), 0);
        assert_eq!(selector.index(seed(2), "layout", 12), 1);
        assert_eq!(selector.index(seed(13), "layout", 12), 0);
        assert_eq!(selector.index(seed(300), "layout", 12), 299 % 12);
    }

    #[test]
    fn empty_table_is_index_zero() {
        for mode in [SelectionMode::Sequential, SelectionMode::Salted] {
            let selector = VariantSelector::new(mode, ShuffleProfile::Classic);
            assert_eq!(selector.index(seed(77), "x", 0), 0);
            assert!(selector.pick::<u8>(seed(77), "x", &[]).is_none());
        }
    }

    #[test]
    fn salted_index_is_canonical_for_seed_one() {
        let selector = VariantSelector::new(SelectionMode::Salted, ShuffleProfile::Fnv);
        for slot in ["a", "search-input", "footer"] {
            assert_eq!(selector.index(Seed::CANONICAL, slot, 9), 0);
        }
    }

    #[test]
    fn salted_index_depends_on_slot() {
        let selector = VariantSelector::new(SelectionMode::Salted, ShuffleProfile::Classic);
        let picks: Vec<usize> = ["nav", "hero", "card", "footer", "search", "modal"]
            .iter()
            .map(|slot| selector.index(seed(42), slot, 97))
            .collect();
        assert!(picks.iter().any(|p| *p != picks[0]));
    }

    #[test]
    fn classic_permutation_fixture() {
        // hash("ab") = 3105, state = 3105 ^ 2 = 3107
        let selector = VariantSelector::default();
        let mut lcg = Lcg::new(3107);
        let mut expected = vec![0, 1, 2];
        let j2 = lcg.step() as usize % 3;
        expected.swap(2, j2);
        let j1 = lcg.step() as usize % 2;
        expected.swap(1, j1);

        assert_eq!(selector.permutation(3, seed(2), "ab"), expected);
    }

    #[test]
    fn shuffle_does_not_mutate_input() {
        let selector = VariantSelector::default();
        let items = vec!["a", "b", "c", "d", "e"];
        let snapshot = items.clone();
        let shuffled = selector.shuffle(&items, seed(8), "nav");
        assert_eq!(items, snapshot);
        assert_eq!(shuffled.len(), items.len());
    }

    #[test]
    fn profiles_are_independent_tables() {
        let classic = VariantSelector::new(SelectionMode::Sequential, ShuffleProfile::Classic);
        let fnv = VariantSelector::new(SelectionMode::Sequential, ShuffleProfile::Fnv);
        let a = classic.permutation(20, seed(42), "cards");
        let b = fnv.permutation(20, seed(42), "cards");
        assert_ne!(a, b);
    }
}
