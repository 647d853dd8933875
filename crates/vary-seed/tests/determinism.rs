use proptest::prelude::*;
use vary_seed::{
    Channel, ChannelTable, Seed, SeedResolver, SelectionMode, ShuffleProfile, VariantSelector,
};

fn any_seed() -> impl Strategy<Value = Seed> {
    (1u32..=300).prop_map(|v| Seed::new(v).unwrap())
}

fn any_selector() -> impl Strategy<Value = VariantSelector> {
    (
        prop_oneof![Just(SelectionMode::Sequential), Just(SelectionMode::Salted)],
        prop_oneof![Just(ShuffleProfile::Classic), Just(ShuffleProfile::Fnv)],
    )
        .prop_map(|(mode, profile)| VariantSelector::new(mode, profile))
}

proptest! {
    #[test]
    fn prop_shuffle_is_permutation(
        items in proptest::collection::vec(0u16..50, 0..64),
        seed in any_seed(),
        ctx in "[a-z-]{0,24}",
        selector in any_selector(),
    ) {
        let shuffled = selector.shuffle(&items, seed, &ctx);
        prop_assert_eq!(shuffled.len(), items.len());

        let mut a = items.clone();
        let mut b = shuffled;
        a.sort_unstable();
        b.sort_unstable();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_shuffle_is_deterministic(
        len in 0usize..40,
        seed in any_seed(),
        ctx in "[a-z]{1,12}",
        selector in any_selector(),
    ) {
        prop_assert_eq!(
            selector.permutation(len, seed, &ctx),
            selector.permutation(len, seed, &ctx)
        );
    }

    #[test]
    fn prop_index_in_bounds_and_call_order_free(
        seed in any_seed(),
        slots in proptest::collection::vec("[a-z]{1,8}", 1..8),
        len in 1usize..30,
        selector in any_selector(),
    ) {
        let forward: Vec<usize> = slots.iter().map(|s| selector.index(seed, s, len)).collect();
        let mut backward: Vec<usize> = slots.iter().rev().map(|s| selector.index(seed, s, len)).collect();
        backward.reverse();

        prop_assert_eq!(&forward, &backward);
        prop_assert!(forward.iter().all(|i| *i < len));
    }

    #[test]
    fn prop_derivation_is_pure(seed in any_seed()) {
        let a = SeedResolver::new(ChannelTable::standard());
        let b = SeedResolver::new(ChannelTable::standard());
        prop_assert_eq!(a.derive_all(seed), b.derive_all(seed));
        prop_assert_eq!(
            a.derive(seed, &Channel::Layout),
            a.derive(seed, &Channel::Layout)
        );
    }
}

#[test]
fn canonical_seed_selects_index_zero_everywhere() {
    let selectors = [
        VariantSelector::new(SelectionMode::Sequential, ShuffleProfile::Classic),
        VariantSelector::new(SelectionMode::Salted, ShuffleProfile::Classic),
        VariantSelector::new(SelectionMode::Salted, ShuffleProfile::Fnv),
    ];
    for selector in selectors {
        for len in 1..25 {
            assert_eq!(selector.index(Seed::CANONICAL, "slot", len), 0);
        }
    }
}

#[test]
fn every_seed_resolves_to_itself() {
    let resolver = SeedResolver::default();
    for seed in Seed::all() {
        assert_eq!(resolver.resolve_base(&seed.to_string()), seed);
    }
}
