use proptest::prelude::*;
use vary_present::{AttributeObfuscationEngine, ElementNode, Region};
use vary_seed::{Seed, SelectionMode, ShuffleProfile, VariantSelector};

fn leaves(prefix: &str, n: usize) -> Vec<ElementNode> {
    (0..n).map(|i| ElementNode::new(format!("{prefix}{i}"))).collect()
}

fn landing_page() -> ElementNode {
    ElementNode::new("body").with_children([
        ElementNode::new("header").with_children(leaves("link", 6)),
        ElementNode::new("hero")
            .protected()
            .with_children([
                ElementNode::new("headline"),
                ElementNode::new("subline"),
                ElementNode::new("actions")
                    .exempt()
                    .with_children(leaves("btn", 4)),
                ElementNode::new("badges").with_children([
                    ElementNode::new("badge-group").with_children(leaves("badge", 5)),
                    ElementNode::new("trust"),
                ]),
            ]),
        ElementNode::new("listings").with_children(leaves("card", 8)),
        ElementNode::new("legal").protected().with_children(leaves("line", 3)),
        ElementNode::new("footer").with_children(leaves("col", 4)),
    ])
}

fn snapshot(node: &ElementNode, path: &str, out: &mut Vec<(String, Vec<String>)>) {
    out.push((
        path.to_string(),
        node.children.iter().map(|c| c.key.clone()).collect(),
    ));
    for child in &node.children {
        snapshot(child, &format!("{path}/{}", child.key), out);
    }
}

fn locked_paths() -> Vec<&'static str> {
    vec![
        "body/hero",
        "body/hero/badges",
        "body/hero/badges/badge-group",
        "body/legal",
    ]
}

fn any_engine() -> impl Strategy<Value = AttributeObfuscationEngine> {
    prop_oneof![Just(ShuffleProfile::Classic), Just(ShuffleProfile::Fnv)].prop_map(|profile| {
        AttributeObfuscationEngine::new(VariantSelector::new(SelectionMode::Sequential, profile))
    })
}

proptest! {
    #[test]
    fn prop_protected_subtrees_keep_child_order(seed in 1u32..=300, engine in any_engine()) {
        let seed = Seed::new(seed).unwrap();
        let tree = landing_page();
        let rendered = engine.plan(&tree, seed).apply(&tree);

        let mut before = Vec::new();
        let mut after = Vec::new();
        snapshot(&tree, "body", &mut before);
        snapshot(&rendered, "body", &mut after);

        for path in locked_paths() {
            let b = before.iter().find(|(p, _)| p == path).map(|(_, k)| k);
            let a = after.iter().find(|(p, _)| p == path).map(|(_, k)| k);
            prop_assert_eq!(b, a, "locked container {} changed", path);
        }
    }

    #[test]
    fn prop_protected_nodes_keep_sibling_position(seed in 1u32..=300) {
        let seed = Seed::new(seed).unwrap();
        let tree = landing_page();
        let rendered = AttributeObfuscationEngine::default().plan(&tree, seed).apply(&tree);

        for (i, child) in tree.children.iter().enumerate() {
            if child.region == Region::Protected {
                prop_assert_eq!(&rendered.children[i].key, &child.key);
            }
        }
    }

    #[test]
    fn prop_plan_application_is_idempotent(seed in 1u32..=300) {
        let seed = Seed::new(seed).unwrap();
        let tree = landing_page();
        let plan = AttributeObfuscationEngine::default().plan(&tree, seed);
        let once = plan.apply(&tree);
        prop_assert_eq!(plan.apply(&once), once);
    }
}

#[test]
fn canonical_seed_plan_is_identity() {
    let tree = landing_page();
    let plan = AttributeObfuscationEngine::default().plan(&tree, Seed::CANONICAL);
    assert!(plan.is_identity());
    assert_eq!(plan.apply(&tree), tree);
}

#[test]
fn some_seed_reorders_unprotected_containers() {
    let tree = landing_page();
    let engine = AttributeObfuscationEngine::default();
    let moved = Seed::all()
        .filter(|s| !s.is_canonical())
        .any(|s| engine.plan(&tree, s).order_for("body/listings").is_some());
    assert!(moved);
}

#[test]
fn exempt_level_may_reorder_inside_hero() {
    let tree = landing_page();
    let engine = AttributeObfuscationEngine::default();
    let exempt_moved = Seed::all().any(|s| engine.plan(&tree, s).order_for("body/hero/actions").is_some());
    assert!(exempt_moved);
}
