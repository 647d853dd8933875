use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use vary_core::prelude::*;
use vary_data::{BundledCatalog, LocalGenerator};
use vary_test_utils::*;

const SLOTS: &[&str] = &[
    "search-input",
    "search-button",
    "book-now-button",
    "nav-link",
    "listing-card",
    "price-label",
    "cart-button",
    "unknown-widget",
];

#[tokio::test]
async fn scenario_a_canonical_seed_returns_bundled_jobs() {
    let session = setup_offline_session(test_config().with_flags(flags(false, false, false)));
    session.set_seed(Seed::CANONICAL);

    let jobs = session.initialize("jobs").await;
    assert_eq!(*jobs, *BundledCatalog::builtin().dataset("jobs"));
}

#[tokio::test]
async fn canonical_seed_is_bundled_under_every_flag_set() {
    for remote in [false, true] {
        for ai in [false, true] {
            for unique in [false, true] {
                let session = setup_test_session(
                    test_config().with_flags(flags(remote, ai, unique)),
                    Arc::new(FixedDatasetSource { count: 5 }),
                    Arc::new(FixedGenerationSource),
                );
                let outcome = session.load("jobs").await;
                assert_eq!(outcome.stage, Stage::Bundled);
                assert_eq!(*outcome.items, *BundledCatalog::builtin().dataset("jobs"));
                assert_eq!(session.layout().name, "classic");
                assert_eq!(session.element_id("search-input", 0), "search-input");
            }
        }
    }
}

#[tokio::test]
async fn scenario_b_remote_items_are_normalized() {
    let session = setup_test_session(
        test_config().with_flags(flags(true, false, false)),
        Arc::new(FixedDatasetSource { count: 50 }),
        Arc::new(FailingGenerationSource),
    );
    let seeds = session.set_seed(seed(42));

    let outcome = session.load("jobs").await;
    assert_eq!(outcome.stage, Stage::Remote);
    assert!(outcome.items.len() <= 50);
    assert_eq!(outcome.items.len(), 50);
    for (n, job) in outcome.items.iter().enumerate() {
        assert_eq!(job["id"], json!(format!("jobs-{}-{n}", seeds.data)));
        assert_eq!(job["title"], json!(format!("jobs {n}")));
        assert_eq!(job["company"], json!("Unknown company"));
        assert_eq!(job["featured"], json!(false));
    }
}

#[tokio::test]
async fn scenario_c_failed_remote_falls_back_to_local_generator() {
    let load = || async {
        let session = setup_test_session(
            test_config().with_flags(flags(true, false, false)),
            Arc::new(FailingDatasetSource),
            Arc::new(FailingGenerationSource),
        );
        let seeds = session.set_seed(seed(42));
        (seeds, session.load("jobs").await)
    };

    let (seeds, first) = load().await;
    let (_, second) = load().await;

    assert_eq!(first.stage, Stage::Local);
    assert_eq!(*first.items, LocalGenerator::default().generate("jobs", seeds.data, 20));
    assert_eq!(
        serde_json::to_vec(&*first.items).unwrap(),
        serde_json::to_vec(&*second.items).unwrap()
    );
}

#[test]
fn scenario_d_sessions_agree_on_attributes() {
    let a = setup_offline_session(test_config());
    let b = setup_offline_session(test_config());

    for base in Seed::all() {
        a.set_seed(base);
        b.set_seed(base);
        for slot in SLOTS {
            assert_eq!(a.element_id(slot, 0), b.element_id(slot, 0));
            assert_eq!(a.element_id(slot, 3), b.element_id(slot, 3));
            assert_eq!(a.element_class(slot), b.element_class(slot));
        }
        assert_eq!(a.layout(), b.layout());
        assert_eq!(a.text("cta.book_now", "Book now"), b.text("cta.book_now", "Book now"));
    }
}

#[test]
fn derived_seed_fixture() {
    let session = setup_offline_session(test_config());
    assert_eq!(session.set_seed(seed(2)).data, seed(124));
    assert_eq!(session.set_seed(Seed::CANONICAL).data, Seed::CANONICAL);
}

#[tokio::test]
async fn empty_remote_advances_to_generation() {
    let remote = CountingDatasetSource::new(EmptyDatasetSource);
    let calls = remote.counter();
    let session = setup_test_session(
        test_config().with_flags(flags(true, true, true)),
        Arc::new(remote),
        Arc::new(FixedGenerationSource),
    );
    session.set_seed(seed(42));

    let outcome = session.load("hotels").await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.stage, Stage::Generated);
    assert_eq!(outcome.items.len(), 20);
    assert_eq!(outcome.items[0]["city"], json!("Unknown"));
}

#[tokio::test]
async fn readiness_resolves_when_every_network_stage_fails() {
    let session = setup_test_session(
        test_config().with_flags(flags(true, true, false)),
        Arc::new(SlowDatasetSource {
            delay: Duration::from_secs(30),
        }),
        Arc::new(FailingGenerationSource),
    );
    session.set_seed(seed(77));

    let outcomes = tokio::time::timeout(Duration::from_secs(5), async {
        let (outcomes, ()) = tokio::join!(session.load_all(), session.when_ready());
        outcomes
    })
    .await
    .expect("gate must not hang");

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.stage == Stage::Local));
    assert!(session.data().gate().is_ready());
}

#[tokio::test]
async fn seed_change_supersedes_in_flight_load() {
    let session = setup_test_session(
        test_config().with_flags(flags(true, false, true)),
        Arc::new(SlowDatasetSource {
            delay: Duration::from_millis(50),
        }),
        Arc::new(FailingGenerationSource),
    );
    session.set_seed(seed(42));

    let (stale, ()) = tokio::join!(session.load("jobs"), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.set_seed(seed(43));
    });
    assert!(!stale.committed);
    assert!(session.data().snapshot("jobs").is_none());

    let fresh = session.load("jobs").await;
    assert!(fresh.committed);
    assert_eq!(session.data().snapshot("jobs").map(|o| o.seed), Some(session.seeds().data));
}

#[test]
fn protected_hero_never_reorders() {
    let session = setup_offline_session(test_config());
    let tree = landing_tree();
    let hero_before = tree.find("page/hero").unwrap().child_keys();
    let stats_before = tree.find("page/hero/stats").unwrap().child_keys();

    for base in Seed::all() {
        session.set_seed(base);
        let rendered = session.reorder_plan(&tree).apply(&tree);
        assert_eq!(rendered.find("page/hero").unwrap().child_keys(), hero_before);
        assert_eq!(rendered.find("page/hero/stats").unwrap().child_keys(), stats_before);
        assert_eq!(rendered.children[1].key, "hero");
    }
}

#[test]
fn shuffles_are_permutations() {
    let session = setup_offline_session(test_config());
    let items: Vec<u32> = (0..12).collect();
    for base in Seed::all() {
        session.set_seed(base);
        let mut shuffled = session.shuffle(&items, "cards");
        shuffled.sort_unstable();
        assert_eq!(shuffled, items);
    }
}

#[tokio::test]
async fn individual_initializes_release_waiters() {
    let session = setup_offline_session(test_config());
    session.set_seed(seed(42));

    let waiter = async {
        tokio::time::timeout(Duration::from_secs(1), session.when_ready())
            .await
            .expect("gate opens once jobs and hotels settled");
    };
    let (jobs, hotels, ()) =
        tokio::join!(session.initialize("jobs"), session.initialize("hotels"), waiter);
    assert!(!jobs.is_empty());
    assert!(!hotels.is_empty());
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn prop_query_input_is_deterministic_across_sessions(raw in any::<i64>(), slot in 0usize..8) {
        let rt = runtime();
        let input = SeedInput::from_query(&format!("seed={raw}"));
        let a = setup_offline_session(test_config());
        let b = setup_offline_session(test_config());
        let ra = rt.block_on(a.apply_input(&input));
        let rb = rt.block_on(b.apply_input(&input));

        prop_assert_eq!(ra, rb);
        prop_assert_eq!(a.seeds(), b.seeds());
        if !(1..=300).contains(&raw) {
            prop_assert_eq!(ra.base, Seed::CANONICAL);
        }
        prop_assert_eq!(a.element_id(SLOTS[slot], 2), b.element_id(SLOTS[slot], 2));
        prop_assert_eq!(a.layout(), b.layout());
    }

    #[test]
    fn prop_structure_parameter_overrides_only_structure(base in 1u32..=300, structure in 1u32..=300) {
        let rt = runtime();
        let plain = setup_offline_session(test_config());
        let pinned = setup_offline_session(test_config());
        rt.block_on(plain.apply_input(&SeedInput::none().with_seed(base.to_string())));
        rt.block_on(pinned.apply_input(
            &SeedInput::none()
                .with_seed(base.to_string())
                .with_structure(structure.to_string()),
        ));

        let (p, q) = (plain.seeds(), pinned.seeds());
        prop_assert_eq!(q.structure, seed(structure));
        prop_assert_eq!((p.base, p.layout, p.data, p.text), (q.base, q.layout, q.data, q.text));
    }
}
