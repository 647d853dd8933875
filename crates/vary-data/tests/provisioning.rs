use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use vary_data::prelude::*;
use vary_data::{BundledCatalog, FileStore, LocalDatasetService, SourceError};
use vary_seed::Seed;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

struct Refusing;

#[async_trait::async_trait]
impl GenerationSource for Refusing {
    async fn generate(
        &self,
        _request: &vary_data::GenerationRequest,
    ) -> Result<Vec<Entity>, SourceError> {
        Err(SourceError::unavailable("quota exhausted"))
    }
}

fn chain(remote: bool, ai: bool, unique: bool) -> DataProvisioningChain {
    DataProvisioningChain::new(
        ChainSettings::new("market")
            .with_remote(remote)
            .with_ai(ai)
            .with_unique(unique)
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(200)),
    )
    .with_remote(Arc::new(LocalDatasetService::new(BundledCatalog::builtin())))
    .with_generation(Arc::new(Refusing))
}

proptest! {
    #[test]
    fn prop_canonical_seed_is_bundled_under_every_flag_set(
        remote in any::<bool>(),
        ai in any::<bool>(),
        unique in any::<bool>(),
    ) {
        let rt = runtime();
        let outcome = rt.block_on(chain(remote, ai, unique).load("jobs", Seed::CANONICAL));
        prop_assert_eq!(outcome.stage, Stage::Bundled);
        prop_assert_eq!(&*outcome.items, &*BundledCatalog::builtin().dataset("jobs"));
    }

    #[test]
    fn prop_offline_loads_are_reproducible(seed in 2u32..=300) {
        let rt = runtime();
        let seed = Seed::new(seed).unwrap();
        let a = rt.block_on(chain(false, false, true).initialize("hotels", seed));
        let b = rt.block_on(chain(false, false, true).initialize("hotels", seed));
        prop_assert_eq!(serde_json::to_vec(&*a).unwrap(), serde_json::to_vec(&*b).unwrap());
    }
}

#[tokio::test]
async fn local_dataset_service_feeds_the_remote_stage() {
    let outcome = chain(true, false, true).load("jobs", Seed::new(3).unwrap()).await;
    assert_eq!(outcome.stage, Stage::Remote);
    assert_eq!(outcome.items[0]["id"], json!("job-3"));
}

#[tokio::test]
async fn unknown_entity_falls_back_to_local_generation() {
    let outcome = chain(true, true, true).load("spaceships", Seed::new(8).unwrap()).await;
    assert_eq!(outcome.stage, Stage::Local);
    assert_eq!(outcome.items.len(), 20);
    assert_eq!(outcome.items[0]["id"], json!("spaceships-8-0"));
}

#[tokio::test]
async fn file_store_keeps_results_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let seed = Seed::new(42).unwrap();

    let first = chain(true, false, false).with_store(Arc::new(FileStore::new(dir.path())));
    let fetched = first.load("products", seed).await;
    assert_eq!(fetched.stage, Stage::Remote);
    assert!(dir.path().join("market_generated_products_v1.json").exists());

    let second = chain(true, false, false).with_store(Arc::new(FileStore::new(dir.path())));
    let cached = second.load("products", seed).await;
    assert_eq!(cached.stage, Stage::Cached);
    assert_eq!(cached.items, fetched.items);

    let other_seed = second.load("products", Seed::new(43).unwrap()).await;
    assert_eq!(other_seed.stage, Stage::Remote);
}

#[tokio::test]
async fn offline_generation_leaves_store_empty() {
    let dir = tempfile::tempdir().unwrap();
    let chain = chain(false, false, false).with_store(Arc::new(FileStore::new(dir.path())));
    assert_eq!(chain.load("products", Seed::new(42).unwrap()).await.stage, Stage::Local);
    assert!(!dir.path().join("market_generated_products_v1.json").exists());
}

#[tokio::test]
async fn corrupt_file_is_regenerated() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("market_generated_emails_v1.json"), "{{{").unwrap();
    let chain = chain(false, false, false).with_store(Arc::new(FileStore::new(dir.path())));
    let outcome = chain.load("emails", Seed::new(5).unwrap()).await;
    assert_eq!(outcome.stage, Stage::Local);
    assert!(!outcome.items.is_empty());
}
