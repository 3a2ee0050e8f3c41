//! Resolver behavior against an instrumented backend

use futures::future::join_all;
use liveref_resolve::{BackendError, EntityResolver, ResolutionError, ResolverConfig};
use liveref_test_utils::{FakeCatalog, KETTLE_CODE, KETTLE_ID, MISSING_CODE, TOASTER_CODE};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_one_backend_call() {
    let backend = FakeCatalog::sample();
    backend.set_delay(Duration::from_millis(50));
    let resolver = EntityResolver::new(backend.clone());

    let results = join_all((0..3).map(|_| resolver.resolve(KETTLE_CODE))).await;
    let entities: Vec<_> = results.into_iter().map(Result::unwrap).collect();

    assert_eq!(backend.calls(), 1);
    assert!(Arc::ptr_eq(&entities[0], &entities[1]));
    assert!(Arc::ptr_eq(&entities[1], &entities[2]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_failures_are_shared_and_not_cached() {
    let backend = FakeCatalog::sample();
    backend.set_delay(Duration::from_millis(30));
    backend.fail_with(BackendError::Timeout);
    let resolver = EntityResolver::new(backend.clone());

    let results = join_all((0..3).map(|_| resolver.resolve(KETTLE_CODE))).await;
    assert_eq!(backend.calls(), 1);
    for result in &results {
        assert_eq!(
            result.as_ref().unwrap_err(),
            &ResolutionError::backend("code:B07XJ8C8F5", BackendError::Timeout)
        );
    }

    backend.heal();
    let entity = resolver.resolve(KETTLE_CODE).await.unwrap();
    assert_eq!(entity.title, "Electric Kettle");
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn snapshot_expires_after_ttl() {
    let backend = FakeCatalog::sample();
    let config = ResolverConfig::new().with_ttl(Duration::from_millis(100));
    let resolver = EntityResolver::with_config(backend.clone(), config);

    resolver.resolve(KETTLE_CODE).await.unwrap();
    resolver.resolve(KETTLE_CODE).await.unwrap();
    assert_eq!(backend.calls(), 1);

    tokio::time::sleep(Duration::from_millis(250)).await;
    resolver.resolve(KETTLE_CODE).await.unwrap();
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn id_and_code_are_separate_cache_entries() {
    let backend = FakeCatalog::sample();
    let resolver = EntityResolver::new(backend.clone());

    let by_code = resolver.resolve(KETTLE_CODE).await.unwrap();
    let by_id = resolver.resolve(KETTLE_ID).await.unwrap();
    assert_eq!(by_code.title, by_id.title);
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn legacy_payload_is_normalized() {
    let resolver = EntityResolver::new(FakeCatalog::sample());
    let toaster = resolver.resolve(TOASTER_CODE).await.unwrap();
    assert_eq!(toaster.title, "Slot Toaster <2-slice>");
    assert_eq!(toaster.price, Some(49.0));
    assert!(toaster.is_free_shipping);
    assert_eq!(toaster.image.as_deref(), Some("https://img.example/toaster.jpg"));
}

#[tokio::test]
async fn missing_entity_is_not_found() {
    let backend = FakeCatalog::sample();
    let resolver = EntityResolver::new(backend.clone());
    assert_eq!(
        resolver.resolve(MISSING_CODE).await.unwrap_err(),
        ResolutionError::NotFound("code:B000000000".to_string())
    );
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn malformed_identifier_never_reaches_backend() {
    let backend = FakeCatalog::sample();
    let resolver = EntityResolver::new(backend.clone());
    let err = resolver.resolve("hello world").await.unwrap_err();
    assert!(matches!(err, ResolutionError::UnrecognizedIdentifier(_)));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn dropping_last_lease_evicts() {
    let backend = FakeCatalog::sample();
    let resolver = EntityResolver::new(backend.clone());

    let lease = resolver.retain(KETTLE_CODE).unwrap();
    resolver.resolve(KETTLE_CODE).await.unwrap();
    resolver.resolve(KETTLE_CODE).await.unwrap();
    assert_eq!(backend.calls(), 1);

    drop(lease);
    resolver.resolve(KETTLE_CODE).await.unwrap();
    assert_eq!(backend.calls(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn lease_released_during_fetch_does_not_pin_the_result() {
    let backend = FakeCatalog::sample();
    backend.set_delay(Duration::from_millis(50));
    let resolver = EntityResolver::new(backend.clone());

    let lease = resolver.retain(KETTLE_CODE).unwrap();
    let pending = {
        let resolver = resolver.clone();
        tokio::spawn(async move { resolver.resolve(KETTLE_CODE).await })
    };
    while backend.calls() == 0 {
        tokio::task::yield_now().await;
    }
    drop(lease);

    assert_eq!(pending.await.unwrap().unwrap().title, "Electric Kettle");
    assert_eq!(resolver.stats().await.entry_count, 0);

    resolver.resolve(KETTLE_CODE).await.unwrap();
    assert_eq!(backend.calls(), 2);
}
