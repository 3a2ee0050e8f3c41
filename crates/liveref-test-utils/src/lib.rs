//! Testing utilities for liveref workspace
//!
//! Shared catalog fixtures and an instrumented backend.

#![allow(missing_docs)]

use async_trait::async_trait;
use liveref_resolve::{BackendError, CatalogBackend, InMemoryCatalog};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const KETTLE_CODE: &str = "B07XJ8C8F5";
pub const KETTLE_ID: &str = "7d444840-9dc0-11d1-b245-5ffdce74fad2";
pub const TOASTER_CODE: &str = "B08N5WRWNW";
pub const MISSING_CODE: &str = "B000000000";

/// Canonical snake-case payload
pub fn kettle_payload() -> Value {
    json!({
        "id": KETTLE_ID,
        "asin": KETTLE_CODE,
        "title": "Electric Kettle",
        "brand": "Boilco",
        "image_url": "https://img.example/kettle.jpg",
        "product_url": "https://shop.example/kettle",
        "price": 29.99,
        "original_price": 39.99,
        "is_prime": true,
        "coupon_type": "percentage",
        "coupon_value": 10,
        "coupon_expiry": "2030-01-31T00:00:00Z",
        "rating": 4.6,
        "review_count": 1532
    })
}

/// Legacy camel-case payload inside an envelope
pub fn toaster_payload() -> Value {
    json!({
        "data": {
            "productName": "Slot Toaster <2-slice>",
            "asin": TOASTER_CODE,
            "imageUrl": "https://img.example/toaster.jpg",
            "currentPrice": "$49.00",
            "isFreeShipping": true,
            "warrantyYears": 2
        }
    })
}

pub fn sample_catalog() -> InMemoryCatalog {
    let mut catalog = InMemoryCatalog::new();
    catalog.insert(kettle_payload());
    catalog.insert(toaster_payload()["data"].clone());
    catalog
}

#[derive(Debug, Default)]
struct Faults {
    delay: Option<Duration>,
    failure: Option<BackendError>,
}

/// Catalog backend that counts calls and can be slowed down or broken
#[derive(Debug, Clone)]
pub struct FakeCatalog {
    inner: Arc<InMemoryCatalog>,
    calls: Arc<AtomicUsize>,
    faults: Arc<Mutex<Faults>>,
}

impl FakeCatalog {
    pub fn new(inner: InMemoryCatalog) -> Self {
        Self {
            inner: Arc::new(inner),
            calls: Arc::new(AtomicUsize::new(0)),
            faults: Arc::new(Mutex::new(Faults::default())),
        }
    }

    pub fn sample() -> Self {
        Self::new(sample_catalog())
    }

    /// Number of backend calls so far, across clones
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_delay(&self, delay: Duration) {
        self.faults.lock().delay = Some(delay);
    }

    pub fn fail_with(&self, error: BackendError) {
        self.faults.lock().failure = Some(error);
    }

    pub fn heal(&self) {
        self.faults.lock().failure = None;
    }

    async fn call(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (delay, failure) = {
            let faults = self.faults.lock();
            (faults.delay, faults.failure.clone())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        failure.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl CatalogBackend for FakeCatalog {
    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<Value>, BackendError> {
        self.call().await?;
        self.inner.fetch_by_id(id).await
    }

    async fn query_by_code(&self, code: &str) -> Result<Option<Value>, BackendError> {
        self.call().await?;
        self.inner.query_by_code(code).await
    }
}
