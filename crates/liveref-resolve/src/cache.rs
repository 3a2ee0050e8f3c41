//! Entity resolver with a coalescing TTL cache
//!
//! The cache map is owned here and mutated only through [`EntityResolver`]'s
//! own methods. Node views hold a resolver handle, never the map.
//!
//! # Guarantees
//! - Concurrent `resolve` calls for one key share a single backend call and
//!   observe the same value or the same error
//! - Successful snapshots live for a fixed TTL; failures are never cached
//! - When the last [`ReferenceLease`] on a key drops, its entry is evicted
//!   before the key is next resolved. A request in flight at that moment
//!   still completes, but its result is evicted as soon as it lands.

use crate::backend::{fetch, CatalogBackend};
use crate::entity::ResolvedEntity;
use crate::error::{ResolutionError, ResolutionResult};
use crate::key::CatalogKey;
use crate::normalize::normalize_payload;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default freshness window of a resolved snapshot
pub const DEFAULT_TTL: Duration = Duration::from_secs(45);

/// Default maximum number of cached snapshots
pub const DEFAULT_CAPACITY: u64 = 10_000;

/// Resolver cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Freshness window of a resolved snapshot
    pub ttl: Duration,
    /// Maximum number of cached snapshots
    pub max_capacity: u64,
}

impl ResolverConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With TTL
    #[inline]
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// With capacity
    #[inline]
    #[must_use]
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Calls to `resolve`
    pub requests: u64,
    /// Backend calls issued
    pub backend_calls: u64,
    /// Backend calls that ended in an error
    pub failures: u64,
    /// Number of entries in cache
    pub entry_count: u64,
    /// Keys currently retained by mounted nodes
    pub retained_keys: u64,
}

/// Per-key bookkeeping of mounted nodes and outstanding requests
#[derive(Debug, Default)]
struct Interest {
    leases: usize,
    in_flight: usize,
    evict: bool,
}

impl Interest {
    fn idle(&self) -> bool {
        self.leases == 0 && self.in_flight == 0
    }
}

type Interests = DashMap<CatalogKey, Interest>;

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    backend_calls: AtomicU64,
    failures: AtomicU64,
}

/// Resolves identifiers to shared live entity snapshots
///
/// Cheap to clone; clones share one cache.
#[derive(Clone)]
pub struct EntityResolver {
    backend: Arc<dyn CatalogBackend>,
    cache: Cache<CatalogKey, Arc<ResolvedEntity>>,
    interests: Arc<Interests>,
    counters: Arc<Counters>,
    config: ResolverConfig,
}

impl std::fmt::Debug for EntityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityResolver")
            .field("config", &self.config)
            .field("entry_count", &self.cache.entry_count())
            .field("retained_keys", &self.retained_keys())
            .finish_non_exhaustive()
    }
}

impl EntityResolver {
    /// Create resolver with default configuration
    #[must_use]
    pub fn new(backend: impl CatalogBackend) -> Self {
        Self::with_config(backend, ResolverConfig::default())
    }

    /// Create resolver with explicit configuration
    #[must_use]
    pub fn with_config(backend: impl CatalogBackend, config: ResolverConfig) -> Self {
        Self::from_shared(Arc::new(backend), config)
    }

    /// Create resolver over an already shared backend
    #[must_use]
    pub fn from_shared(backend: Arc<dyn CatalogBackend>, config: ResolverConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();
        Self {
            backend,
            cache,
            interests: Arc::new(DashMap::new()),
            counters: Arc::new(Counters::default()),
            config,
        }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> ResolverConfig {
        self.config
    }

    /// Resolve an identifier to its current entity snapshot
    ///
    /// # Errors
    /// - `ResolutionError::UnrecognizedIdentifier` without any backend call
    /// - `ResolutionError::NotFound` / `Backend` / `MalformedPayload` from the
    ///   backend round trip, shared by every concurrent caller
    pub async fn resolve(&self, raw: &str) -> ResolutionResult<Arc<ResolvedEntity>> {
        self.counters.requests.fetch_add(1, Ordering::Relaxed);
        let key = CatalogKey::parse(raw)?;
        self.resolve_key(key).await
    }

    /// Resolve an already parsed key
    ///
    /// # Errors
    /// As [`Self::resolve`]
    pub async fn resolve_key(&self, key: CatalogKey) -> ResolutionResult<Arc<ResolvedEntity>> {
        let (request, released) = InFlight::begin(&self.interests, &key);
        if released {
            self.evict(&key).await;
        }

        let backend = Arc::clone(&self.backend);
        let counters = Arc::clone(&self.counters);
        let init_key = key.clone();

        let init = async move {
            counters.backend_calls.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %init_key, "fetching entity");
            let result = load(backend.as_ref(), &init_key).await;
            if let Err(e) = &result {
                counters.failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(key = %init_key, error = %e, "entity resolution failed");
            }
            result
        };

        let result = self
            .cache
            .try_get_with(key.clone(), init)
            .await
            .map_err(|shared: Arc<ResolutionError>| (*shared).clone());

        if request.settle() {
            self.evict(&key).await;
        }
        result
    }

    async fn evict(&self, key: &CatalogKey) {
        self.cache.invalidate(key).await;
        tracing::debug!(%key, "evicted unreferenced entity");
    }

    /// Drop the cached snapshot for an identifier
    ///
    /// An in-flight request for the same key is not cancelled.
    pub async fn invalidate(&self, raw: &str) {
        if let Ok(key) = CatalogKey::parse(raw) {
            self.cache.invalidate(&key).await;
        }
    }

    /// Drop every cached snapshot
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Register interest in an identifier for as long as the lease lives
    ///
    /// Returns `None` for identifiers that can never resolve.
    #[must_use]
    pub fn retain(&self, raw: &str) -> Option<ReferenceLease> {
        let key = CatalogKey::parse(raw).ok()?;
        let mut interest = self.interests.entry(key.clone()).or_default();
        interest.leases += 1;
        interest.evict = false;
        drop(interest);
        Some(ReferenceLease {
            key,
            interests: Arc::clone(&self.interests),
        })
    }

    /// Current statistics
    ///
    /// Applies pending evictions and cache maintenance first so
    /// `entry_count` is exact.
    pub async fn stats(&self) -> CacheStats {
        let mut released = Vec::new();
        self.interests.retain(|key, interest| {
            if interest.evict && interest.idle() {
                released.push(key.clone());
                return false;
            }
            true
        });
        for key in &released {
            self.evict(key).await;
        }
        self.cache.run_pending_tasks().await;
        CacheStats {
            requests: self.counters.requests.load(Ordering::Relaxed),
            backend_calls: self.counters.backend_calls.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            entry_count: self.cache.entry_count(),
            retained_keys: self.retained_keys(),
        }
    }

    fn retained_keys(&self) -> u64 {
        self.interests.iter().filter(|entry| entry.leases > 0).count() as u64
    }
}

/// One caller's outstanding request on a key
///
/// Dropped without settling (the caller was cancelled), it still releases
/// its in-flight count.
struct InFlight {
    interests: Arc<Interests>,
    key: CatalogKey,
    settled: bool,
}

impl InFlight {
    /// Count a request; also reports whether the key was released while
    /// idle and its entry must go before this request reads the cache
    fn begin(interests: &Arc<Interests>, key: &CatalogKey) -> (Self, bool) {
        let mut interest = interests.entry(key.clone()).or_default();
        let released = interest.evict && interest.idle();
        if released {
            interest.evict = false;
        }
        interest.in_flight += 1;
        drop(interest);

        let request = Self {
            interests: Arc::clone(interests),
            key: key.clone(),
            settled: false,
        };
        (request, released)
    }

    /// Finish the request once its result is in the cache; `true` if the
    /// key was released meanwhile and the fresh entry must go
    fn settle(mut self) -> bool {
        self.settled = true;
        self.release()
    }

    fn release(&self) -> bool {
        let Entry::Occupied(mut entry) = self.interests.entry(self.key.clone()) else {
            return false;
        };
        let interest = entry.get_mut();
        interest.in_flight = interest.in_flight.saturating_sub(1);
        let evict = interest.evict && interest.leases == 0;
        if interest.idle() {
            entry.remove();
        }
        evict
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.settled {
            self.release();
        }
    }
}

async fn load(backend: &dyn CatalogBackend, key: &CatalogKey) -> ResolutionResult<Arc<ResolvedEntity>> {
    let payload = fetch(backend, key)
        .await
        .map_err(|e| ResolutionError::backend(key, e))?
        .ok_or_else(|| ResolutionError::NotFound(key.to_string()))?;
    normalize_payload(key, &payload).map(Arc::new)
}

/// Interest of one mounted node in one key
///
/// Dropping the last lease on a key marks its cached snapshot for eviction.
/// The mark is applied by the next `resolve` or `stats` on the resolver, or
/// when an in-flight request for the key lands. Dropping a lease never
/// cancels an in-flight request.
#[derive(Debug)]
pub struct ReferenceLease {
    key: CatalogKey,
    interests: Arc<Interests>,
}

impl ReferenceLease {
    /// Key this lease holds
    #[inline]
    #[must_use]
    pub fn key(&self) -> &CatalogKey {
        &self.key
    }
}

impl Drop for ReferenceLease {
    fn drop(&mut self) {
        if let Some(mut interest) = self.interests.get_mut(&self.key) {
            interest.leases = interest.leases.saturating_sub(1);
            if interest.leases == 0 {
                interest.evict = true;
                tracing::trace!(key = %self.key, in_flight = interest.in_flight, "last lease released");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryCatalog;
    use serde_json::json;

    fn resolver() -> EntityResolver {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert(json!({"asin": "B07XJ8C8F5", "title": "Kettle", "price": 29.99}));
        EntityResolver::new(catalog)
    }

    #[tokio::test]
    async fn resolve_hits_cache_on_second_call() {
        let resolver = resolver();
        let a = resolver.resolve("B07XJ8C8F5").await.unwrap();
        let b = resolver.resolve(" b07xj8c8f5").await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let stats = resolver.stats().await;
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.backend_calls, 1);
        assert_eq!(stats.entry_count, 1);
    }

    #[tokio::test]
    async fn unrecognized_identifier_skips_backend() {
        let resolver = resolver();
        let err = resolver.resolve("not-an-id-and-not-a-code").await.unwrap_err();
        assert!(matches!(err, ResolutionError::UnrecognizedIdentifier(_)));
        assert_eq!(resolver.stats().await.backend_calls, 0);
    }

    #[tokio::test]
    async fn not_found_is_not_cached() {
        let resolver = resolver();
        assert!(resolver.resolve("B000000000").await.is_err());
        assert!(resolver.resolve("B000000000").await.is_err());
        let stats = resolver.stats().await;
        assert_eq!(stats.backend_calls, 2);
        assert_eq!(stats.failures, 2);
        assert_eq!(stats.entry_count, 0);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let resolver = resolver();
        resolver.resolve("B07XJ8C8F5").await.unwrap();
        resolver.invalidate("B07XJ8C8F5").await;
        resolver.resolve("B07XJ8C8F5").await.unwrap();
        assert_eq!(resolver.stats().await.backend_calls, 2);
    }

    #[tokio::test]
    async fn last_lease_evicts_entry() {
        let resolver = resolver();
        let first = resolver.retain("B07XJ8C8F5").unwrap();
        let second = resolver.retain("b07xj8c8f5").unwrap();
        resolver.resolve("B07XJ8C8F5").await.unwrap();
        assert_eq!(resolver.stats().await.retained_keys, 1);

        drop(first);
        resolver.resolve("B07XJ8C8F5").await.unwrap();
        assert_eq!(resolver.stats().await.backend_calls, 1);

        drop(second);
        assert_eq!(resolver.stats().await.retained_keys, 0);
        resolver.resolve("B07XJ8C8F5").await.unwrap();
        assert_eq!(resolver.stats().await.backend_calls, 2);
    }

    #[tokio::test]
    async fn released_key_without_request_is_not_pinned() {
        let resolver = resolver();
        drop(resolver.retain("B07XJ8C8F5").unwrap());
        resolver.resolve("B07XJ8C8F5").await.unwrap();
        resolver.resolve("B07XJ8C8F5").await.unwrap();

        let stats = resolver.stats().await;
        assert_eq!(stats.backend_calls, 1);
        assert_eq!(stats.entry_count, 1);
        assert!(resolver.interests.is_empty());
    }

    #[tokio::test]
    async fn stats_applies_pending_eviction() {
        let resolver = resolver();
        let lease = resolver.retain("B07XJ8C8F5").unwrap();
        resolver.resolve("B07XJ8C8F5").await.unwrap();
        drop(lease);

        let stats = resolver.stats().await;
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.retained_keys, 0);
        assert!(resolver.interests.is_empty());
    }

    #[test]
    fn retain_rejects_unresolvable_ids() {
        let resolver = resolver();
        assert!(resolver.retain("???").is_none());
    }

    #[test]
    fn config_builders() {
        let config = ResolverConfig::new()
            .with_ttl(Duration::from_secs(30))
            .with_max_capacity(10);
        assert_eq!(config.ttl, Duration::from_secs(30));
        assert_eq!(config.max_capacity, 10);
        assert_eq!(ResolverConfig::default().ttl, DEFAULT_TTL);
    }
}
