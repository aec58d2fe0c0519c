//! Time-expiring, size-bounded single-flight cache

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::policy::EvictionPolicy;
use moka::Expiry;
use tracing::debug;

use crate::error::FlightError;

/// A cached value together with the TTL it was stored under
#[derive(Clone)]
struct Timed<V> {
    value: V,
    ttl: Duration,
}

/// Expires each entry `ttl` after creation, as chosen by the caller that computed it
struct PerEntryTtl;

impl<K, V> Expiry<K, Timed<V>> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &K,
        value: &Timed<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Key → value cache where concurrent misses for one key share one computation
///
/// Entries are visible until their TTL elapses and are then treated as
/// absent. When the cache is at capacity the least-recently-used entry is
/// evicted. Computations that are still running are not entries yet, so
/// eviction can never take a value away from a caller waiting on it.
///
/// Failed computations are never stored: every waiter on the failed call sees
/// the same error and the next call computes again.
///
/// Cloning is cheap and clones share the same entries.
pub struct FlightCache<K, V> {
    name: &'static str,
    entries: Cache<K, Timed<V>>,
}

impl<K, V> Clone for FlightCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            entries: self.entries.clone(),
        }
    }
}

impl<K, V> FlightCache<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty cache holding at most `max_entries` values
    pub fn new(name: &'static str, max_entries: u64) -> Self {
        let entries = Cache::builder()
            .name(name)
            .max_capacity(max_entries)
            .eviction_policy(EvictionPolicy::lru())
            .expire_after(PerEntryTtl)
            .build();

        Self { name, entries }
    }

    /// Return the live value for `key`, computing and storing it on a miss
    ///
    /// Only one `compute` runs per key at a time; other callers for the same
    /// key wait for it and receive its result. The computation runs on its
    /// own task and finishes even if this caller is dropped.
    ///
    /// A zero `ttl` bypasses the cache entirely and always computes.
    pub async fn get_or_compute<F, E>(
        &self,
        key: K,
        ttl: Duration,
        compute: F,
    ) -> Result<V, FlightError<E>>
    where
        F: Future<Output = Result<V, E>> + Send + 'static,
        E: Send + Sync + 'static,
    {
        if ttl.is_zero() {
            return match tokio::spawn(compute).await {
                Ok(result) => result.map_err(|e| FlightError::Compute(Arc::new(e))),
                Err(e) => Err(FlightError::Join(e)),
            };
        }

        let entries = self.entries.clone();
        let name = self.name;
        let flight = tokio::spawn(async move {
            entries
                .try_get_with(key, async move {
                    debug!(cache = name, "Cache miss, computing");
                    compute.await.map(|value| Timed { value, ttl })
                })
                .await
                .map(|timed| timed.value)
        });

        match flight.await {
            Ok(result) => result.map_err(FlightError::Compute),
            Err(e) => Err(FlightError::Join(e)),
        }
    }

    /// Return the live value for `key` without computing anything
    pub async fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).await.map(|timed| timed.value)
    }

    /// Approximate number of live entries
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Apply pending expirations and evictions now instead of lazily
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }
}
