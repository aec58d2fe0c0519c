//! Per-resource mutual exclusion for materializing files on disk

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::error::DownloadError;

type GuardMap = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// Ensures at most one download per resource identifier is in flight
///
/// Guards are created on first contention for an identifier and removed again
/// once the last holder or waiter lets go, so the map only ever holds
/// identifiers with a download in progress.
///
/// Cloning is cheap and clones share the same guards.
#[derive(Clone, Default)]
pub struct DownloadCoordinator {
    guards: GuardMap,
}

/// Held for the duration of one critical section; cleans up its map slot on drop
struct ResourceGuard {
    resource_id: String,
    lock: Option<OwnedMutexGuard<()>>,
    guards: GuardMap,
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        // Release the lock first so the strong count below only counts the map and waiters
        drop(self.lock.take());

        let mut guards = match self.guards.lock() {
            Ok(guards) => guards,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guards
            .get(&self.resource_id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            guards.remove(&self.resource_id);
        }
    }
}

impl DownloadCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resource identifiers that currently have a guard
    pub fn active_guards(&self) -> usize {
        match self.guards.lock() {
            Ok(guards) => guards.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    async fn acquire(&self, resource_id: &str) -> ResourceGuard {
        let mutex = {
            let mut guards = match self.guards.lock() {
                Ok(guards) => guards,
                Err(poisoned) => poisoned.into_inner(),
            };
            guards
                .entry(resource_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        ResourceGuard {
            resource_id: resource_id.to_string(),
            lock: Some(mutex.lock_owned().await),
            guards: self.guards.clone(),
        }
    }

    /// Return the location of `resource_id`, downloading it first if needed
    ///
    /// `exists` reports where the finished resource lives, or `None` when it
    /// has not been materialized. It is consulted once without any lock and
    /// again under the per-resource guard, so that callers who queued behind
    /// a download pick up its result instead of downloading again.
    ///
    /// `download` must make the resource visible to `exists` atomically (for
    /// example by writing to a temporary file and renaming it into place).
    /// Its failures are returned to the caller and nothing is remembered: the
    /// next call tries again.
    ///
    /// The critical section runs on its own task, so a caller that goes away
    /// does not abort a download other callers may be waiting for.
    pub async fn fetch_or_download<C, CF, D, DF, E>(
        &self,
        resource_id: &str,
        exists: C,
        download: D,
    ) -> Result<PathBuf, DownloadError<E>>
    where
        C: Fn() -> CF + Send + Sync + 'static,
        CF: Future<Output = Option<PathBuf>> + Send + 'static,
        D: FnOnce() -> DF + Send + 'static,
        DF: Future<Output = Result<(), E>> + Send + 'static,
        E: Send + 'static,
    {
        if let Some(path) = exists().await {
            return Ok(path);
        }

        let coordinator = self.clone();
        let resource_id = resource_id.to_string();
        let critical_section = tokio::spawn(async move {
            let _guard = coordinator.acquire(&resource_id).await;

            if let Some(path) = exists().await {
                debug!(resource_id = %resource_id, "Resource materialized while waiting");
                return Ok(path);
            }

            info!(resource_id = %resource_id, "Downloading resource");
            download().await.map_err(DownloadError::Download)?;

            exists()
                .await
                .ok_or_else(|| DownloadError::Missing(resource_id.clone()))
        });

        match critical_section.await {
            Ok(result) => result,
            Err(e) => Err(DownloadError::Join(e)),
        }
    }
}
