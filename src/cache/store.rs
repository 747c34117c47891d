//! Entity Cache Module
//!
//! The per-kind cache engine: remote create/fetch/update with merge-by-id
//! into the cache table, in-flight fetch de-duplication, and synchronous
//! selectors for UI readers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tracing::debug;

use crate::backend::Backend;
use crate::cache::{CacheStats, CacheTable};
use crate::entities::{Entity, EntityId};
use crate::error::{Result, StoreError};

/// A fetch all concurrent callers for one identifier attach to.
type SharedFetch<E> = Shared<BoxFuture<'static, Result<Arc<E>>>>;

struct Inner<E: Entity> {
    table: CacheTable<E>,
    stats: CacheStats,
}

// == Entity Cache ==
/// In-memory cache for one entity kind, backed by a remote collaborator.
///
/// The cache owns the canonical copy of every entity it has seen. All locks
/// guard short critical sections and are never held across an await, so
/// selector reads are synchronous. A failed remote call leaves the table in
/// its last-known-consistent state; retrying is the caller's decision.
pub struct EntityCache<E: Entity> {
    backend: Arc<dyn Backend<E>>,
    inner: Arc<RwLock<Inner<E>>>,
    inflight: Arc<Mutex<HashMap<EntityId, SharedFetch<E>>>>,
}

impl<E: Entity> Clone for EntityCache<E> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            inner: Arc::clone(&self.inner),
            inflight: Arc::clone(&self.inflight),
        }
    }
}

impl<E: Entity> EntityCache<E> {
    // == Constructor ==
    pub fn new(backend: Arc<dyn Backend<E>>) -> Self {
        Self {
            backend,
            inner: Arc::new(RwLock::new(Inner {
                table: CacheTable::new(),
                stats: CacheStats::new(),
            })),
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // == Create ==
    /// Sends an already-sanitized create payload to the backend. On success
    /// the returned entity (with its newly assigned identifier) is inserted
    /// into the table; on failure nothing is mutated.
    pub async fn create(&self, payload: E::Create) -> Result<Arc<E>> {
        self.write_inner(|inner| inner.stats.record_remote_call());

        let created = self.backend.create(&payload).await?;

        let entry = self.write_inner(|inner| {
            let (entry, applied) = inner.table.insert(created);
            if applied {
                inner.stats.record_merge();
            } else {
                inner.stats.record_stale_skip();
            }
            let len = inner.table.len();
            inner.stats.set_total_entries(len);
            entry
        });
        debug!(kind = %E::KIND, id = %entry.id(), "created entity");
        Ok(entry)
    }

    // == Fetch ==
    /// Refreshes one entity from the backend.
    ///
    /// If a fetch for `id` is already in flight, this call attaches to it
    /// instead of issuing a duplicate remote call, so completions cannot
    /// arrive out of order for the same identifier. On success the result is
    /// merged into the table; on failure any previously cached value stays
    /// untouched — a failed refresh does not invalidate a cache hit.
    pub async fn fetch(&self, id: &EntityId) -> Result<Arc<E>> {
        let (fut, attached) = {
            let mut inflight = self.inflight.lock().expect("in-flight map poisoned");
            match inflight.get(id) {
                Some(existing) => (existing.clone(), true),
                None => {
                    let fut = self.spawn_fetch(id.clone());
                    inflight.insert(id.clone(), fut.clone());
                    (fut, false)
                }
            }
        };

        if attached {
            debug!(kind = %E::KIND, %id, "attached to in-flight fetch");
            self.write_inner(|inner| inner.stats.record_deduped_fetch());
        }

        fut.await
    }

    /// Runs the remote fetch on its own task so it completes (and merges)
    /// even when every caller stops awaiting, then wraps it for sharing.
    fn spawn_fetch(&self, id: EntityId) -> SharedFetch<E> {
        let backend = Arc::clone(&self.backend);
        let inner = Arc::clone(&self.inner);
        let inflight = Arc::clone(&self.inflight);

        let task = tokio::spawn(async move {
            {
                let mut inner = inner.write().expect("cache state poisoned");
                inner.stats.record_remote_call();
            }

            let outcome = match backend.fetch(&id).await {
                Ok(entity) => {
                    let mut inner = inner.write().expect("cache state poisoned");
                    let (entry, applied) = inner.table.insert(entity);
                    if applied {
                        inner.stats.record_merge();
                    } else {
                        inner.stats.record_stale_skip();
                    }
                    let len = inner.table.len();
                    inner.stats.set_total_entries(len);
                    Ok(entry)
                }
                Err(err) => {
                    debug!(kind = %E::KIND, %id, "fetch failed: {err}");
                    Err(err)
                }
            };

            // The request is settled, whatever the outcome
            inflight
                .lock()
                .expect("in-flight map poisoned")
                .remove(&id);
            outcome
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(err) => Err(StoreError::Remote(format!("fetch task aborted: {err}"))),
            }
        }
        .boxed()
        .shared()
    }

    // == Get Or Fetch ==
    /// Returns the cached entity when present, falling through to a
    /// de-duplicated fetch on a miss.
    pub async fn get_or_fetch(&self, id: &EntityId) -> Result<Arc<E>> {
        let cached = self.write_inner(|inner| {
            let entry = inner.table.get(id);
            match &entry {
                Some(_) => inner.stats.record_hit(),
                None => inner.stats.record_miss(),
            }
            entry
        });
        match cached {
            Some(entry) => Ok(entry),
            None => self.fetch(id).await,
        }
    }

    // == Update ==
    /// Sends an already-sanitized partial update to the backend. On success
    /// the cached entry is shallow-merged: only the fields present in the
    /// patch are overwritten, with provenance adopted from the backend echo.
    /// On failure nothing is mutated.
    pub async fn update(&self, id: &EntityId, patch: E::Patch) -> Result<Arc<E>> {
        self.write_inner(|inner| inner.stats.record_remote_call());

        let echo = self.backend.update(id, &patch).await?;

        let entry = self.write_inner(|inner| {
            let (entry, applied) = inner.table.merge(id, &patch, echo);
            if applied {
                inner.stats.record_merge();
            } else {
                inner.stats.record_stale_skip();
            }
            let len = inner.table.len();
            inner.stats.set_total_entries(len);
            entry
        });
        debug!(kind = %E::KIND, %id, "updated entity");
        Ok(entry)
    }

    // == Soft Delete ==
    /// Marks an entity deleted. The identifier stays known to the cache.
    pub async fn soft_delete(&self, id: &EntityId) -> Result<Arc<E>> {
        self.update(id, E::tombstone(true)).await
    }

    /// Clears the soft-delete flag.
    pub async fn restore(&self, id: &EntityId) -> Result<Arc<E>> {
        self.update(id, E::tombstone(false)).await
    }

    // == Selectors ==
    /// Pure read of the cache table. Referentially stable: while the entry
    /// has not changed, every call returns the same allocation.
    pub fn select_by_id(&self, id: &EntityId) -> Option<Arc<E>> {
        self.read_inner(|inner| inner.table.get(id))
    }

    /// Every cached entity, including soft-deleted ones.
    pub fn select_all(&self) -> Vec<Arc<E>> {
        self.read_inner(|inner| inner.table.values().cloned().collect())
    }

    /// Every cached entity whose soft-delete flag is clear.
    pub fn select_active(&self) -> Vec<Arc<E>> {
        self.read_inner(|inner| {
            inner
                .table
                .values()
                .filter(|entry| !entry.is_deleted())
                .cloned()
                .collect()
        })
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.read_inner(|inner| {
            let mut stats = inner.stats.clone();
            stats.set_total_entries(inner.table.len());
            stats
        })
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.read_inner(|inner| inner.table.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_inner<T>(&self, f: impl FnOnce(&Inner<E>) -> T) -> T {
        f(&self.inner.read().expect("cache state poisoned"))
    }

    fn write_inner<T>(&self, f: impl FnOnce(&mut Inner<E>) -> T) -> T {
        f(&mut self.inner.write().expect("cache state poisoned"))
    }
}
