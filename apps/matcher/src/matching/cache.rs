//! Match Cache: fingerprint-keyed `MatchRecord`s with TTL and single-flight.
//!
//! A miss installs an in-flight slot holding a shared handle to a spawned
//! computation; concurrent requests for the same fingerprint await that same
//! handle. The computation runs on its own task, so a requester that goes
//! away does not cancel it and its result is still cached. Failures clear the
//! slot and are never stored.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tracing::{debug, info};

use super::durable::DurableCache;
use super::error::{ErrorKind, MatchError, Stage};
use super::fingerprint::CacheKey;
use crate::clock::Clock;
use crate::models::match_record::MatchRecord;

/// Expired entries are swept on a miss once the table grows past this.
const SWEEP_THRESHOLD: usize = 4096;

type SharedCompute = Shared<BoxFuture<'static, Result<MatchRecord, MatchError>>>;

enum Slot {
    Ready {
        key: CacheKey,
        record: MatchRecord,
        expires_at: DateTime<Utc>,
    },
    InFlight {
        key: CacheKey,
        generation: u64,
        future: SharedCompute,
    },
}

impl Slot {
    fn key(&self) -> &CacheKey {
        match self {
            Slot::Ready { key, .. } | Slot::InFlight { key, .. } => key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub in_flight: usize,
    pub hits: u64,
    pub misses: u64,
    pub joins: u64,
}

struct CacheInner {
    slots: Mutex<HashMap<String, Slot>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
    durable: Option<Arc<dyn DurableCache>>,
    next_generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    joins: AtomicU64,
}

impl CacheInner {
    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Settles the in-flight slot installed under `generation`. A slot that was
    /// invalidated or replaced in the meantime is left alone.
    fn finish(&self, fingerprint: &str, generation: u64, result: &Result<MatchRecord, MatchError>) {
        let mut slots = self.slots();
        let current = matches!(
            slots.get(fingerprint),
            Some(Slot::InFlight { generation: g, .. }) if *g == generation
        );
        if !current {
            return;
        }

        match result {
            Ok(record) => {
                if let Some(Slot::InFlight { key, .. }) = slots.remove(fingerprint) {
                    slots.insert(
                        fingerprint.to_string(),
                        Slot::Ready {
                            key,
                            record: record.clone(),
                            expires_at: self.clock.now() + self.ttl,
                        },
                    );
                }
            }
            Err(_) => {
                slots.remove(fingerprint);
            }
        }
    }
}

#[derive(Clone)]
pub struct MatchCache {
    inner: Arc<CacheInner>,
}

impl MatchCache {
    pub fn new(
        ttl: chrono::Duration,
        clock: Arc<dyn Clock>,
        durable: Option<Arc<dyn DurableCache>>,
    ) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                slots: Mutex::new(HashMap::new()),
                ttl,
                clock,
                durable,
                next_generation: AtomicU64::new(0),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                joins: AtomicU64::new(0),
            }),
        }
    }

    /// Returns the cached record for `key`, joins a computation already in
    /// flight for it, or starts `compute` and caches its successful result.
    ///
    /// `compute` is only called on a miss. It must carry its own deadline:
    /// the slot stays in flight until the returned future settles.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &CacheKey,
        compute: F,
    ) -> Result<MatchRecord, MatchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<MatchRecord, MatchError>> + Send + 'static,
    {
        let fingerprint = key.fingerprint();
        let now = self.inner.clock.now();

        let shared = {
            let mut slots = self.inner.slots();
            let joined = match slots.get(&fingerprint) {
                Some(Slot::Ready {
                    record, expires_at, ..
                }) if *expires_at > now => {
                    self.inner.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(subject = %key.subject(), "Match cache hit");
                    return Ok(record.clone());
                }
                Some(Slot::InFlight { future, .. }) => Some(future.clone()),
                _ => None,
            };

            match joined {
                Some(future) => {
                    self.inner.joins.fetch_add(1, Ordering::Relaxed);
                    debug!(subject = %key.subject(), "Joining in-flight match computation");
                    future
                }
                None => {
                    self.inner.misses.fetch_add(1, Ordering::Relaxed);
                    debug!(subject = %key.subject(), "Match cache miss");
                    if slots.len() >= SWEEP_THRESHOLD {
                        slots.retain(|_, slot| match slot {
                            Slot::Ready { expires_at, .. } => *expires_at > now,
                            Slot::InFlight { .. } => true,
                        });
                    }

                    let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
                    let future = self.spawn(key, fingerprint.clone(), generation, compute());
                    slots.insert(
                        fingerprint,
                        Slot::InFlight {
                            key: key.clone(),
                            generation,
                            future: future.clone(),
                        },
                    );
                    future
                }
            }
        };

        shared.await
    }

    fn spawn<Fut>(
        &self,
        key: &CacheKey,
        fingerprint: String,
        generation: u64,
        work: Fut,
    ) -> SharedCompute
    where
        Fut: Future<Output = Result<MatchRecord, MatchError>> + Send + 'static,
    {
        let inner = self.inner.clone();
        let subject = key.subject();
        let task_subject = subject.clone();

        let handle = tokio::spawn(async move {
            let durable_hit = match &inner.durable {
                Some(durable) => durable.get(&fingerprint).await,
                None => None,
            };

            let result = match durable_hit {
                Some(record) => {
                    debug!(subject = %task_subject, "Match served from durable cache");
                    Ok(record)
                }
                None => {
                    let result = AssertUnwindSafe(work)
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|_| {
                            Err(MatchError::new(
                                ErrorKind::Internal,
                                Stage::Cache,
                                &task_subject,
                                "match computation panicked",
                            ))
                        });
                    if let (Ok(record), Some(durable)) = (&result, &inner.durable) {
                        durable.put(&fingerprint, record, inner.ttl).await;
                    }
                    result
                }
            };

            inner.finish(&fingerprint, generation, &result);
            result
        });

        async move {
            handle.await.unwrap_or_else(|e| {
                Err(MatchError::new(ErrorKind::Internal, Stage::Cache, subject, e))
            })
        }
        .boxed()
        .shared()
    }

    /// Drops every entry built under a different taxonomy or scorer version.
    /// Returns how many entries were removed.
    pub fn invalidate_versions(&self, taxonomy_version: u64, scorer_version: &str) -> usize {
        let mut slots = self.inner.slots();
        let before = slots.len();
        slots.retain(|_, slot| {
            let key = slot.key();
            key.taxonomy_version == taxonomy_version && key.scorer_version == scorer_version
        });
        let removed = before - slots.len();
        info!(
            taxonomy_version,
            scorer_version, removed, "Match cache invalidated stale versions"
        );
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let slots = self.inner.slots();
        let in_flight = slots
            .values()
            .filter(|slot| matches!(slot, Slot::InFlight { .. }))
            .count();
        CacheStats {
            entries: slots.len() - in_flight,
            in_flight,
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            joins: self.inner.joins.load(Ordering::Relaxed),
        }
    }
}
