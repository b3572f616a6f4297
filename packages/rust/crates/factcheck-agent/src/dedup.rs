//! In-flight request deduplication (single flight per [`ClaimKey`]).
//!
//! The first caller for a key becomes the leader and runs the producer.
//! Callers arriving while it runs join and receive the leader's outcome over
//! a `watch` channel. The registration is removed as soon as the leader
//! settles, whether it succeeded, failed or was cancelled.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use factcheck_types::{ClaimKey, FactCheckError, FactCheckResult, FactCheckVerdict};
use tokio::sync::watch;

type Outcome<T> = Option<FactCheckResult<T>>;

struct InFlightRequest<T> {
    tx: watch::Sender<Outcome<T>>,
}

type InFlightMap<T> = Arc<Mutex<HashMap<ClaimKey, Arc<InFlightRequest<T>>>>>;

/// Registry of outstanding producers, one per key.
pub struct RequestDeduplicator<T = FactCheckVerdict> {
    inflight: InFlightMap<T>,
    joined: AtomicU64,
}

impl<T> Default for RequestDeduplicator<T> {
    fn default() -> Self {
        Self {
            inflight: Arc::new(Mutex::new(HashMap::new())),
            joined: AtomicU64::new(0),
        }
    }
}

fn lock_map<T>(
    map: &Mutex<HashMap<ClaimKey, Arc<InFlightRequest<T>>>>,
) -> MutexGuard<'_, HashMap<ClaimKey, Arc<InFlightRequest<T>>>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Clone> RequestDeduplicator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `producer` unless a producer for `key` is already in flight, in
    /// which case wait for and return its outcome instead.
    pub async fn run_exclusive<F, Fut>(&self, key: &ClaimKey, producer: F) -> FactCheckResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FactCheckResult<T>>,
    {
        let (inflight, is_leader) = {
            let mut map = lock_map(&self.inflight);
            if let Some(existing) = map.get(key) {
                (Arc::clone(existing), false)
            } else {
                let (tx, _rx) = watch::channel(None);
                let created = Arc::new(InFlightRequest { tx });
                map.insert(key.clone(), Arc::clone(&created));
                (created, true)
            }
        };

        if !is_leader {
            self.joined.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                event = "factcheck.dedup.joined",
                "joined in-flight fact-check request"
            );
            return wait_for_leader(&inflight).await;
        }

        let guard = LeaderGuard {
            key: key.clone(),
            inflight_map: Arc::clone(&self.inflight),
            inflight,
            completed: false,
        };
        let result = producer().await;
        guard.complete(result)
    }

    pub fn is_in_flight(&self, key: &ClaimKey) -> bool {
        lock_map(&self.inflight).contains_key(key)
    }

    pub fn in_flight_count(&self) -> usize {
        lock_map(&self.inflight).len()
    }

    /// Callers that reused another caller's in-flight request.
    pub fn joined_total(&self) -> u64 {
        self.joined.load(Ordering::Relaxed)
    }
}

async fn wait_for_leader<T: Clone>(inflight: &InFlightRequest<T>) -> FactCheckResult<T> {
    let mut rx = inflight.tx.subscribe();
    loop {
        let published = rx.borrow_and_update().clone();
        if let Some(result) = published {
            return result;
        }
        if rx.changed().await.is_err() {
            return Err(FactCheckError::no_response(
                "in-flight fact-check request ended without a result",
            ));
        }
    }
}

/// Removes the registration and publishes an outcome exactly once, even when
/// the leader future is dropped before finishing.
struct LeaderGuard<T> {
    key: ClaimKey,
    inflight_map: InFlightMap<T>,
    inflight: Arc<InFlightRequest<T>>,
    completed: bool,
}

impl<T> LeaderGuard<T> {
    fn unregister(&self) {
        let mut map = lock_map(&self.inflight_map);
        if map
            .get(&self.key)
            .is_some_and(|current| Arc::ptr_eq(current, &self.inflight))
        {
            map.remove(&self.key);
        }
    }
}

impl<T: Clone> LeaderGuard<T> {
    fn complete(mut self, result: FactCheckResult<T>) -> FactCheckResult<T> {
        self.completed = true;
        self.unregister();
        self.inflight.tx.send_replace(Some(result.clone()));
        result
    }
}

impl<T> Drop for LeaderGuard<T> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        self.unregister();
        tracing::warn!(
            event = "factcheck.dedup.leader_cancelled",
            "fact-check leader dropped before completing"
        );
        self.inflight.tx.send_replace(Some(Err(FactCheckError::no_response(
            "fact-check request was cancelled",
        ))));
    }
}

#[cfg(test)]
#[path = "../tests/unit/dedup.rs"]
mod tests;
