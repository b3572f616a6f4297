//! In-process verdict cache keyed by [`ClaimKey`].
//!
//! Entries expire after a configured age and the store is bounded: when an
//! insert pushes it past `max_entries`, exactly one entry (the oldest) is
//! evicted. Each instance owns its state; nothing here is global.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use factcheck_types::{ClaimKey, FactCheckVerdict};
use serde::Serialize;

struct CacheEntry {
    verdict: FactCheckVerdict,
    inserted_at: Instant,
    /// Insertion sequence; breaks timestamp ties deterministically.
    seq: u64,
}

struct CacheState {
    entries: HashMap<ClaimKey, CacheEntry>,
    next_seq: u64,
}

/// Verdict cache with expiry and oldest-first eviction.
pub struct VerdictCache {
    state: Mutex<CacheState>,
    expiry: Duration,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

/// Point-in-time view of cache occupancy and lookup counters.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsSnapshot {
    /// Stored verdicts, expired ones included until swept.
    pub entries: usize,
    /// Capacity enforced by oldest-first eviction.
    pub max_entries: usize,
    /// Age after which an entry is stale, in milliseconds.
    pub expiry_ms: u64,
    /// Counted lookups that returned a fresh verdict.
    pub hits: u64,
    /// Counted lookups that found nothing or an expired verdict.
    pub misses: u64,
    /// Entries removed to stay within `max_entries`.
    pub evictions: u64,
    /// `hits / (hits + misses)` as a percentage; 0 before any lookup.
    pub hit_rate_pct: f64,
}

impl VerdictCache {
    /// `max_entries` below 1 is treated as 1.
    pub fn new(expiry: Duration, max_entries: usize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                next_seq: 0,
            }),
            expiry,
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) > self.expiry
    }

    /// Cached verdict, or `None` when absent or older than the expiry.
    pub fn get(&self, key: &ClaimKey) -> Option<FactCheckVerdict> {
        let found = self.get_at(key, Instant::now());
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Like [`VerdictCache::get`] but without touching hit/miss counters.
    pub fn peek(&self, key: &ClaimKey) -> Option<FactCheckVerdict> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &ClaimKey, now: Instant) -> Option<FactCheckVerdict> {
        let mut state = self.lock();
        let entry = state.entries.get(key)?;
        if self.is_expired(entry, now) {
            state.entries.remove(key);
            return None;
        }
        Some(entry.verdict.clone())
    }

    /// Insert or overwrite; evicts the single oldest entry when over capacity.
    pub fn put(&self, key: ClaimKey, verdict: FactCheckVerdict) {
        self.put_at(key, verdict, Instant::now());
    }

    fn put_at(&self, key: ClaimKey, verdict: FactCheckVerdict, now: Instant) {
        let mut state = self.lock();
        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(
            key,
            CacheEntry {
                verdict,
                inserted_at: now,
                seq,
            },
        );
        if state.entries.len() <= self.max_entries {
            return;
        }
        if let Some(oldest_key) = state
            .entries
            .iter()
            .min_by_key(|(_, entry)| (entry.inserted_at, entry.seq))
            .map(|(key, _)| key.clone())
        {
            state.entries.remove(&oldest_key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                event = "factcheck.cache.evicted",
                max_entries = self.max_entries,
                "evicted oldest cached verdict"
            );
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Remove expired entries; returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    fn sweep_expired_at(&self, now: Instant) -> usize {
        let mut state = self.lock();
        let before = state.entries.len();
        state
            .entries
            .retain(|_, entry| now.saturating_duration_since(entry.inserted_at) <= self.expiry);
        before - state.entries.len()
    }

    /// Stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured staleness threshold.
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Current occupancy and counters; does not count as a lookup.
    pub fn stats(&self) -> CacheStatsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        #[allow(clippy::cast_precision_loss)]
        let hit_rate_pct = if lookups == 0 {
            0.0
        } else {
            (hits as f64 / lookups as f64) * 100.0
        };
        CacheStatsSnapshot {
            entries: self.len(),
            max_entries: self.max_entries,
            expiry_ms: u64::try_from(self.expiry.as_millis()).unwrap_or(u64::MAX),
            hits,
            misses,
            evictions: self.evictions.load(Ordering::Relaxed),
            hit_rate_pct,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/cache.rs"]
mod tests;
