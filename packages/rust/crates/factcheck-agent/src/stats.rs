//! Usage counters for the fact-check orchestrator.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use factcheck_types::Rating;
use serde::Serialize;

/// Counters updated once per external call outcome, not per waiter.
#[derive(Default)]
pub(crate) struct CheckStats {
    completed: AtomicU64,
    upstream_failures: AtomicU64,
    by_rating: [AtomicU64; Rating::ALL.len()],
}

/// Point-in-time view of orchestrator activity.
#[derive(Debug, Clone, Serialize)]
pub struct CheckStatsSnapshot {
    /// Verdicts produced from external calls.
    pub total_checks: u64,
    /// Verdict count per overall rating (every rating listed, zero included).
    pub ratings: BTreeMap<Rating, u64>,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_entries: usize,
    /// Callers served by another caller's in-flight request.
    pub joined_in_flight: u64,
    pub upstream_failures: u64,
}

fn rating_slot(rating: Rating) -> usize {
    Rating::ALL
        .iter()
        .position(|candidate| *candidate == rating)
        .unwrap_or(Rating::ALL.len() - 1)
}

impl CheckStats {
    pub(crate) fn record_verdict(&self, rating: Rating) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.by_rating[rating_slot(rating)].fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_upstream_failure(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(
        &self,
        cache_hits: u64,
        cache_misses: u64,
        cache_entries: usize,
        joined_in_flight: u64,
    ) -> CheckStatsSnapshot {
        let ratings = Rating::ALL
            .into_iter()
            .zip(&self.by_rating)
            .map(|(rating, count)| (rating, count.load(Ordering::Relaxed)))
            .collect();
        CheckStatsSnapshot {
            total_checks: self.completed.load(Ordering::Relaxed),
            ratings,
            cache_hits,
            cache_misses,
            cache_entries,
            joined_in_flight,
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
        }
    }
}
