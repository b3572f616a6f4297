use super::*;

use factcheck_types::Rating;

fn verdict(summary: &str) -> FactCheckVerdict {
    let mut verdict = FactCheckVerdict::unverifiable(summary, summary);
    verdict.overall_rating = Rating::Mixed;
    verdict
}

fn key(text: &str) -> ClaimKey {
    ClaimKey::normalize(text)
}

#[test]
fn round_trip_until_expiry() {
    let cache = VerdictCache::new(Duration::from_secs(60), 10);
    let start = Instant::now();
    cache.put_at(key("claim a"), verdict("a"), start);

    let fresh = cache.get_at(&key("Claim A "), start + Duration::from_secs(60));
    assert_eq!(fresh.map(|v| v.summary), Some("a".to_string()));

    let stale = cache.get_at(&key("claim a"), start + Duration::from_secs(61));
    assert!(stale.is_none());
    assert_eq!(cache.len(), 0, "expired entry is dropped on read");
}

#[test]
fn overwrite_resets_timestamp() {
    let cache = VerdictCache::new(Duration::from_secs(10), 10);
    let start = Instant::now();
    cache.put_at(key("k"), verdict("old"), start);
    cache.put_at(key("k"), verdict("new"), start + Duration::from_secs(8));
    let value = cache.get_at(&key("k"), start + Duration::from_secs(15));
    assert_eq!(value.map(|v| v.summary), Some("new".to_string()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn eviction_removes_exactly_the_oldest() {
    let cache = VerdictCache::new(Duration::from_secs(3600), 3);
    let start = Instant::now();
    for (offset, text) in [(2, "b"), (0, "a"), (5, "c")] {
        cache.put_at(key(text), verdict(text), start + Duration::from_secs(offset));
    }
    assert_eq!(cache.len(), 3);

    cache.put_at(key("d"), verdict("d"), start + Duration::from_secs(6));
    assert_eq!(cache.len(), 3);
    let now = start + Duration::from_secs(7);
    assert!(cache.get_at(&key("a"), now).is_none());
    for text in ["b", "c", "d"] {
        assert!(cache.get_at(&key(text), now).is_some(), "{text} kept");
    }
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn eviction_ties_break_by_insertion_order() {
    let cache = VerdictCache::new(Duration::from_secs(3600), 2);
    let same = Instant::now();
    cache.put_at(key("first"), verdict("first"), same);
    cache.put_at(key("second"), verdict("second"), same);
    cache.put_at(key("third"), verdict("third"), same);
    assert!(cache.get_at(&key("first"), same).is_none());
    assert!(cache.get_at(&key("second"), same).is_some());
    assert!(cache.get_at(&key("third"), same).is_some());
}

#[test]
fn sweep_removes_only_expired_and_is_idempotent() {
    let cache = VerdictCache::new(Duration::from_secs(100), 10);
    let start = Instant::now();
    cache.put_at(key("old"), verdict("old"), start);
    cache.put_at(key("new"), verdict("new"), start + Duration::from_secs(90));

    let later = start + Duration::from_secs(150);
    assert_eq!(cache.sweep_expired_at(later), 1);
    assert_eq!(cache.sweep_expired_at(later), 0);
    assert_eq!(cache.len(), 1);
    assert!(cache.get_at(&key("new"), later).is_some());
}

#[test]
fn clear_empties_the_store() {
    let cache = VerdictCache::new(Duration::from_secs(100), 10);
    cache.put(key("x"), verdict("x"));
    cache.put(key("y"), verdict("y"));
    cache.clear();
    assert!(cache.is_empty());
    assert!(cache.get(&key("x")).is_none());
}

#[test]
fn zero_capacity_keeps_one_entry() {
    let cache = VerdictCache::new(Duration::from_secs(100), 0);
    cache.put(key("x"), verdict("x"));
    cache.put(key("y"), verdict("y"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn stats_count_hits_and_misses() {
    let cache = VerdictCache::new(Duration::from_secs(100), 10);
    cache.put(key("x"), verdict("x"));
    assert!(cache.get(&key("x")).is_some());
    assert!(cache.get(&key("missing")).is_none());
    assert!(cache.peek(&key("x")).is_some());

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
    assert!((stats.hit_rate_pct - 50.0).abs() < f64::EPSILON);
}
