use super::*;

use std::sync::atomic::AtomicUsize;
use std::time::Duration;

use tokio::sync::Notify;

fn key(text: &str) -> ClaimKey {
    ClaimKey::normalize(text)
}

#[tokio::test]
async fn concurrent_callers_share_one_producer_run() {
    let dedup = Arc::new(RequestDeduplicator::<u32>::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let release = Arc::new(Notify::new());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let dedup = Arc::clone(&dedup);
        let calls = Arc::clone(&calls);
        let release = Arc::clone(&release);
        handles.push(tokio::spawn(async move {
            dedup
                .run_exclusive(&key("same claim"), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    release.notified().await;
                    Ok(42)
                })
                .await
        }));
    }

    // Let every task register before the leader finishes.
    while dedup.joined_total() < 7 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(dedup.is_in_flight(&key("Same Claim")));
    release.notify_one();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Ok(42));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(dedup.in_flight_count(), 0);
}

#[tokio::test]
async fn failure_is_shared_and_registration_released() {
    let dedup = Arc::new(RequestDeduplicator::<u32>::new());
    let release = Arc::new(Notify::new());

    let leader = {
        let dedup = Arc::clone(&dedup);
        let release = Arc::clone(&release);
        tokio::spawn(async move {
            dedup
                .run_exclusive(&key("k"), || async move {
                    release.notified().await;
                    Err(FactCheckError::upstream(503, "unavailable"))
                })
                .await
        })
    };
    while !dedup.is_in_flight(&key("k")) {
        tokio::task::yield_now().await;
    }
    let waiter = {
        let dedup = Arc::clone(&dedup);
        tokio::spawn(async move {
            dedup
                .run_exclusive(&key("k"), || async { Ok(1) })
                .await
        })
    };
    while dedup.joined_total() < 1 {
        tokio::task::yield_now().await;
    }
    release.notify_one();

    let expected = Err(FactCheckError::upstream(503, "unavailable"));
    assert_eq!(leader.await.unwrap(), expected);
    assert_eq!(waiter.await.unwrap(), expected);
    assert!(!dedup.is_in_flight(&key("k")));

    // A later call runs its own producer.
    let retried = dedup.run_exclusive(&key("k"), || async { Ok(7) }).await;
    assert_eq!(retried, Ok(7));
}

#[tokio::test]
async fn distinct_keys_do_not_block_each_other() {
    let dedup = RequestDeduplicator::<&'static str>::new();
    let (ka, kb) = (key("a"), key("b"));
    let (a, b) = tokio::join!(
        dedup.run_exclusive(&ka, || async { Ok("a") }),
        dedup.run_exclusive(&kb, || async { Ok("b") }),
    );
    assert_eq!(a, Ok("a"));
    assert_eq!(b, Ok("b"));
    assert_eq!(dedup.joined_total(), 0);
}

#[tokio::test]
async fn cancelled_leader_unblocks_waiters() {
    let dedup = Arc::new(RequestDeduplicator::<u32>::new());

    let leader = {
        let dedup = Arc::clone(&dedup);
        tokio::spawn(async move {
            dedup
                .run_exclusive(&key("slow"), || async {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(0)
                })
                .await
        })
    };
    while !dedup.is_in_flight(&key("slow")) {
        tokio::task::yield_now().await;
    }
    let waiter = {
        let dedup = Arc::clone(&dedup);
        tokio::spawn(async move {
            dedup
                .run_exclusive(&key("slow"), || async { Ok(1) })
                .await
        })
    };
    while dedup.joined_total() < 1 {
        tokio::task::yield_now().await;
    }

    leader.abort();
    let outcome = waiter.await.unwrap();
    assert!(matches!(outcome, Err(FactCheckError::Upstream { status: None, .. })));
    assert_eq!(dedup.in_flight_count(), 0);
}
