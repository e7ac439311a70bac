#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end timing behavior of the autosave scheduler against real time.
//!
//! Short intervals and generous margins keep these deterministic on slow
//! machines while still pinning the firing cadence down to the second.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use savetick::{IntervalStore, SaveAction, SaveInterval, SaveScheduler};

fn counting_scheduler(
    interval: SaveInterval,
    dir: &tempfile::TempDir,
) -> (SaveScheduler, Arc<AtomicUsize>) {
    let fires = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fires);
    let action: SaveAction = Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    let store = IntervalStore::new(dir.path().join("refresh.toml"));
    (SaveScheduler::new(interval, store, action), fires)
}

#[tokio::test]
async fn fires_on_the_configured_cadence() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (scheduler, fires) = counting_scheduler(SaveInterval::new(0, 1), &dir);

    scheduler.start().expect("start");

    // Fires land at +1s and +2s; sample in between the second and third.
    tokio::time::sleep(Duration::from_millis(2_600)).await;
    assert_eq!(fires.load(Ordering::SeqCst), 2);

    scheduler.stop().await;
    // Plus the mandated final save on shutdown.
    assert_eq!(fires.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn reconfigure_before_the_first_fire_resets_the_wait() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (scheduler, fires) = counting_scheduler(SaveInterval::new(0, 1), &dir);

    scheduler.start().expect("start");
    tokio::time::sleep(Duration::from_millis(400)).await;

    // Re-arming at +0.4s pushes the first fire from +1s out to +2.4s.
    scheduler.reconfigure(SaveInterval::new(0, 2));

    tokio::time::sleep(Duration::from_millis(1_500)).await; // t ≈ 1.9s
    assert_eq!(
        fires.load(Ordering::SeqCst),
        0,
        "stale one-second wait must not fire"
    );

    tokio::time::sleep(Duration::from_millis(1_100)).await; // t ≈ 3.0s
    assert_eq!(fires.load(Ordering::SeqCst), 1);

    scheduler.stop().await;
}

#[tokio::test]
async fn runtime_reconfigures_are_durable_across_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (scheduler, _fires) = counting_scheduler(SaveInterval::new(10, 0), &dir);

    scheduler.start().expect("start");
    scheduler.reconfigure(SaveInterval::new(0, 125));
    scheduler.stop().await;

    // A fresh process would boot from the same record.
    let store = IntervalStore::new(dir.path().join("refresh.toml"));
    assert_eq!(store.load_or_init(), SaveInterval::new(2, 5));

    let (restarted, _fires) = counting_scheduler(store.load_or_init(), &dir);
    assert_eq!(restarted.interval(), SaveInterval::new(2, 5));
}
