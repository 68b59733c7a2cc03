//! Concurrent writers against the in-memory store.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::arithmetic_side_effects
)]

use std::sync::Arc;
use std::time::Duration;

use calendar_core::{Context, Event, MemoryStore, Repository, StorageError};
use chrono::{DateTime, TimeZone, Utc};

const SLOT: Duration = Duration::from_secs(1800);

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 3, 0, 0, 0).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn disjoint_concurrent_creates_all_succeed() {
    let store = Arc::new(MemoryStore::new());
    let mut handles = Vec::new();

    for slot in 0..32_u32 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let start = base() + chrono::TimeDelta::minutes(i64::from(slot) * 30);
            store
                .create_event(
                    &Context::background(),
                    Event::new(format!("e{slot}"), "u1", start, SLOT),
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let day = store
        .list_day(&Context::background(), "u1", base())
        .await
        .unwrap();
    assert_eq!(day.len(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_concurrent_creates_admit_exactly_one() {
    let store = Arc::new(MemoryStore::new());
    let mut handles = Vec::new();

    for attempt in 0..16_u32 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            // Staggered starts, all inside each other's hour.
            let start = base() + chrono::TimeDelta::minutes(i64::from(attempt));
            store
                .create_event(
                    &Context::background(),
                    Event::new(format!("e{attempt}"), "u1", start, Duration::from_secs(3600)),
                )
                .await
        }));
    }

    let mut won = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => won += 1,
            Err(StorageError::DateBusy) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(won, 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn invariant_holds_after_mixed_writes() {
    let store = Arc::new(MemoryStore::new());
    let mut handles = Vec::new();

    for n in 0..48_u32 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let ctx = Context::background();
            let start = base() + chrono::TimeDelta::minutes(i64::from(n % 12) * 20);
            let event = Event::new(format!("e{}", n % 16), "u1", start, SLOT);
            if n % 3 == 0 {
                let _ = store.update_event(&ctx, event).await;
            } else {
                let _ = store.create_event(&ctx, event).await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let events = store
        .list_day(&Context::background(), "u1", base())
        .await
        .unwrap();
    for (i, a) in events.iter().enumerate() {
        for b in &events[i + 1..] {
            assert!(!a.overlaps(b), "{} overlaps {}", a.id, b.id);
        }
    }
}
