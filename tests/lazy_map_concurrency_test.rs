//! Concurrency tests for the lazy maps
//!
//! Many workers hammer the same keys; every key must be fetched exactly once
//! and every worker must observe the same value for it.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use sitecache::adapters::cache::{AsyncMap, GetOptions, Map};

const WORKERS: usize = 20;
const KEYS: i32 = 100;

#[test]
fn test_blocking_workers_fetch_each_key_once() {
    common::setup_test_logging();
    let map: Map<i32, String, String> = Map::new();
    let calls = AtomicUsize::new(0);

    let results: Vec<Vec<String>> = thread::scope(|s| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|_| {
                s.spawn(|| {
                    (1..=KEYS)
                        .map(|key| {
                            map.get(
                                key,
                                |k| {
                                    thread::yield_now();
                                    Ok(format!("{k}:{}", calls.fetch_add(1, Ordering::SeqCst)))
                                },
                                GetOptions::new(),
                            )
                            .unwrap()
                        })
                        .collect::<Vec<String>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 100);
    assert_eq!(map.stats().fetches, 100);
    assert_eq!(map.len(), 100);
    for worker in &results[1..] {
        assert_eq!(worker, &results[0]);
    }
    for (index, value) in results[0].iter().enumerate() {
        assert!(value.starts_with(&format!("{}:", index + 1)));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_async_workers_fetch_each_key_once() {
    common::setup_test_logging();
    let map: Arc<AsyncMap<i32, String, String>> = Arc::new(AsyncMap::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let map = Arc::clone(&map);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                let mut seen = Vec::new();
                for key in 1..=KEYS {
                    let calls = Arc::clone(&calls);
                    let value = map
                        .get(
                            key,
                            move |k| async move {
                                tokio::task::yield_now().await;
                                Ok(format!("{k}:{}", calls.fetch_add(1, Ordering::SeqCst)))
                            },
                            GetOptions::new(),
                        )
                        .await
                        .unwrap();
                    seen.push(value);
                }
                seen
            })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 100);
    assert_eq!(map.stats().fetches, 100);
    for worker in &results[1..] {
        assert_eq!(worker, &results[0]);
    }
}

#[test]
fn test_refresh_is_not_clobbered_by_default_install() {
    let map: Map<i32, String, String> = Map::new();
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let shared = &map;

    thread::scope(|s| {
        let slow = s.spawn(move || {
            shared.get(
                1,
                |_| {
                    started_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    Err("store down".to_string())
                },
                GetOptions::new().default_value("fallback".to_string()),
            )
        });

        // The slow fetch now owns the original cell; refresh installs a new one.
        started_rx.recv().unwrap();
        let fresh = shared.get(1, |_| Ok("fresh".to_string()), GetOptions::new().refresh());
        assert_eq!(fresh, Ok("fresh".to_string()));

        release_tx.send(()).unwrap();
        assert_eq!(slow.join().unwrap(), Ok("fallback".to_string()));
    });

    assert_eq!(map.peek(&1), Some(Ok("fresh".to_string())));
    assert_eq!(
        map.get(1, |_| Ok("unused".to_string()), GetOptions::new()),
        Ok("fresh".to_string())
    );
}

#[test]
fn test_slow_key_does_not_block_other_keys() {
    let map: Map<i32, i32, String> = Map::new();
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let shared = &map;

    thread::scope(|s| {
        let slow = s.spawn(move || {
            shared.get(
                1,
                |_| {
                    started_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    Ok(1)
                },
                GetOptions::new(),
            )
        });

        started_rx.recv().unwrap();
        assert_eq!(shared.get(2, |_| Ok(2), GetOptions::new()), Ok(2));
        assert!(!shared.is_loaded(&1));

        release_tx.send(()).unwrap();
        assert_eq!(slow.join().unwrap(), Ok(1));
    });
}
