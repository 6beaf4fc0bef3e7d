#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Concurrency tests for the shared continuation registry
//!
//! Threads race on the same instance key and on factory registration; the
//! registry must hand each continuation to exactly one caller and never
//! assign a factory key twice.

mod common;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use common::{body, get, shop_root};
use cprouter::handler::text;
use cprouter::registry::{ContinuationRegistry, RegistryConfig};
use cprouter::router::{root_fn, Router};
use http::StatusCode;

const THREADS: usize = 8;

#[test]
fn test_racing_resolves_deliver_once() {
    let registry = Arc::new(ContinuationRegistry::default());

    for _ in 0..50 {
        let key = Arc::new(registry.mint_handler(text("prize")).unwrap());
        let barrier = Arc::new(Barrier::new(THREADS));
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let key = Arc::clone(&key);
                let barrier = Arc::clone(&barrier);
                let winners = Arc::clone(&winners);
                thread::spawn(move || {
                    barrier.wait();
                    if registry.resolve(&key).is_some() {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn test_racing_requests_through_router() {
    let registry = Arc::new(ContinuationRegistry::default());
    let root = shop_root();
    let router = Arc::new(Router::new(
        root_fn(move |_| Arc::clone(&root)),
        Arc::clone(&registry),
    ));
    let path = Arc::new(format!("/x/{}", registry.mint_handler(text("once only")).unwrap()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let router = Arc::clone(&router);
            let path = Arc::clone(&path);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let sink = get(router.as_ref(), &path);
                (sink.status(), body(&sink))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let ok: Vec<_> = results.iter().filter(|(status, _)| *status == StatusCode::OK).collect();
    assert_eq!(ok.len(), 1);
    assert_eq!(ok[0].1, "once only");
    assert_eq!(
        results
            .iter()
            .filter(|(status, _)| *status == StatusCode::NOT_FOUND)
            .count(),
        THREADS - 1
    );
}

#[test]
fn test_concurrent_mints_get_distinct_keys() {
    let registry = Arc::new(ContinuationRegistry::default());
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                (0..200)
                    .map(|_| registry.mint_handler(text("k")).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all = HashSet::new();
    for handle in handles {
        for key in handle.join().unwrap() {
            assert!(all.insert(key), "duplicate continuation key");
        }
    }
    assert_eq!(all.len(), THREADS * 200);
    assert_eq!(registry.live_continuations(), THREADS * 200);
}

#[test]
fn test_concurrent_registration_fills_key_space_exactly() {
    // Width 1 leaves 61 free keys; 8 threads x 10 attempts compete for them.
    let registry = Arc::new(ContinuationRegistry::new(RegistryConfig::new(
        1,
        10,
        Duration::from_secs(60),
    )));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..10)
                    .map(|_| registry.register_factory(|_| None))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut keys = HashSet::new();
    let mut exhausted = 0;
    for handle in handles {
        for result in handle.join().unwrap() {
            match result {
                Ok(key) => assert!(keys.insert(key), "factory key assigned twice"),
                Err(_) => exhausted += 1,
            }
        }
    }

    assert_eq!(keys.len(), 61);
    assert_eq!(exhausted, THREADS * 10 - 61);
    assert_eq!(registry.factory_count(), 62);
    assert!(!keys.contains(registry.one_time_factory_key()));
}
