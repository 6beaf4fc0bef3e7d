#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Integration tests for the continuation registry
//!
//! # Test Coverage
//!
//! - one-time continuations resolve at most once
//! - expiry after the TTL
//! - factory key-space exhaustion
//! - resuming through the router, including segments after the key
//! - custom continuation kinds registered by the application

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use common::{body, get, shop_root};
use cprouter::control_point::{state, SegmentTable, Terminal};
use cprouter::handler::{handler_fn, text};
use cprouter::registry::{Continuation, ContinuationRegistry, RegistryConfig};
use cprouter::router::{root_fn, Router};
use cprouter::{RegistryError, RequestContext, ResponseSink};
use http::{Method, StatusCode};

fn render(state: &cprouter::State) -> ResponseSink {
    let ctx = RequestContext::new(Method::GET, "/");
    let mut sink = ResponseSink::new();
    state.handler(&ctx).unwrap().process(&ctx, &mut sink);
    sink
}

fn router_with(registry: Arc<ContinuationRegistry>) -> Router<impl cprouter::Application> {
    let root = shop_root();
    Router::new(root_fn(move |_| Arc::clone(&root)), registry)
}

#[test]
fn test_continuation_resolves_at_most_once() {
    let registry = ContinuationRegistry::default();
    let key = registry.mint_handler(text("once")).unwrap();
    assert_eq!(key.len(), 13);

    let first = registry.resolve(&key).expect("first resolve succeeds");
    assert_eq!(render(&first).body(), b"once");
    assert!(registry.resolve(&key).is_none());
    assert_eq!(registry.live_continuations(), 0);
}

#[test]
fn test_continuation_expires_after_ttl() {
    let registry = ContinuationRegistry::default();
    let key = registry.mint_with_ttl(
        Continuation::from_handler(text("late")),
        Duration::from_millis(20),
    )
    .unwrap();
    thread::sleep(Duration::from_millis(60));
    assert!(registry.resolve(&key).is_none());
}

#[test]
fn test_configured_ttl_applies_to_mint() {
    let registry = ContinuationRegistry::new(RegistryConfig::new(3, 10, Duration::from_millis(20)));
    let key = registry.mint_handler(text("late")).unwrap();
    thread::sleep(Duration::from_millis(60));
    assert!(registry.resolve(&key).is_none());
    assert_eq!(registry.purge_expired(), 0);
}

#[test]
fn test_purge_removes_unconsumed_expired_entries() {
    let registry = ContinuationRegistry::new(RegistryConfig::new(3, 10, Duration::from_millis(10)));
    for _ in 0..5 {
        let _key = registry.mint_handler(text("never used")).unwrap();
    }
    assert_eq!(registry.live_continuations(), 5);
    thread::sleep(Duration::from_millis(40));
    assert_eq!(registry.purge_expired(), 5);
    assert_eq!(registry.live_continuations(), 0);
}

#[test]
fn test_factory_key_space_exhaustion() {
    // Width 1: 62 keys, one already used by the built-in one-time kind.
    let registry = ContinuationRegistry::new(RegistryConfig::new(1, 10, Duration::from_secs(60)));
    assert_eq!(registry.factory_count(), 1);

    let mut keys = vec![registry.one_time_factory_key().to_string()];
    for _ in 0..61 {
        keys.push(registry.register_factory(|_| None).expect("capacity remains"));
    }
    assert_eq!(registry.factory_count(), 62);

    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 62, "factory keys must be distinct");

    assert_eq!(
        registry.register_factory(|_| None),
        Err(RegistryError::Exhausted { capacity: 62 })
    );
}

#[test]
fn test_resume_through_router_consumes_link() {
    let registry = Arc::new(ContinuationRegistry::default());
    let router = router_with(Arc::clone(&registry));
    let key = registry.mint_handler(text("order confirmed")).unwrap();

    let first = get(&router, &format!("/x/{key}"));
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body(&first), "order confirmed");

    let replay = get(&router, &format!("/x/{key}"));
    assert_eq!(replay.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(&replay), "not found");
}

#[test]
fn test_unknown_key_is_not_found() {
    let registry = Arc::new(ContinuationRegistry::default());
    let router = router_with(registry);
    assert_eq!(get(&router, "/x/short").status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&router, "/x/ab").status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_resume_key_lookup_ignores_case_policy() {
    let registry = Arc::new(ContinuationRegistry::default());
    let router = router_with(Arc::clone(&registry));
    let key = registry.mint_handler(text("exact")).unwrap();

    let flipped: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect();
    if flipped != key {
        assert_eq!(get(&router, &format!("/x/{flipped}")).status(), StatusCode::NOT_FOUND);
    }
    assert_eq!(body(&get(&router, &format!("/x/{key}"))), "exact");
}

#[test]
fn test_segments_after_key_continue_into_next_state() {
    let registry = Arc::new(ContinuationRegistry::default());
    let router = router_with(Arc::clone(&registry));

    let step_two = state(
        SegmentTable::new().route("confirm", state(Terminal::from_handler(text("confirmed")))),
    );
    let key = registry.mint_handler_then(text("review"), step_two).unwrap();
    assert_eq!(body(&get(&router, &format!("/x/{key}/confirm"))), "confirmed");

    let plain = registry.mint_handler(text("no next")).unwrap();
    assert_eq!(
        get(&router, &format!("/x/{plain}/more")).status(),
        StatusCode::NOT_FOUND
    );
}

#[test]
fn test_mint_state_resumes_into_state() {
    let registry = Arc::new(ContinuationRegistry::default());
    let router = router_with(Arc::clone(&registry));
    let key = registry.mint_state(shop_root()).unwrap();

    assert_eq!(body(&get(&router, &format!("/x/{key}/shop/cart"))), "cart");
    assert_eq!(get(&router, &format!("/x/{key}/shop/cart")).status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_continuation_handler_sees_resuming_request() {
    let registry = Arc::new(ContinuationRegistry::default());
    let router = router_with(Arc::clone(&registry));
    let key = registry.mint(Continuation::new(|ctx| {
        let who = ctx.param("who").unwrap_or("nobody").to_string();
        Ok(Box::new(handler_fn(move |_, sink| sink.write_str(&who))) as cprouter::BoxHandler)
    }))
    .unwrap();
    assert_eq!(body(&get(&router, &format!("/x/{key}?who=ada"))), "ada");
}

#[test]
fn test_custom_kind_is_reusable() {
    // A multi-use kind: instance keys name catalogue entries.
    let catalogue: Arc<Mutex<HashMap<String, String>>> = Arc::new(Mutex::new(HashMap::from([(
        "tea".to_string(),
        "green tea".to_string(),
    )])));
    let registry = Arc::new(ContinuationRegistry::default());
    let lookup = Arc::clone(&catalogue);
    let kind = registry
        .register_factory(move |instance| {
            let item = lookup.lock().unwrap().get(instance).cloned()?;
            Some(Continuation::from_handler(text(item)))
        })
        .unwrap();

    let router = router_with(Arc::clone(&registry));
    assert_eq!(body(&get(&router, &format!("/x/{kind}tea"))), "green tea");
    assert_eq!(body(&get(&router, &format!("/x/{kind}tea"))), "green tea");
    assert_eq!(get(&router, &format!("/x/{kind}coffee")).status(), StatusCode::NOT_FOUND);
}
