#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

//! Shared fixtures for integration tests.

use std::sync::{Arc, Mutex};

use cprouter::control_point::{state, ControlPoint, Redirect, SegmentTable, State, Terminal, Transition};
use cprouter::handler::text;
use cprouter::registry::ContinuationRegistry;
use cprouter::router::{Application, Router};
use cprouter::{BoxHandler, CaseSensitivity, Message, RequestContext, ResponseSink, RouteFailure};
use http::Method;

/// root = { home, shop: { cart (terminal), index "shop" }, old -> /home }
pub fn shop_root() -> State {
    let shop = SegmentTable::new()
        .index_handler(text("shop"))
        .route("cart", state(Terminal::from_handler(text("cart"))));
    state(
        SegmentTable::new()
            .index_handler(text("root"))
            .route("Home", state(Terminal::from_handler(text("home"))))
            .route("shop", state(shop))
            .route("old", state(Redirect::new("/home"))),
    )
}

pub struct ShopApp {
    root: State,
}

impl ShopApp {
    pub fn new() -> Self {
        Self { root: shop_root() }
    }
}

impl Application for ShopApp {
    fn root(&self, _ctx: &RequestContext) -> State {
        Arc::clone(&self.root)
    }
}

pub fn shop_router(case: CaseSensitivity) -> Router<ShopApp> {
    Router::new(ShopApp::new(), Arc::new(ContinuationRegistry::default())).with_case_sensitivity(case)
}

/// Dispatch a GET and run the handler. Panics if the path is bypassed.
pub fn get<A: Application>(router: &Router<A>, path: &str) -> ResponseSink {
    let ctx = RequestContext::new(Method::GET, path);
    let handler = router
        .dispatch(&ctx)
        .expect("dispatch")
        .into_handler()
        .expect("path should be routable");
    let mut sink = ResponseSink::new();
    handler.process(&ctx, &mut sink);
    sink
}

pub fn body(sink: &ResponseSink) -> String {
    String::from_utf8(sink.body().to_vec()).expect("utf8 body")
}

/// Log of `(state name, segment)` pairs seen by [`Recording`] states.
pub type CallLog = Arc<Mutex<Vec<(String, String)>>>;

/// A state that records each transition and moves to the child named by the
/// segment, or yields `None` when no child matches.
pub struct Recording {
    pub name: String,
    pub children: Vec<(String, State)>,
    pub log: CallLog,
}

impl Recording {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            children: Vec::new(),
            log: Arc::clone(log),
        }
    }

    pub fn child(mut self, segment: &str, next: State) -> Self {
        self.children.push((segment.to_string(), next));
        self
    }
}

impl ControlPoint for Recording {
    fn next(&self, msg: &Message<'_>) -> Transition {
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), msg.segment().to_string()));
        Ok(self
            .children
            .iter()
            .find(|(segment, _)| msg.is(segment))
            .map(|(_, next)| Arc::clone(next)))
    }

    fn handler(&self, _ctx: &RequestContext) -> Result<BoxHandler, RouteFailure> {
        Ok(Box::new(text(format!("at {}", self.name))))
    }
}
