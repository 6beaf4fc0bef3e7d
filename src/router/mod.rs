//! # Router Module
//!
//! The dispatch loop. A request path is tokenized into segments, each
//! segment is fed as a [`Message`](crate::message::Message) to the current
//! [`ControlPoint`](crate::control_point::ControlPoint), and the state
//! reached after the last segment is materialized into the response handler.
//!
//! ## Traversal
//!
//! 1. Clear the request's validation errors.
//! 2. Classify the path ([`Application::route_verdict`]); static assets
//!    yield [`Dispatch::Bypass`].
//! 3. Start at [`Application::root`]. A path of the form
//!    `/<marker>/<key>/...` (marker `x` by default) starts at a
//!    [`ClosureLookup`](crate::control_point::ClosureLookup) for `key`
//!    instead; the key segment is its first message.
//! 4. Feed every remaining segment left to right. When a state has no
//!    successor, continue with [`Application::translate_null`] (404 by
//!    default), so a terminal reached early funnels the rest of the path
//!    into not-found.
//! 5. Materialize the final state.
//!
//! Failures raised in steps 3 to 5 are offered to [`recovery::recover`]; a
//! failure that cannot render itself is returned to the caller.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use cprouter::control_point::{state, SegmentTable, Terminal};
//! use cprouter::handler::text;
//! use cprouter::registry::ContinuationRegistry;
//! use cprouter::router::{root_fn, Router};
//! use cprouter::server::{RequestContext, ResponseSink};
//! use http::Method;
//!
//! let shop = state(
//!     SegmentTable::new()
//!         .index_handler(text("shop"))
//!         .route("cart", state(Terminal::from_handler(text("cart")))),
//! );
//! let root = state(SegmentTable::new().route("shop", shop));
//! let router = Router::new(
//!     root_fn(move |_| Arc::clone(&root)),
//!     Arc::new(ContinuationRegistry::default()),
//! );
//!
//! let ctx = RequestContext::new(Method::GET, "/Shop/cart");
//! let handler = router.dispatch(&ctx).unwrap().into_handler().unwrap();
//! let mut sink = ResponseSink::new();
//! handler.process(&ctx, &mut sink);
//! assert_eq!(sink.body(), b"cart");
//! ```

mod core;
pub mod recovery;

pub use self::core::{root_fn, Application, Dispatch, RootFn, Router};
