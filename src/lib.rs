//! # cprouter
//!
//! **cprouter** is a control-point request router: the segments of a request
//! path drive transitions through a server-side state machine, and any state
//! can mint one-time *continuations* addressed by an opaque URL key.
//!
//! ## Overview
//!
//! An application supplies a root [`ControlPoint`](control_point::ControlPoint).
//! For `/shop/cart/checkout` the router asks the root where `shop` leads, asks
//! that state where `cart` leads, and so on; the state reached after the last
//! segment is turned into the [`ResponseHandler`](handler::ResponseHandler)
//! for the request. A state with nowhere to go yields `None`, which the
//! application's `translate_null` hook turns into a 404 by default.
//!
//! Continuations let a page hand out a link that works exactly once, e.g. a
//! "confirm order" button: the page mints a continuation in the
//! [`ContinuationRegistry`](registry::ContinuationRegistry) and links to
//! `/x/<key>`. The first visit resumes it; later visits, or any visit after
//! the TTL, get the standard 404.
//!
//! ## Architecture
//!
//! - **[`path`]** - tokenizing paths and detecting static-asset requests
//! - **[`message`]** - one segment plus its request, and the case policy
//! - **[`control_point`]** - the state trait and its built-in variants
//! - **[`registry`]** - factory keys, the TTL store, one-time continuations
//! - **[`router`]** - the dispatch loop and error recovery
//! - **[`handler`]** - response handlers and their named constructors
//! - **[`server`]** - request context, response sink and the `http` adapter
//! - **[`error`]** - routing failures and registry errors
//! - **[`runtime_config`]** / **[`logging`]** - startup configuration
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
//! use cprouter::server::RoutingService;
//!
//! let registry = Arc::new(ContinuationRegistry::default());
//! let thanks = registry.mint_handler(text("order confirmed")).unwrap();
//!
//! let root = state(
//!     SegmentTable::new()
//!         .index_handler(text("welcome"))
//!         .route("about", state(Terminal::from_handler(text("about us")))),
//! );
//! let service = RoutingService::new(Router::new(
//!     root_fn(move |_| Arc::clone(&root)),
//!     Arc::clone(&registry),
//! ));
//!
//! let get = |uri: &str| {
//!     let req = http::Request::get(uri).body(Vec::new()).unwrap();
//!     service.call(req)
//! };
//!
//! assert_eq!(get("/About").unwrap().body(), b"about us");
//! assert_eq!(get(format!("/x/{thanks}").as_str()).unwrap().body(), b"order confirmed");
//! assert_eq!(get(format!("/x/{thanks}").as_str()).unwrap().status(), 404);
//! assert!(get("/logo.png").is_none());
//! ```

pub mod cli;
pub mod control_point;
pub mod error;
pub mod handler;
pub mod ids;
pub mod logging;
pub mod message;
pub mod path;
pub mod registry;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use control_point::{ControlPoint, State};
pub use error::{HttpError, RegistryError, RouteFailure, WebError};
pub use handler::{handler_fn, BoxHandler, ResponseHandler};
pub use message::{CaseSensitivity, Message};
pub use registry::{Continuation, ContinuationRegistry};
pub use router::{Application, Dispatch, Router};
pub use server::{RequestContext, ResponseSink, RoutingService};
