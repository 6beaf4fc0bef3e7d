//! Response handlers
//!
//! A handler is the end product of a traversal: the router materializes the
//! final control point into a [`BoxHandler`] and the hosting pipeline runs it
//! against a [`ResponseSink`]. Wrapping a closure is always explicit through
//! [`handler_fn`]; there is no implicit conversion from function values.

use std::sync::Arc;

use http::StatusCode;
use serde_json::Value;

use crate::server::{RequestContext, ResponseSink};

pub trait ResponseHandler: Send + Sync {
    fn process(&self, ctx: &RequestContext, sink: &mut ResponseSink);
}

pub type BoxHandler = Box<dyn ResponseHandler>;

impl<H: ResponseHandler + ?Sized> ResponseHandler for Arc<H> {
    fn process(&self, ctx: &RequestContext, sink: &mut ResponseSink) {
        (**self).process(ctx, sink);
    }
}

impl<H: ResponseHandler + ?Sized> ResponseHandler for Box<H> {
    fn process(&self, ctx: &RequestContext, sink: &mut ResponseSink) {
        (**self).process(ctx, sink);
    }
}

/// Handler backed by a closure. Build with [`handler_fn`].
pub struct FnHandler<F>(F);

impl<F> ResponseHandler for FnHandler<F>
where
    F: Fn(&RequestContext, &mut ResponseSink) + Send + Sync,
{
    fn process(&self, ctx: &RequestContext, sink: &mut ResponseSink) {
        (self.0)(ctx, sink);
    }
}

/// Wrap a closure as a response handler.
///
/// ```rust
/// use cprouter::handler::handler_fn;
///
/// let hello = handler_fn(|ctx, sink| {
///     let name = ctx.param("name").unwrap_or("world");
///     sink.write_str(&format!("hello {name}"));
/// });
/// # let _ = hello;
/// ```
#[must_use]
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&RequestContext, &mut ResponseSink) + Send + Sync,
{
    FnHandler(f)
}

/// Plain-text page with a status (default `200 OK`).
#[derive(Debug, Clone)]
pub struct TextHandler {
    status: StatusCode,
    body: String,
}

impl TextHandler {
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl ResponseHandler for TextHandler {
    fn process(&self, _ctx: &RequestContext, sink: &mut ResponseSink) {
        sink.set_status(self.status);
        sink.set_header("content-type", "text/plain; charset=utf-8");
        sink.write_str(&self.body);
    }
}

#[must_use]
pub fn text(body: impl Into<String>) -> TextHandler {
    TextHandler {
        status: StatusCode::OK,
        body: body.into(),
    }
}

/// JSON document with a status.
#[derive(Debug, Clone)]
pub struct JsonHandler {
    status: StatusCode,
    body: Value,
}

impl ResponseHandler for JsonHandler {
    fn process(&self, _ctx: &RequestContext, sink: &mut ResponseSink) {
        sink.set_status(self.status);
        sink.set_header("content-type", "application/json");
        sink.write_bytes(self.body.to_string().as_bytes());
    }
}

#[must_use]
pub fn json(status: StatusCode, body: Value) -> JsonHandler {
    JsonHandler { status, body }
}

/// The standard 404 page.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundHandler;

impl ResponseHandler for NotFoundHandler {
    fn process(&self, _ctx: &RequestContext, sink: &mut ResponseSink) {
        sink.set_status(StatusCode::NOT_FOUND);
        sink.set_header("content-type", "text/plain; charset=utf-8");
        sink.write_str("not found");
    }
}

/// `303 See Other` pointing at `location`.
#[derive(Debug, Clone)]
pub struct RedirectHandler {
    location: Arc<str>,
}

impl RedirectHandler {
    #[must_use]
    pub fn new(location: impl Into<Arc<str>>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

impl ResponseHandler for RedirectHandler {
    fn process(&self, _ctx: &RequestContext, sink: &mut ResponseSink) {
        sink.set_status(StatusCode::SEE_OTHER);
        sink.set_header("location", &self.location);
    }
}
