use std::fmt;
use std::sync::Arc;

use http::StatusCode;

use super::core::{ControlPoint, State, Transition};
use crate::error::RouteFailure;
use crate::handler::{text, BoxHandler, NotFoundHandler, ResponseHandler};
use crate::message::Message;
use crate::server::RequestContext;

type HandlerFactory = Arc<dyn Fn(&RequestContext) -> Result<BoxHandler, RouteFailure> + Send + Sync>;

/// A state with no successors whose handler is built per request.
#[derive(Clone)]
pub struct Terminal {
    factory: HandlerFactory,
}

impl Terminal {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&RequestContext) -> Result<BoxHandler, RouteFailure> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }

    /// Terminal that always materializes to the same handler.
    pub fn from_handler<H: ResponseHandler + 'static>(handler: H) -> Self {
        let handler = Arc::new(handler);
        Self::new(move |_| Ok(Box::new(Arc::clone(&handler)) as BoxHandler))
    }
}

impl fmt::Debug for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Terminal")
    }
}

impl ControlPoint for Terminal {
    fn next(&self, _msg: &Message<'_>) -> Transition {
        Ok(None)
    }

    fn handler(&self, ctx: &RequestContext) -> Result<BoxHandler, RouteFailure> {
        (self.factory)(ctx)
    }
}

/// The standard 404 state.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFound;

impl NotFound {
    /// Shared instance, as returned by the default `translate_null`.
    #[must_use]
    pub fn state() -> State {
        Arc::new(NotFound)
    }
}

impl ControlPoint for NotFound {
    fn next(&self, _msg: &Message<'_>) -> Transition {
        Ok(None)
    }

    fn handler(&self, _ctx: &RequestContext) -> Result<BoxHandler, RouteFailure> {
        Ok(Box::new(NotFoundHandler))
    }
}

/// Plain-text error page for a 4xx/5xx status.
///
/// Unlike [`NotFound`], an error page absorbs any further segments, so
/// `/forbidden/anything` still renders the same page.
#[derive(Debug, Clone)]
pub struct StatusPage {
    status: StatusCode,
    body: Arc<str>,
}

impl StatusPage {
    /// Statuses outside 400..=599 are coerced to `500`.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Arc<str>>) -> Self {
        let status = if status.is_client_error() || status.is_server_error() {
            status
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl ControlPoint for StatusPage {
    fn next(&self, _msg: &Message<'_>) -> Transition {
        Ok(Some(Arc::new(self.clone())))
    }

    fn handler(&self, _ctx: &RequestContext) -> Result<BoxHandler, RouteFailure> {
        Ok(Box::new(text(self.body.as_ref()).with_status(self.status)))
    }
}

/// Any handler that is also a terminal state: it materializes to itself.
pub struct Rendered<R> {
    inner: Arc<R>,
}

impl<R: ResponseHandler + 'static> Rendered<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            inner: Arc::new(renderer),
        }
    }
}

impl<R> Clone for Rendered<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: ResponseHandler + 'static> ControlPoint for Rendered<R> {
    fn next(&self, _msg: &Message<'_>) -> Transition {
        Ok(None)
    }

    fn handler(&self, _ctx: &RequestContext) -> Result<BoxHandler, RouteFailure> {
        Ok(Box::new(Arc::clone(&self.inner)))
    }

    fn label(&self) -> &'static str {
        "Rendered"
    }
}
