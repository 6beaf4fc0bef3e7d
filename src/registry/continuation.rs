use std::fmt;
use std::sync::Arc;

use crate::control_point::{ControlPoint, State, Transition};
use crate::error::RouteFailure;
use crate::handler::{BoxHandler, ResponseHandler};
use crate::message::Message;
use crate::server::RequestContext;

pub type HandlerFactory =
    Arc<dyn Fn(&RequestContext) -> Result<BoxHandler, RouteFailure> + Send + Sync>;
pub type NextFactory = Arc<dyn Fn(&Message<'_>) -> Transition + Send + Sync>;

/// A one-time closure over a handler and, optionally, a next-state function.
///
/// Minted into a [`ContinuationRegistry`](super::ContinuationRegistry) and
/// addressed by the key it returns.
#[derive(Clone)]
pub struct Continuation {
    handler_factory: HandlerFactory,
    next_factory: Option<NextFactory>,
}

impl Continuation {
    pub fn new<F>(handler_factory: F) -> Self
    where
        F: Fn(&RequestContext) -> Result<BoxHandler, RouteFailure> + Send + Sync + 'static,
    {
        Self {
            handler_factory: Arc::new(handler_factory),
            next_factory: None,
        }
    }

    pub fn from_handler<H: ResponseHandler + 'static>(handler: H) -> Self {
        let handler = Arc::new(handler);
        Self::new(move |_| Ok(Box::new(Arc::clone(&handler)) as BoxHandler))
    }

    /// Resume into an existing state: both transition and handler delegate to it.
    #[must_use]
    pub fn from_state(state: State) -> Self {
        let for_handler = Arc::clone(&state);
        Self::new(move |ctx| for_handler.handler(ctx)).then(move |msg| state.next(msg))
    }

    /// Set the function consulted for segments that follow the key.
    #[must_use]
    pub fn then<F>(mut self, next_factory: F) -> Self
    where
        F: Fn(&Message<'_>) -> Transition + Send + Sync + 'static,
    {
        self.next_factory = Some(Arc::new(next_factory));
        self
    }

    /// Hand segments after the key to `state`, as if it were the root.
    #[must_use]
    pub fn then_state(self, state: State) -> Self {
        self.then(move |msg| state.next(msg))
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation")
            .field("has_next", &self.next_factory.is_some())
            .finish()
    }
}

/// The state a resolved continuation resumes into.
pub(crate) struct Resumed {
    continuation: Continuation,
}

impl Resumed {
    pub(crate) fn new(continuation: Continuation) -> Self {
        Self { continuation }
    }
}

impl ControlPoint for Resumed {
    fn next(&self, msg: &Message<'_>) -> Transition {
        match &self.continuation.next_factory {
            Some(next) => next(msg),
            None => Ok(None),
        }
    }

    fn handler(&self, ctx: &RequestContext) -> Result<BoxHandler, RouteFailure> {
        (self.continuation.handler_factory)(ctx)
    }

    fn label(&self) -> &'static str {
        "Resumed"
    }
}
