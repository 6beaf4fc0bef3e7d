use std::sync::Arc;

use crate::error::RouteFailure;
use crate::handler::BoxHandler;
use crate::message::Message;
use crate::server::RequestContext;

/// A state in the routing state machine.
///
/// `next` consumes one path segment and yields the following state, or
/// `None` when this state has nowhere to go (the router then asks the
/// application's `translate_null` hook). `handler` turns the state reached
/// after the last segment into the response handler for the request.
///
/// `next` must depend only on `self` and the message.
pub trait ControlPoint: Send + Sync {
    fn next(&self, msg: &Message<'_>) -> Transition;

    fn handler(&self, ctx: &RequestContext) -> Result<BoxHandler, RouteFailure>;

    /// Short label used in trace logs.
    fn label(&self) -> &'static str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("ControlPoint")
    }
}

/// Shared handle to a control point.
pub type State = Arc<dyn ControlPoint>;

/// Outcome of feeding one message to a state.
pub type Transition = Result<Option<State>, RouteFailure>;

/// Wrap a concrete control point as a [`State`].
#[must_use]
pub fn state<C: ControlPoint + 'static>(cp: C) -> State {
    Arc::new(cp)
}
