use std::fmt;
use std::sync::Arc;

use tracing::{debug, debug_span, error, trace, warn};

use super::recovery;
use crate::control_point::{ClosureLookup, NotFound, State};
use crate::error::RouteFailure;
use crate::handler::BoxHandler;
use crate::message::{CaseSensitivity, Message};
use crate::path::RouteVerdict;
use crate::registry::ContinuationRegistry;
use crate::runtime_config::RuntimeConfig;
use crate::server::RequestContext;

/// The embedding application's hooks.
///
/// Only [`Application::root`] is required. The defaults classify paths with
/// [`RouteVerdict::for_path`] and turn a dead end into [`NotFound`].
pub trait Application: Send + Sync {
    /// Root state for a request.
    fn root(&self, ctx: &RequestContext) -> State;

    /// Tokenize and classify the request path.
    fn route_verdict(&self, ctx: &RequestContext) -> RouteVerdict {
        RouteVerdict::for_path(ctx.path())
    }

    /// State to continue with when a transition yields `None`.
    fn translate_null(&self, _ctx: &RequestContext) -> State {
        NotFound::state()
    }
}

/// [`Application`] whose root comes from a closure. Build with [`root_fn`].
pub struct RootFn<F>(F);

impl<F> Application for RootFn<F>
where
    F: Fn(&RequestContext) -> State + Send + Sync,
{
    fn root(&self, ctx: &RequestContext) -> State {
        (self.0)(ctx)
    }
}

/// Wrap a root-state closure as an [`Application`] with default hooks.
#[must_use]
pub fn root_fn<F>(f: F) -> RootFn<F>
where
    F: Fn(&RequestContext) -> State + Send + Sync,
{
    RootFn(f)
}

/// What the hosting pipeline should do with a request.
pub enum Dispatch {
    /// Not routable; leave the request to static serving.
    Bypass,
    /// Run this handler against the response sink.
    Handler(BoxHandler),
}

impl Dispatch {
    #[must_use]
    pub fn is_bypass(&self) -> bool {
        matches!(self, Dispatch::Bypass)
    }

    #[must_use]
    pub fn into_handler(self) -> Option<BoxHandler> {
        match self {
            Dispatch::Bypass => None,
            Dispatch::Handler(handler) => Some(handler),
        }
    }
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Bypass => f.write_str("Bypass"),
            Dispatch::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

/// Drives a request path through the application's state machine.
///
/// Holds no per-request state; one router serves all requests concurrently.
pub struct Router<A> {
    app: Arc<A>,
    registry: Arc<ContinuationRegistry>,
    case: CaseSensitivity,
    resume_marker: String,
}

impl<A: Application> Router<A> {
    /// Router with the default case policy and the `x` resume marker.
    pub fn new(app: A, registry: Arc<ContinuationRegistry>) -> Self {
        Self {
            app: Arc::new(app),
            registry,
            case: CaseSensitivity::default(),
            resume_marker: "x".to_string(),
        }
    }

    pub fn with_config(app: A, registry: Arc<ContinuationRegistry>, config: &RuntimeConfig) -> Self {
        Self::new(app, registry)
            .with_case_sensitivity(config.case_sensitivity)
            .with_resume_marker(config.resume_marker.clone())
    }

    #[must_use]
    pub fn with_case_sensitivity(mut self, case: CaseSensitivity) -> Self {
        self.case = case;
        self
    }

    #[must_use]
    pub fn with_resume_marker(mut self, marker: impl Into<String>) -> Self {
        self.resume_marker = marker.into();
        self
    }

    #[must_use]
    pub fn app(&self) -> &A {
        &self.app
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ContinuationRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.case
    }

    #[must_use]
    pub fn resume_marker(&self) -> &str {
        &self.resume_marker
    }

    /// Route one request.
    ///
    /// Clears the request's validation errors, classifies the path, then
    /// walks every segment left to right and materializes the final state.
    /// Failures raised on the way are offered to recovery; only failures
    /// that cannot render themselves are returned as `Err`.
    ///
    /// # Errors
    ///
    /// The [`RouteFailure`] raised during traversal when it yields no handler.
    pub fn dispatch(&self, ctx: &RequestContext) -> Result<Dispatch, RouteFailure> {
        ctx.validation().clear();

        let verdict = self.app.route_verdict(ctx);
        if !verdict.routable {
            debug!(request_id = %ctx.request_id(), path = %ctx.path(), "Path not routable, bypassing");
            return Ok(Dispatch::Bypass);
        }

        let span = debug_span!(
            "route",
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path()
        );
        let _entered = span.enter();

        match self.traverse(ctx, &verdict.segments) {
            Ok(handler) => Ok(Dispatch::Handler(handler)),
            Err(failure) => match recovery::recover(&failure, ctx) {
                Some(handler) => {
                    warn!(error = %failure, "Routing failure recovered");
                    Ok(Dispatch::Handler(handler))
                }
                None => {
                    error!(error = %failure, "Routing failure not recoverable");
                    Err(failure)
                }
            },
        }
    }

    /// Pipeline error hook: ask the failure for a handler once more.
    #[must_use]
    pub fn handle_error(&self, failure: &RouteFailure, ctx: &RequestContext) -> Option<BoxHandler> {
        recovery::recover(failure, ctx)
    }

    fn traverse(&self, ctx: &RequestContext, segments: &[String]) -> Result<BoxHandler, RouteFailure> {
        let mut state = self.app.root(ctx);
        let mut start = 0;

        // `/<marker>/<key>/...`: the key segment itself is the first message,
        // which the lookup state ignores.
        if let [marker, key, ..] = segments {
            if *marker == self.resume_marker {
                trace!(key = %key, "Resuming continuation");
                state = Arc::new(ClosureLookup::new(key.as_str(), Arc::clone(&self.registry)));
                start = 1;
            }
        }

        for (index, segment) in segments.iter().enumerate().skip(start) {
            let message = Message::new(segment, ctx, self.case);
            state = match state.next(&message)? {
                Some(next) => {
                    trace!(index, segment = %segment, from = state.label(), to = next.label(), "Transition");
                    next
                }
                None => {
                    debug!(index, segment = %segment, from = state.label(), "No transition, translating null");
                    self.app.translate_null(ctx)
                }
            };
        }

        state.handler(ctx)
    }
}
