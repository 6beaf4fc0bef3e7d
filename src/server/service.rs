use std::sync::Arc;

use http::StatusCode;
use tracing::{error, info};

use super::request::RequestContext;
use super::response::ResponseSink;
use crate::error::RouteFailure;
use crate::handler::{text, BoxHandler};
use crate::router::{Application, Dispatch, Router};

/// Hosting-pipeline adapter over `http::Request` / `http::Response`.
///
/// One `call` per incoming request: build the context, dispatch, run the
/// installed handler into a fresh sink. `None` means the path was not
/// routable and should be handed to static serving.
pub struct RoutingService<A: Application> {
    router: Arc<Router<A>>,
}

impl<A: Application> Clone for RoutingService<A> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
        }
    }
}

impl<A: Application> RoutingService<A> {
    #[must_use]
    pub fn new(router: Router<A>) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    #[must_use]
    pub fn from_shared(router: Arc<Router<A>>) -> Self {
        Self { router }
    }

    #[must_use]
    pub fn router(&self) -> &Router<A> {
        &self.router
    }

    #[must_use]
    pub fn call(&self, req: http::Request<Vec<u8>>) -> Option<http::Response<Vec<u8>>> {
        let ctx = RequestContext::from_http(&req);
        self.serve(&ctx)
    }

    /// Dispatch an already-built context.
    #[must_use]
    pub fn serve(&self, ctx: &RequestContext) -> Option<http::Response<Vec<u8>>> {
        let handler = match self.router.dispatch(ctx) {
            Ok(Dispatch::Bypass) => return None,
            Ok(Dispatch::Handler(handler)) => handler,
            // Recovery already ran inside dispatch.
            Err(failure) => internal_error(&failure, ctx),
        };

        let mut sink = ResponseSink::new();
        handler.process(ctx, &mut sink);
        if sink.header("x-request-id").is_none() {
            sink.set_header("x-request-id", &ctx.request_id().to_string());
        }
        info!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
            status = sink.status().as_u16(),
            body_len = sink.body().len(),
            "Request handled"
        );
        Some(sink.into_http())
    }

    /// Unhandled-error hook for failures the host pipeline raises outside
    /// [`Router::dispatch`], such as its own middleware. The failure is
    /// offered to recovery; without a handler a generic 500 page is used.
    #[must_use]
    pub fn on_pipeline_error(&self, failure: RouteFailure, ctx: &RequestContext) -> BoxHandler {
        self.router
            .handle_error(&failure, ctx)
            .unwrap_or_else(|| internal_error(&failure, ctx))
    }
}

fn internal_error(failure: &RouteFailure, ctx: &RequestContext) -> BoxHandler {
    error!(
        request_id = %ctx.request_id(),
        path = %ctx.path(),
        error = %failure,
        "Unrecovered routing failure, rendering generic error page"
    );
    Box::new(text("internal server error").with_status(StatusCode::INTERNAL_SERVER_ERROR))
}
