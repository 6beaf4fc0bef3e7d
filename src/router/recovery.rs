//! Error recovery at the router boundary.

use tracing::debug;

use crate::error::RouteFailure;
use crate::handler::BoxHandler;
use crate::server::RequestContext;

/// Ask a failure for its response handler.
///
/// `None` means the failure cannot render itself and must propagate to the
/// hosting pipeline unchanged.
#[must_use]
pub fn recover(failure: &RouteFailure, ctx: &RequestContext) -> Option<BoxHandler> {
    let handler = failure.handler(ctx);
    debug!(
        request_id = %ctx.request_id(),
        error = %failure,
        recovered = handler.is_some(),
        "Routing failure offered to recovery"
    );
    handler
}
