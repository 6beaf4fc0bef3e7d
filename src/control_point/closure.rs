use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::core::{ControlPoint, Transition};
use super::terminal::NotFound;
use crate::error::RouteFailure;
use crate::handler::{BoxHandler, NotFoundHandler};
use crate::message::Message;
use crate::registry::ContinuationRegistry;
use crate::server::RequestContext;

/// Resumes a continuation by key.
///
/// The router installs this state when a path starts with the resume marker.
/// Its transition ignores the message text and resolves the key captured at
/// construction, so the lookup does not depend on the case policy. Stale or
/// unknown keys continue as [`NotFound`].
pub struct ClosureLookup {
    key: String,
    registry: Arc<ContinuationRegistry>,
}

impl ClosureLookup {
    #[must_use]
    pub fn new(key: impl Into<String>, registry: Arc<ContinuationRegistry>) -> Self {
        Self {
            key: key.into(),
            registry,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for ClosureLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureLookup").field("key", &self.key).finish()
    }
}

impl ControlPoint for ClosureLookup {
    fn next(&self, _msg: &Message<'_>) -> Transition {
        match self.registry.resolve(&self.key) {
            Some(resumed) => Ok(Some(resumed)),
            None => {
                debug!(key = %self.key, "Continuation not found or expired");
                Ok(Some(NotFound::state()))
            }
        }
    }

    fn handler(&self, _ctx: &RequestContext) -> Result<BoxHandler, RouteFailure> {
        Ok(Box::new(NotFoundHandler))
    }
}
