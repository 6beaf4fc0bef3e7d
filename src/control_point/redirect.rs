use std::sync::Arc;

use super::core::{ControlPoint, Transition};
use crate::error::RouteFailure;
use crate::handler::{BoxHandler, RedirectHandler};
use crate::message::Message;
use crate::server::RequestContext;

/// `303 See Other` to a fixed target.
///
/// A redirect absorbs every further segment: `/old/a/b` redirects exactly
/// like `/old`.
#[derive(Debug, Clone)]
pub struct Redirect {
    target: Arc<str>,
}

impl Redirect {
    #[must_use]
    pub fn new(target: impl Into<Arc<str>>) -> Self {
        Self {
            target: target.into(),
        }
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl ControlPoint for Redirect {
    fn next(&self, _msg: &Message<'_>) -> Transition {
        Ok(Some(Arc::new(self.clone())))
    }

    fn handler(&self, _ctx: &RequestContext) -> Result<BoxHandler, RouteFailure> {
        Ok(Box::new(RedirectHandler::new(Arc::clone(&self.target))))
    }
}
