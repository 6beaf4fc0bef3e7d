//! Error types for routing and the continuation registry.
//!
//! Failures raised while a path is being traversed are [`RouteFailure`]s. Each
//! one wraps a [`WebError`], which knows how to render itself as a response
//! handler. The router catches them at its boundary only (see
//! [`crate::router::recovery`]); nothing else turns a failure into a response.
//!
//! Registry failures ([`RegistryError`]) are configuration or capacity
//! problems. They are returned to whoever registered the factory and are never
//! caught by the router.

use std::fmt;

use http::StatusCode;

use crate::handler::{text, BoxHandler};
use crate::server::RequestContext;

/// A domain failure that can describe its own HTTP response.
///
/// Returning `None` from [`WebError::handler`] means "I cannot be rendered";
/// the failure then propagates out of [`Router::dispatch`](crate::router::Router::dispatch)
/// to the hosting pipeline.
pub trait WebError: fmt::Debug + fmt::Display + Send + Sync {
    fn handler(&self, ctx: &RequestContext) -> Option<BoxHandler>;
}

/// Failure raised by a transition or materialization.
pub struct RouteFailure {
    inner: Box<dyn WebError>,
}

impl RouteFailure {
    #[must_use]
    pub fn new<E: WebError + 'static>(error: E) -> Self {
        Self {
            inner: Box::new(error),
        }
    }

    /// Ask the wrapped failure for a response handler.
    #[must_use]
    pub fn handler(&self, ctx: &RequestContext) -> Option<BoxHandler> {
        self.inner.handler(ctx)
    }

    #[must_use]
    pub fn inner(&self) -> &dyn WebError {
        self.inner.as_ref()
    }
}

impl<E: WebError + 'static> From<E> for RouteFailure {
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl fmt::Debug for RouteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RouteFailure").field(&self.inner).finish()
    }
}

impl fmt::Display for RouteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl std::error::Error for RouteFailure {}

/// A failure that renders as a plain-text page with a fixed status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for HttpError {}

impl WebError for HttpError {
    fn handler(&self, _ctx: &RequestContext) -> Option<BoxHandler> {
        Some(Box::new(text(self.message.clone()).with_status(self.status)))
    }
}

/// Errors returned by the continuation registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Every key of the fixed-width factory key space is taken.
    Exhausted {
        /// Number of keys in the space (`62^width`).
        capacity: u64,
    },
    /// No free instance key was found for a new continuation.
    InstanceKeysExhausted {
        /// Number of keys in the space (`62^instance_key_len`).
        capacity: u64,
    },
    /// An explicitly supplied factory key does not fit the key space.
    InvalidKey {
        key: String,
        reason: &'static str,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Exhausted { capacity } => {
                write!(
                    f,
                    "continuation factory key space exhausted ({capacity} keys in use)"
                )
            }
            RegistryError::InstanceKeysExhausted { capacity } => {
                write!(
                    f,
                    "no free continuation instance key ({capacity} keys in the space)"
                )
            }
            RegistryError::InvalidKey { key, reason } => {
                write!(f, "invalid factory key '{key}': {reason}")
            }
        }
    }
}

impl std::error::Error for RegistryError {}
