//! Request correlation ids.

use std::fmt;
use std::str::FromStr;

use ulid::Ulid;

/// ULID attached to every routed request.
///
/// Carried by [`RequestContext`](crate::server::RequestContext), echoed in the
/// `x-request-id` response header and recorded on the `route` tracing span.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Adopt an upstream `x-request-id`, or mint a fresh id when the header
    /// is not a ULID.
    #[must_use]
    pub fn from_header(value: &str) -> Self {
        value.trim().parse().unwrap_or_default()
    }

    /// Milliseconds since the Unix epoch at which the id was minted.
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}
