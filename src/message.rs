//! Messages fed to control points, and the segment case policy.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::server::RequestContext;

/// How literal segment comparisons treat letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSensitivity {
    #[default]
    Insensitive,
    Sensitive,
}

impl CaseSensitivity {
    /// Interpret a "case-insensitive segments" setting value.
    ///
    /// Only `no` and `false` (any case) switch to sensitive comparisons;
    /// everything else, including an empty value, keeps the default.
    #[must_use]
    pub fn parse_setting(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "no" | "false" => CaseSensitivity::Sensitive,
            _ => CaseSensitivity::Insensitive,
        }
    }

    #[must_use]
    pub fn eq(self, a: &str, b: &str) -> bool {
        match self {
            CaseSensitivity::Insensitive => a.to_lowercase() == b.to_lowercase(),
            CaseSensitivity::Sensitive => a == b,
        }
    }
}

/// One path segment bound to the request it came from.
///
/// Comparisons against literals go through [`Message::is`] (or `==`) and
/// honour the router's [`CaseSensitivity`].
#[derive(Clone, Copy)]
pub struct Message<'a> {
    segment: &'a str,
    ctx: &'a RequestContext,
    case: CaseSensitivity,
}

impl<'a> Message<'a> {
    #[must_use]
    pub fn new(segment: &'a str, ctx: &'a RequestContext, case: CaseSensitivity) -> Self {
        Self { segment, ctx, case }
    }

    /// Compare the segment against a literal under the case policy.
    #[must_use]
    pub fn is(&self, literal: &str) -> bool {
        self.case.eq(self.segment, literal)
    }

    /// The raw segment text.
    #[must_use]
    pub fn segment(&self) -> &'a str {
        self.segment
    }

    /// Segment folded for table lookups: lowercased when insensitive.
    #[must_use]
    pub fn normalized(&self) -> Cow<'a, str> {
        match self.case {
            CaseSensitivity::Insensitive => Cow::Owned(self.segment.to_lowercase()),
            CaseSensitivity::Sensitive => Cow::Borrowed(self.segment),
        }
    }

    #[must_use]
    pub fn case(&self) -> CaseSensitivity {
        self.case
    }

    /// Shorthand for `context().param(name)`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.ctx.param(name)
    }

    #[must_use]
    pub fn context(&self) -> &'a RequestContext {
        self.ctx
    }
}

impl PartialEq<str> for Message<'_> {
    fn eq(&self, other: &str) -> bool {
        self.is(other)
    }
}

impl PartialEq<&str> for Message<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.is(other)
    }
}

impl fmt::Debug for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("segment", &self.segment)
            .field("case", &self.case)
            .finish()
    }
}

/// Prints the segment as the case policy sees it (see [`Message::normalized`]).
impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized())
    }
}
