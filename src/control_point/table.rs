use std::fmt;
use std::sync::Arc;

use super::core::{ControlPoint, State, Transition};
use crate::error::RouteFailure;
use crate::handler::{BoxHandler, NotFoundHandler, ResponseHandler};
use crate::message::Message;
use crate::server::RequestContext;

type Fallback = Arc<dyn Fn(&Message<'_>) -> Transition + Send + Sync>;

/// A state that maps literal segments to successor states.
///
/// Lookups go through [`Message::is`], so the router's case policy applies.
/// Unmatched segments go to the fallback if one is set, otherwise the
/// transition yields `None`. Materializing the table itself (a path that
/// ends here) runs the index handler, or 404 when there is none.
///
/// ```rust
/// use cprouter::control_point::{state, Redirect, SegmentTable};
/// use cprouter::handler::text;
///
/// let root = SegmentTable::new()
///     .index_handler(text("home"))
///     .route("old-shop", state(Redirect::new("/shop")));
/// # let _ = root;
/// ```
#[derive(Clone, Default)]
pub struct SegmentTable {
    routes: Vec<(String, State)>,
    fallback: Option<Fallback>,
    index: Option<Arc<dyn ResponseHandler>>,
}

impl SegmentTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a literal segment. Earlier routes win over later duplicates.
    #[must_use]
    pub fn route(mut self, segment: impl Into<String>, next: State) -> Self {
        self.routes.push((segment.into(), next));
        self
    }

    #[must_use]
    pub fn fallback<F>(mut self, f: F) -> Self
    where
        F: Fn(&Message<'_>) -> Transition + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn index_handler<H: ResponseHandler + 'static>(mut self, handler: H) -> Self {
        self.index = Some(Arc::new(handler));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl fmt::Debug for SegmentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentTable")
            .field(
                "routes",
                &self.routes.iter().map(|(s, _)| s.as_str()).collect::<Vec<_>>(),
            )
            .field("fallback", &self.fallback.is_some())
            .field("index", &self.index.is_some())
            .finish()
    }
}

impl ControlPoint for SegmentTable {
    fn next(&self, msg: &Message<'_>) -> Transition {
        if let Some((_, next)) = self.routes.iter().find(|(segment, _)| msg.is(segment)) {
            return Ok(Some(Arc::clone(next)));
        }
        match &self.fallback {
            Some(fallback) => fallback(msg),
            None => Ok(None),
        }
    }

    fn handler(&self, _ctx: &RequestContext) -> Result<BoxHandler, RouteFailure> {
        match &self.index {
            Some(index) => Ok(Box::new(Arc::clone(index))),
            None => Ok(Box::new(NotFoundHandler)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_point::{state, Terminal};
    use crate::handler::text;
    use crate::message::CaseSensitivity;
    use http::Method;

    fn body_of(state: &State, ctx: &RequestContext) -> Vec<u8> {
        let mut sink = crate::server::ResponseSink::new();
        state.handler(ctx).expect("handler").process(ctx, &mut sink);
        sink.body().to_vec()
    }

    #[test]
    fn test_route_lookup_honours_case_policy() {
        let ctx = RequestContext::new(Method::GET, "/");
        let table = SegmentTable::new().route("Home", state(Terminal::from_handler(text("home"))));

        let lower = Message::new("home", &ctx, CaseSensitivity::Insensitive);
        let hit = table.next(&lower).expect("transition").expect("route");
        assert_eq!(body_of(&hit, &ctx), b"home");

        let strict = Message::new("home", &ctx, CaseSensitivity::Sensitive);
        assert!(table.next(&strict).expect("transition").is_none());
    }

    #[test]
    fn test_fallback_receives_unmatched_segment() {
        let ctx = RequestContext::new(Method::GET, "/");
        let table = SegmentTable::new().fallback(|msg| {
            let id = msg.segment().to_string();
            Ok(Some(state(Terminal::from_handler(text(format!("item {id}"))))))
        });
        let msg = Message::new("42", &ctx, CaseSensitivity::Insensitive);
        let next = table.next(&msg).expect("transition").expect("fallback");
        assert_eq!(body_of(&next, &ctx), b"item 42");
    }

    #[test]
    fn test_index_handler_or_not_found() {
        let ctx = RequestContext::new(Method::GET, "/");
        let with_index: State = Arc::new(SegmentTable::new().index_handler(text("index")));
        assert_eq!(body_of(&with_index, &ctx), b"index");

        let bare: State = Arc::new(SegmentTable::new());
        assert_eq!(body_of(&bare, &ctx), b"not found");
    }
}
