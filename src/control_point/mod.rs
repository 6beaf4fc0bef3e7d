//! # Control Points
//!
//! States of the routing state machine. Every state answers two questions:
//! where does this path segment lead ([`ControlPoint::next`]) and what
//! response does the request get if the path ends here
//! ([`ControlPoint::handler`]).
//!
//! ## Variants
//!
//! - [`ClosureLookup`] - resumes a one-time continuation by key
//! - [`Redirect`] - `303` to a fixed target, absorbs further segments
//! - [`Terminal`] - no successors, handler built per request
//! - [`NotFound`] - the standard `404` terminal
//! - [`StatusPage`] - plain-text error page, absorbs further segments
//! - [`Rendered`] - any [`ResponseHandler`](crate::handler::ResponseHandler)
//!   used directly as a terminal
//! - [`SegmentTable`] - literal segment table for application states

mod closure;
mod core;
mod redirect;
mod table;
mod terminal;

pub use closure::ClosureLookup;
pub use self::core::{state, ControlPoint, State, Transition};
pub use redirect::Redirect;
pub use table::SegmentTable;
pub use terminal::{NotFound, Rendered, StatusPage, Terminal};
