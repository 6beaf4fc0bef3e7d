pub mod request;
pub mod response;
pub mod service;
pub mod validation;

pub use request::{parse_cookies, parse_query_params, parse_urlencoded, ParamVec, RequestContext};
pub use response::{HeaderVec, ResponseSink};
pub use service::RoutingService;
pub use validation::{FieldError, ValidationErrors};
