use std::sync::Arc;

use http::Method;
use smallvec::SmallVec;
use tracing::debug;

use super::response::HeaderVec;
use super::validation::ValidationErrors;
use crate::ids::RequestId;

/// Maximum number of query/form/cookie pairs before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Key/value pairs in arrival order. Lookups use "last write wins".
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Per-request context handed to control points, messages and handlers.
///
/// Exposes the method, the path (query string stripped), key/value lookups
/// over the query string, a urlencoded form body and cookies, and the
/// request-scoped [`ValidationErrors`].
#[derive(Debug)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    path: String,
    query: ParamVec,
    form: ParamVec,
    cookies: ParamVec,
    headers: HeaderVec,
    validation: ValidationErrors,
}

fn rfind<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
    params
        .iter()
        .rfind(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_str())
}

/// Parse query string parameters from a URL path
///
/// Extracts everything after the `?` character and URL-decodes parameter
/// names and values.
#[must_use]
pub fn parse_query_params(path: &str) -> ParamVec {
    match path.split_once('?') {
        Some((_, query)) => parse_urlencoded(query.as_bytes()),
        None => ParamVec::new(),
    }
}

/// Decode an `application/x-www-form-urlencoded` payload.
#[must_use]
pub fn parse_urlencoded(bytes: &[u8]) -> ParamVec {
    url::form_urlencoded::parse(bytes)
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}

/// Split a `Cookie` header into name/value pairs.
#[must_use]
pub fn parse_cookies(header: &str) -> ParamVec {
    header
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim().to_string();
            Some((Arc::from(name), value))
        })
        .collect()
}

impl RequestContext {
    /// Build a context from a method and a raw request target
    /// (`/path?query`).
    #[must_use]
    pub fn new(method: Method, raw_path: &str) -> Self {
        let path = raw_path.split('?').next().unwrap_or("/");
        let path = if path.is_empty() { "/" } else { path };
        Self {
            request_id: RequestId::new(),
            method,
            path: path.to_string(),
            query: parse_query_params(raw_path),
            form: ParamVec::new(),
            cookies: ParamVec::new(),
            headers: HeaderVec::new(),
            validation: ValidationErrors::default(),
        }
    }

    /// Add a request header. A `cookie` header is also split into cookies.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if name == "cookie" {
            self.cookies.extend(parse_cookies(value));
        } else if name == "x-request-id" {
            self.request_id = RequestId::from_header(value);
        }
        self.headers.push((Arc::from(name.as_str()), value.to_string()));
        self
    }

    /// Attach a urlencoded form body.
    #[must_use]
    pub fn with_form_body(mut self, body: &[u8]) -> Self {
        self.form = parse_urlencoded(body);
        self
    }

    /// Build a context from an `http::Request`.
    ///
    /// The body is decoded as a form only when the content type says so.
    #[must_use]
    pub fn from_http(req: &http::Request<Vec<u8>>) -> Self {
        let target = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let mut ctx = Self::new(req.method().clone(), target);
        for (name, value) in req.headers() {
            if let Ok(value) = value.to_str() {
                ctx = ctx.with_header(name.as_str(), value);
            }
        }
        let is_form = ctx
            .header("content-type")
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);
        if is_form {
            ctx = ctx.with_form_body(req.body());
        }

        debug!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.path,
            query_count = ctx.query.len(),
            form_count = ctx.form.len(),
            cookie_count = ctx.cookies.len(),
            "Request context built"
        );
        ctx
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        rfind(&self.query, name)
    }

    #[must_use]
    pub fn form(&self, name: &str) -> Option<&str> {
        rfind(&self.form, name)
    }

    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        rfind(&self.cookies, name)
    }

    /// Get a header by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Merged lookup: query string, then form body, then cookies.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query(name)
            .or_else(|| self.form(name))
            .or_else(|| self.cookie(name))
    }

    #[must_use]
    pub fn validation(&self) -> &ValidationErrors {
        &self.validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookies() {
        let cookies = parse_cookies("a=b; c=d; =skipped; flag");
        assert_eq!(rfind(&cookies, "a"), Some("b"));
        assert_eq!(rfind(&cookies, "c"), Some("d"));
        assert_eq!(rfind(&cookies, "flag"), Some(""));
        assert_eq!(cookies.len(), 3);
    }

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/p?x=1&y=2&x=3");
        assert_eq!(rfind(&q, "x"), Some("3"));
        assert_eq!(rfind(&q, "y"), Some("2"));
        assert!(parse_query_params("/p").is_empty());
    }

    #[test]
    fn test_path_strips_query() {
        let ctx = RequestContext::new(Method::GET, "/shop/cart?item=4");
        assert_eq!(ctx.path(), "/shop/cart");
        assert_eq!(ctx.query("item"), Some("4"));

        let ctx = RequestContext::new(Method::GET, "?only=query");
        assert_eq!(ctx.path(), "/");
    }

    #[test]
    fn test_param_precedence() {
        let ctx = RequestContext::new(Method::POST, "/login?who=query")
            .with_form_body(b"who=form&pass=secret+word")
            .with_header("Cookie", "who=cookie; theme=dark");
        assert_eq!(ctx.param("who"), Some("query"));
        assert_eq!(ctx.param("pass"), Some("secret word"));
        assert_eq!(ctx.param("theme"), Some("dark"));
        assert_eq!(ctx.param("missing"), None);
    }

    #[test]
    fn test_from_http_decodes_form_and_request_id() {
        let id = RequestId::new();
        let req = http::Request::builder()
            .method(Method::POST)
            .uri("/checkout?step=2")
            .header("content-type", "application/x-www-form-urlencoded")
            .header("x-request-id", id.to_string())
            .body(b"card=4242".to_vec())
            .expect("valid request");

        let ctx = RequestContext::from_http(&req);
        assert_eq!(ctx.method(), &Method::POST);
        assert_eq!(ctx.path(), "/checkout");
        assert_eq!(ctx.query("step"), Some("2"));
        assert_eq!(ctx.form("card"), Some("4242"));
        assert_eq!(ctx.request_id(), id);
    }

    #[test]
    fn test_from_http_ignores_non_form_body() {
        let req = http::Request::builder()
            .method(Method::POST)
            .uri("/api")
            .header("content-type", "application/json")
            .body(br#"{"card":"4242"}"#.to_vec())
            .expect("valid request");

        let ctx = RequestContext::from_http(&req);
        assert_eq!(ctx.form("card"), None);
    }
}
