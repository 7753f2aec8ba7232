//! Request-scoped context handed to the error logger.

use http::Method;
use http::request::Parts;

/// Header carrying the caller-assigned request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// What the error logger knows about the request that failed.
///
/// Built once per request, usually straight from the incoming
/// [`http::Request`]:
///
/// ```rust
/// use talkback::Context;
///
/// let req = http::Request::get("/users/42")
///     .header("x-request-id", "abc-123")
///     .body(())
///     .unwrap();
///
/// let cx = Context::from_request(&req);
/// assert_eq!(cx.path(), "/users/42");
/// assert_eq!(cx.request_id(), Some("abc-123"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    method: Method,
    path: String,
    request_id: Option<String>,
}

impl Context {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), request_id: None }
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn from_request<B>(req: &http::Request<B>) -> Self {
        Self::from_head(req.method(), req.uri(), req.headers())
    }

    pub fn from_parts(parts: &Parts) -> Self {
        Self::from_head(&parts.method, &parts.uri, &parts.headers)
    }

    fn from_head(method: &Method, uri: &http::Uri, headers: &http::HeaderMap) -> Self {
        // HeaderMap lookups are case-insensitive; non-visible-ASCII ids are dropped.
        let request_id = headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Self { method: method.clone(), path: uri.path().to_owned(), request_id }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn request_id(&self) -> Option<&str> { self.request_id.as_deref() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_request_reads_method_path_and_id() {
        let req = http::Request::post("http://example.com/orders?draft=1")
            .header("X-Request-Id", "r-1")
            .body(())
            .unwrap();

        let cx = Context::from_request(&req);
        assert_eq!(*cx.method(), Method::POST);
        assert_eq!(cx.path(), "/orders");
        assert_eq!(cx.request_id(), Some("r-1"));
    }

    #[test]
    fn missing_request_id_is_none() {
        let (parts, ()) = http::Request::get("/").body(()).unwrap().into_parts();
        assert_eq!(Context::from_parts(&parts).request_id(), None);
    }

    #[test]
    fn built_by_hand() {
        let cx = Context::new(Method::DELETE, "/users/7").with_request_id("r-2");
        assert_eq!(cx.path(), "/users/7");
        assert_eq!(cx.request_id(), Some("r-2"));
    }
}
