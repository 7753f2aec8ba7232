//! The [`Responder`]: one well-formed response per call, or a logged `500`.
//!
//! Every operation runs the same short state machine:
//!
//! ```text
//! Start ─► serialize ─┬─ ok ──► set headers, write status ─► write body ─┬─ ok ──► Done
//!                     └─ err ─┐                                          └─ err ─┐
//!                             ▼                                                  ▼
//!                   log_internal_error_and_respond: logger called once, status 500
//! ```
//!
//! There is no retry. Once serialization or the body write fails, the
//! operation commits to the `500` fallback. Whether the client actually sees
//! that `500` depends on whether the sink had already committed its head; see
//! [`sink`](crate::sink).

use std::error::Error as StdError;
use std::fmt::Display;

use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderValue, StatusCode};
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use url::{Position, Url};

use crate::context::Context;
use crate::error::Error;
use crate::logger::{ErrorLogger, TracingLogger};
use crate::sink::ResponseSink;

const APPLICATION_JSON: &str = "application/json";

/// Writes standardized responses into a [`ResponseSink`].
///
/// Holds nothing but its [`ErrorLogger`], so one instance can serve every
/// request. Wrap it in an `Arc` and clone freely.
///
/// ```rust
/// use talkback::{Recorder, Responder};
///
/// let responder: Responder = Responder::default();
/// let mut rec = Recorder::new();
///
/// responder.respond_success_with_json(None, &mut rec, &serde_json::json!({"id": 42}));
///
/// assert_eq!(rec.status(), 200);
/// assert_eq!(rec.body(), br#"{"id":42}"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Responder<L = TracingLogger> {
    logger: L,
}

impl<L: ErrorLogger> Responder<L> {
    pub fn new(logger: L) -> Self {
        Self { logger }
    }

    // ── Status-only ──────────────────────────────────────────────────────────

    /// `200 OK`, no body.
    pub fn respond_success<S>(&self, _cx: Option<&Context>, sink: &mut S)
    where
        S: ResponseSink + ?Sized,
    {
        sink.write_status(StatusCode::OK);
    }

    /// `401 Unauthorized`, no body.
    pub fn respond_unauthorized<S>(&self, _cx: Option<&Context>, sink: &mut S)
    where
        S: ResponseSink + ?Sized,
    {
        sink.write_status(StatusCode::UNAUTHORIZED);
    }

    // ── JSON ─────────────────────────────────────────────────────────────────

    /// `200 OK` with `payload` as JSON.
    pub fn respond_success_with_json<S, T>(&self, cx: Option<&Context>, sink: &mut S, payload: &T)
    where
        S: ResponseSink + ?Sized,
        T: Serialize + ?Sized,
    {
        self.respond_with_json(cx, sink, StatusCode::OK, payload);
    }

    /// `201 Created` with `payload` as JSON.
    pub fn respond_created_with_json<S, T>(&self, cx: Option<&Context>, sink: &mut S, payload: &T)
    where
        S: ResponseSink + ?Sized,
        T: Serialize + ?Sized,
    {
        self.respond_with_json(cx, sink, StatusCode::CREATED, payload);
    }

    /// `status` with `payload` as JSON.
    ///
    /// A payload that fails to serialize, or serializes to `null`, is a caller
    /// bug: nothing is written except the `500` fallback.
    pub fn respond_with_json<S, T>(
        &self,
        cx: Option<&Context>,
        sink: &mut S,
        status: StatusCode,
        payload: &T,
    ) where
        S: ResponseSink + ?Sized,
        T: Serialize + ?Sized,
    {
        match encode(payload) {
            Ok(body) => self.write_json(cx, sink, status, &body),
            Err(e) => self.log_internal_error_and_respond(cx, sink, &e),
        }
    }

    /// `status` with an already-serialized JSON body.
    ///
    /// The bytes are sent as-is, except that a literal `null` is refused the
    /// same way [`respond_with_json`](Self::respond_with_json) refuses it.
    pub fn respond_with_raw_json<S>(
        &self,
        cx: Option<&Context>,
        sink: &mut S,
        status: StatusCode,
        body: &[u8],
    ) where
        S: ResponseSink + ?Sized,
    {
        if body == b"null" {
            return self.log_internal_error_and_respond(cx, sink, &Error::NullBody);
        }
        self.write_json(cx, sink, status, body);
    }

    /// `400 Bad Request` with body `{"error": "<message>"}`.
    ///
    /// Takes anything displayable, so an error value can be passed directly.
    pub fn respond_with_bad_request<S>(
        &self,
        cx: Option<&Context>,
        sink: &mut S,
        message: impl Display,
    ) where
        S: ResponseSink + ?Sized,
    {
        self.respond_with_bad_request_json_message(cx, sink, &message.to_string());
    }

    /// `400 Bad Request` with body `{"error": "<message>"}`.
    pub fn respond_with_bad_request_json_message<S>(
        &self,
        cx: Option<&Context>,
        sink: &mut S,
        message: &str,
    ) where
        S: ResponseSink + ?Sized,
    {
        self.respond_with_json(cx, sink, StatusCode::BAD_REQUEST, &json!({ "error": message }));
    }

    // ── Redirects ────────────────────────────────────────────────────────────

    /// `307 Temporary Redirect` to `url`.
    ///
    /// The client replays the request with the same method and body. A `url`
    /// without a scheme is a reference resolved against the request URI, so
    /// `"next"`, `"../up"` and `"?page=2"` all work. A target that does not
    /// parse as a URL ends in the `500` fallback.
    pub fn redirect_to<S, B>(
        &self,
        cx: Option<&Context>,
        sink: &mut S,
        req: &http::Request<B>,
        url: &str,
    ) where
        S: ResponseSink + ?Sized,
    {
        let location = match resolve_location(req.uri(), url) {
            Ok(location) => location,
            Err(source) => {
                let err = Error::InvalidLocation { location: url.to_owned(), source };
                return self.log_internal_error_and_respond(cx, sink, &err);
            }
        };
        // Url output is always visible ASCII.
        let value = match HeaderValue::from_str(&location) {
            Ok(v) => v,
            Err(e) => return self.log_internal_error_and_respond(cx, sink, &e),
        };

        debug!(method = %req.method(), location = %location, "temporary redirect");
        sink.set_header(LOCATION, value);
        sink.write_status(StatusCode::TEMPORARY_REDIRECT);
    }

    // ── Fallback ─────────────────────────────────────────────────────────────

    /// Hands `err` to the logger, then writes `500 Internal Server Error` with
    /// no body.
    ///
    /// If the sink already committed its head, the status write is a no-op
    /// and only the log entry remains.
    pub fn log_internal_error_and_respond<S>(
        &self,
        cx: Option<&Context>,
        sink: &mut S,
        err: &dyn StdError,
    ) where
        S: ResponseSink + ?Sized,
    {
        self.logger.log(cx, err);
        sink.write_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    fn write_json<S>(&self, cx: Option<&Context>, sink: &mut S, status: StatusCode, body: &[u8])
    where
        S: ResponseSink + ?Sized,
    {
        sink.set_header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        sink.write_status(status);

        let expected = body.len();
        let err = match sink.write_body(body) {
            Ok(written) if written < expected => Error::ShortWrite { written, expected },
            Ok(_) => return,
            Err(e) => Error::Write(e),
        };
        self.log_internal_error_and_respond(cx, sink, &err);
    }
}

fn encode<T: Serialize + ?Sized>(payload: &T) -> Result<Vec<u8>, Error> {
    let body = serde_json::to_vec(payload)?;
    if body == b"null" {
        return Err(Error::NullBody);
    }
    Ok(body)
}

// ── Location resolution ──────────────────────────────────────────────────────

/// Stands in for the scheme and authority the client used. It never appears
/// in a location.
const RELATIVE_BASE: &str = "http://localhost";

/// Turns a redirect target into a `location` value.
///
/// Absolute URLs are normalized by [`Url`] (IDNA host, percent-encoding). A
/// network-path reference (`//host/...`) keeps its scheme-relative form. Any
/// other reference resolves against the request's path and query.
fn resolve_location(request: &http::Uri, target: &str) -> Result<String, url::ParseError> {
    match Url::parse(target) {
        Ok(absolute) => {
            // `https://example.com` serializes with a `/` path; keep what the caller wrote.
            let bare = absolute.path() == "/"
                && absolute.query().is_none()
                && absolute.fragment().is_none()
                && !target.ends_with('/');
            let mut location = String::from(absolute);
            if bare {
                location.pop();
            }
            Ok(location)
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let current = request.path_and_query().map_or("/", |pq| pq.as_str());
            let resolved = Url::parse(RELATIVE_BASE)?.join(current)?.join(target)?;
            if target.starts_with("//") {
                Ok(format!("//{}", &resolved[Position::BeforeUsername..]))
            } else {
                Ok(resolved[Position::BeforePath..].to_owned())
            }
        }
        Err(e) => Err(e),
    }
}
