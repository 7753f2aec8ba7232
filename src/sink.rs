//! Output sinks: where status, headers and body bytes end up.
//!
//! # Commit
//!
//! A status written to a sink stays *pending* until the response head is
//! committed, which happens on the first body write. While it is pending, a
//! later [`write_status`](ResponseSink::write_status) replaces it. That is
//! what lets a [`Responder`](crate::Responder) turn a failed body
//! write into a clean `500`.
//!
//! Once committed, the status line and headers belong to the transport.
//! Further status and header writes are ignored with a warning. A failure
//! after that point is still logged, but the client sees whatever was already
//! committed. HTTP cannot take a status back.

use std::io;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use http_body_util::Full;
use tracing::warn;

// ── ResponseSink ─────────────────────────────────────────────────────────────

/// The per-request destination a [`Responder`](crate::Responder) writes into.
pub trait ResponseSink {
    /// Sets a response header, replacing any previous value for `name`.
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Sets the response status. See the [module docs](crate::sink) for override rules.
    fn write_status(&mut self, status: StatusCode);

    /// Writes body bytes, committing the head first if needed.
    ///
    /// Returns how many bytes of `data` were accepted.
    fn write_body(&mut self, data: &[u8]) -> io::Result<usize>;
}

// ── Recorder ─────────────────────────────────────────────────────────────────

/// Buffers one response in memory.
///
/// Hand it to the responder, then return [`Recorder::into_response`] from a
/// hyper `service_fn`, or inspect it directly in tests.
///
/// ```rust
/// use talkback::{NoopLogger, Recorder, Responder};
///
/// let mut rec = Recorder::new();
/// Responder::new(NoopLogger).respond_unauthorized(None, &mut rec);
///
/// let res = rec.into_response();
/// assert_eq!(res.status(), 401);
/// ```
#[derive(Debug, Default)]
pub struct Recorder {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
    committed: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The status the response will carry. `200 OK` if none was written.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn is_committed(&self) -> bool { self.committed }

    pub fn into_response(self) -> http::Response<Full<Bytes>> {
        let status = self.status();
        let mut res = http::Response::new(Full::new(self.body.freeze()));
        *res.status_mut() = status;
        *res.headers_mut() = self.headers;
        res
    }
}

impl ResponseSink for Recorder {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        if self.committed {
            warn!(header = %name, "header set after response was committed, ignoring");
            return;
        }
        self.headers.insert(name, value);
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.committed {
            warn!(status = status.as_u16(), committed = self.status().as_u16(), "superfluous status write");
            return;
        }
        self.status = Some(status);
    }

    fn write_body(&mut self, data: &[u8]) -> io::Result<usize> {
        self.committed = true;
        self.body.extend_from_slice(data);
        Ok(data.len())
    }
}
