//! The error-reporting capability injected into a [`Responder`](crate::Responder).
//!
//! Three backends ship with the crate, and any closure with the right shape
//! works as a fourth:
//!
//! ```rust
//! use std::error::Error;
//! use talkback::{Context, Responder, TracingLogger, NoopLogger};
//!
//! let _structured = Responder::new(TracingLogger);
//! let _silent     = Responder::new(NoopLogger);
//! let _custom     = Responder::new(|_cx: Option<&Context>, err: &dyn Error| {
//!     eprintln!("response failed: {err}");
//! });
//! ```

use std::error::Error as StdError;
use std::fmt;

use tracing::error;

use crate::context::Context;

// ── ErrorLogger ──────────────────────────────────────────────────────────────

/// Receives every failure a [`Responder`](crate::Responder) recovers from.
///
/// Called at most once per responder operation, possibly from many requests at
/// the same time. Implementations must not panic and should not block.
pub trait ErrorLogger: Send + Sync {
    fn log(&self, cx: Option<&Context>, err: &dyn StdError);
}

impl<F> ErrorLogger for F
where
    F: Fn(Option<&Context>, &dyn StdError) + Send + Sync,
{
    fn log(&self, cx: Option<&Context>, err: &dyn StdError) {
        self(cx, err)
    }
}

// ── Backends ─────────────────────────────────────────────────────────────────

/// Emits one `tracing` error event per failure, with the request id, method
/// and path as fields when a [`Context`] is supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ErrorLogger for TracingLogger {
    fn log(&self, cx: Option<&Context>, err: &dyn StdError) {
        let chain = Chain(err);
        match cx {
            Some(cx) => error!(
                request_id = cx.request_id().unwrap_or("unknown"),
                method = %cx.method(),
                path = cx.path(),
                error = %chain,
                "failed to write response"
            ),
            None => error!(error = %chain, "failed to write response"),
        }
    }
}

/// Swallows every failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl ErrorLogger for NoopLogger {
    fn log(&self, _cx: Option<&Context>, _err: &dyn StdError) {}
}

/// Renders an error and its `source()` chain as `outer: inner: root`,
/// skipping causes the outer message already spells out.
struct Chain<'a>(&'a dyn StdError);

impl fmt::Display for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut shown = self.0.to_string();
        f.write_str(&shown)?;
        let mut next = self.0.source();
        while let Some(cause) = next {
            let msg = cause.to_string();
            if !shown.ends_with(&msg) {
                write!(f, ": {msg}")?;
            }
            shown = msg;
            next = cause.source();
        }
        Ok(())
    }
}
