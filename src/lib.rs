//! # talkback
//!
//! Standardized HTTP response writing. Status codes, JSON bodies, redirects,
//! and one way out when something breaks halfway: log it, answer `500`.
//!
//! ## The contract
//!
//! Every [`Responder`] operation produces exactly one response. When
//! serialization or the body write fails, the failure goes to the injected
//! [`ErrorLogger`] once and the response becomes `500 Internal Server Error`.
//! Nothing is returned to the caller. There is nothing left to handle.
//!
//! What talkback does not touch:
//!
//! - **Routing**: bring your own router
//! - **Request parsing and validation**: you decide what a bad request is
//! - **Authentication**: talkback only writes the `401`
//! - **The transport**: hyper, a raw socket, or anything else that implements
//!   [`ResponseSink`]
//!
//! ## Quick start
//!
//! ```rust
//! use talkback::{Context, Recorder, Responder, TracingLogger};
//!
//! # #[derive(serde::Serialize)] struct User { id: u64 }
//! let responder = Responder::new(TracingLogger);
//!
//! let req = http::Request::get("/users/42").body(()).unwrap();
//! let cx = Context::from_request(&req);
//! let mut rec = Recorder::new();
//!
//! responder.respond_success_with_json(Some(&cx), &mut rec, &User { id: 42 });
//!
//! // hyper-ready: http::Response<Full<Bytes>>
//! let res = rec.into_response();
//! assert_eq!(res.status(), 200);
//! ```

mod context;
mod error;
mod logger;
mod responder;

pub mod sink;

pub use context::{Context, X_REQUEST_ID};
pub use error::Error;
pub use logger::{ErrorLogger, NoopLogger, TracingLogger};
pub use responder::Responder;
pub use sink::{Recorder, ResponseSink};
