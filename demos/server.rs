//! Minimal talkback demo: a hyper server answering through a shared Responder.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example server
//!
//! Try:
//!   curl -i http://localhost:3000/talkback
//!   curl -i -X POST http://localhost:3000/users
//!   curl -i http://localhost:3000/broken          # 500, error in the log
//!   curl -i -X POST http://localhost:3000/v1/users # 307 to /v2/users
//!   curl -i http://localhost:3000/admin           # 401

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde::Serialize;
use talkback::{Context, Recorder, Responder};
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Serialize)]
struct Message {
    #[serde(rename = "Message")]
    message: &'static str,
}

#[derive(Serialize)]
struct User {
    id: u64,
    name: &'static str,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let addr: SocketAddr = "0.0.0.0:3000".parse()?;
    let listener = TcpListener::bind(addr).await?;
    let responder: Arc<Responder> = Arc::new(Responder::default());

    info!(%addr, "talkback demo listening");

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(v) => v,
            Err(e) => {
                error!("accept error: {e}");
                continue;
            }
        };

        let responder = Arc::clone(&responder);
        tokio::spawn(async move {
            let svc = service_fn(move |req| route(Arc::clone(&responder), req));
            if let Err(e) = http1::Builder::new().serve_connection(TokioIo::new(stream), svc).await {
                error!(%peer, "connection error: {e}");
            }
        });
    }
}

async fn route(
    responder: Arc<Responder>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let cx = Context::from_request(&req);
    let mut rec = Recorder::new();

    match (req.method(), req.uri().path()) {
        (&http::Method::GET, "/talkback") => {
            responder.respond_success_with_json(Some(&cx), &mut rec, &Message { message: "talkback" });
        }
        (&http::Method::POST, "/users") => {
            responder.respond_created_with_json(Some(&cx), &mut rec, &User { id: 99, name: "new_user" });
        }
        (_, "/broken") => {
            // A handler bug: nothing to send. Logged, answered with 500.
            responder.respond_success_with_json(Some(&cx), &mut rec, &Option::<User>::None);
        }
        (_, "/v1/users") => responder.redirect_to(Some(&cx), &mut rec, &req, "/v2/users"),
        (_, "/admin") => responder.respond_unauthorized(Some(&cx), &mut rec),
        _ => responder.respond_with_bad_request_json_message(Some(&cx), &mut rec, "no such endpoint"),
    }

    Ok(rec.into_response())
}
