//! End-to-end: responder output served by a real hyper HTTP/1 connection.

use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::json;
use talkback::{Context, ErrorLogger, Recorder, Responder};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn handle<L: ErrorLogger>(
    responder: Arc<Responder<L>>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let cx = Context::from_request(&req);
    let mut rec = Recorder::new();

    match req.uri().path() {
        "/talkback" => responder.respond_success_with_json(Some(&cx), &mut rec, &json!({ "Message": "talkback" })),
        "/nothing" => responder.respond_success_with_json(Some(&cx), &mut rec, &json!(null)),
        "/private" => responder.respond_unauthorized(Some(&cx), &mut rec),
        "/old/page" => responder.redirect_to(Some(&cx), &mut rec, &req, "new"),
        _ => responder.respond_with_bad_request_json_message(Some(&cx), &mut rec, "unknown path"),
    }

    Ok(rec.into_response())
}

async fn serve(logged: Arc<AtomicUsize>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let responder = Arc::new(Responder::new(move |_cx: Option<&Context>, _err: &dyn StdError| {
        logged.fetch_add(1, Ordering::SeqCst);
    }));

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else { continue };
            let responder = Arc::clone(&responder);
            tokio::spawn(async move {
                let svc = service_fn(move |req| handle(Arc::clone(&responder), req));
                let _ = http1::Builder::new().serve_connection(TokioIo::new(stream), svc).await;
            });
        }
    });

    addr
}

async fn get(addr: SocketAddr, method: &str, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!("{method} {path} HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n");
    stream.write_all(req.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    String::from_utf8(raw).unwrap()
}

#[tokio::test]
async fn json_success_over_the_wire() {
    let logged = Arc::new(AtomicUsize::new(0));
    let addr = serve(Arc::clone(&logged)).await;

    let res = get(addr, "GET", "/talkback").await;

    assert!(res.starts_with("HTTP/1.1 200 OK\r\n"), "{res}");
    assert!(res.contains("content-type: application/json\r\n"), "{res}");
    assert!(res.ends_with(r#"{"Message":"talkback"}"#), "{res}");
    assert_eq!(logged.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn null_payload_becomes_500() {
    let logged = Arc::new(AtomicUsize::new(0));
    let addr = serve(Arc::clone(&logged)).await;

    let res = get(addr, "GET", "/nothing").await;

    assert!(res.starts_with("HTTP/1.1 500 Internal Server Error\r\n"), "{res}");
    assert_eq!(logged.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unauthorized_and_bad_request() {
    let logged = Arc::new(AtomicUsize::new(0));
    let addr = serve(Arc::clone(&logged)).await;

    let res = get(addr, "GET", "/private").await;
    assert!(res.starts_with("HTTP/1.1 401 Unauthorized\r\n"), "{res}");

    let res = get(addr, "GET", "/elsewhere").await;
    assert!(res.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{res}");
    assert!(res.ends_with(r#"{"error":"unknown path"}"#), "{res}");

    assert_eq!(logged.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn relative_redirect_keeps_method() {
    let logged = Arc::new(AtomicUsize::new(0));
    let addr = serve(Arc::clone(&logged)).await;

    let res = get(addr, "PUT", "/old/page").await;

    assert!(res.starts_with("HTTP/1.1 307 Temporary Redirect\r\n"), "{res}");
    assert!(res.contains("location: /old/new\r\n"), "{res}");
}
