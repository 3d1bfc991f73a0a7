//! Throwaway push origin shared by the integration tests.
#![allow(dead_code)]

use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::{extract::State, Router};
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub type Requests = Arc<Mutex<Vec<Recorded>>>;

#[derive(Clone)]
struct Origin {
    requests: Requests,
    status: StatusCode,
    delay: Duration,
}

async fn record(
    State(origin): State<Origin>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    origin.requests.lock().unwrap().push(Recorded {
        method,
        path: uri.path().to_string(),
        headers,
        body,
    });
    tokio::time::sleep(origin.delay).await;
    origin.status
}

/// Answers every request with `status`.
pub async fn spawn_origin(status: StatusCode) -> (SocketAddr, Requests) {
    spawn_slow_origin(status, Duration::ZERO).await
}

/// Records each request on arrival, then holds it for `delay` before
/// answering.
pub async fn spawn_slow_origin(status: StatusCode, delay: Duration) -> (SocketAddr, Requests) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(record).with_state(Origin {
        requests: requests.clone(),
        status,
        delay,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, requests)
}

pub fn base_url(addr: SocketAddr) -> Url {
    Url::parse(&format!("http://user:secret@{}/push/acme/live1/main/", addr)).unwrap()
}

pub fn paths(requests: &Requests) -> Vec<String> {
    requests
        .lock()
        .unwrap()
        .iter()
        .map(|r| r.path.clone())
        .collect()
}
