//! Test helpers shared by the client and adapter crates.

use anyhow::Context as _;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A request captured by [`MockUpstream`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

struct Shared {
    status: StatusCode,
    body: String,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Local HTTP server that answers every request with a canned status and body and
/// records what it received.
pub struct MockUpstream {
    base_url: String,
    shared: Arc<Shared>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl MockUpstream {
    /// Start a server on an ephemeral localhost port.
    ///
    /// # Errors
    ///
    /// Returns an error if `status` is not a valid HTTP status or the port cannot be bound.
    pub async fn start(status: u16, body: impl Into<String>) -> anyhow::Result<Self> {
        let status = StatusCode::from_u16(status).context("invalid status code")?;
        let shared = Arc::new(Shared {
            status,
            body: body.into(),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .fallback(record_and_reply)
            .with_state(shared.clone());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind mock upstream")?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        let handle = tokio::spawn(async move {
            let _ = server.await;
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            shared,
            shutdown: Some(shutdown_tx),
            handle,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared
            .requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// The single request received so far.
    ///
    /// # Panics
    ///
    /// Panics unless exactly one request was recorded.
    pub fn only_request(&self) -> RecordedRequest {
        let mut requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one upstream request");
        requests.remove(0)
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.abort();
    }
}

async fn record_and_reply(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
        })
        .collect();

    if let Ok(mut requests) = shared.requests.lock() {
        requests.push(RecordedRequest {
            method: method.as_str().to_string(),
            path: uri.path().to_string(),
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    (
        shared.status,
        [(CONTENT_TYPE, "application/json")],
        shared.body.clone(),
    )
        .into_response()
}

/// Base URL of a localhost port with nothing listening on it.
///
/// Note: the port is released before returning, so another process could grab it.
///
/// # Errors
///
/// Returns an error if binding an ephemeral localhost port fails.
pub fn unreachable_base_url() -> anyhow::Result<String> {
    let listener = StdTcpListener::bind("127.0.0.1:0").context("bind ephemeral port")?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(format!("http://127.0.0.1:{port}"))
}
