//! Local HTTP server for backend tests.
//!
//! Replays scripted `(status, json)` replies in order and records every
//! request it receives.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::post;
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct MockServer {
    replies: Arc<Mutex<VecDeque<(u16, Value)>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    pub fn new(replies: Vec<(u16, Value)>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            requests: Arc::default(),
        }
    }

    /// Bind to an ephemeral port and return the base URL.
    pub async fn start(&self) -> String {
        let app = Router::new()
            .route("/{*path}", post(handle))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle(
    State(server): State<MockServer>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    server.requests.lock().unwrap().push(Recorded {
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });
    let (status, reply) = server
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((500, json!({"error": {"message": "no scripted reply"}})));
    (
        StatusCode::from_u16(status).unwrap(),
        [("content-type", "application/json")],
        reply.to_string(),
    )
}
