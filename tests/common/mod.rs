//! A stand-in Ollama server for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct FakeOllama {
    models: Arc<Vec<String>>,
    /// Every `/api/chat` request body, in arrival order
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeOllama {
    pub fn new(models: &[&str]) -> Self {
        Self {
            models: Arc::new(models.iter().map(|m| m.to_string()).collect()),
            requests: Arc::default(),
        }
    }

    /// Serve on an ephemeral port, returning the base URL
    pub async fn start(self) -> String {
        let app = Router::new()
            .route("/api/tags", get(tags))
            .route("/api/chat", post(chat))
            .layer(DefaultBodyLimit::disable())
            .with_state(self);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    pub fn chat_requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

/// The reply the fake model gives: `<model> heard: <last message>`
pub fn expected_reply(model: &str, last_message: &str) -> String {
    format!("{} heard: {}", model, last_message)
}

async fn tags(State(state): State<FakeOllama>) -> Json<Value> {
    let models: Vec<Value> = state
        .models
        .iter()
        .map(|m| json!({ "name": m, "model": m, "size": 1 }))
        .collect();
    Json(json!({ "models": models }))
}

async fn chat(State(state): State<FakeOllama>, Json(body): Json<Value>) -> Response {
    state.requests.lock().unwrap().push(body.clone());

    let model = body["model"].as_str().unwrap_or_default().to_string();
    if !state.models.contains(&model) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("model '{}' not found", model) })),
        )
            .into_response();
    }

    let last = body["messages"]
        .as_array()
        .and_then(|m| m.last())
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_string();
    let reply = expected_reply(&model, &last);

    // One NDJSON line per word, then the final done line
    let mut ndjson = String::new();
    let words: Vec<&str> = reply.split_inclusive(' ').collect();
    for word in words {
        let line = json!({
            "model": model,
            "message": { "role": "assistant", "content": word },
            "done": false
        });
        ndjson.push_str(&line.to_string());
        ndjson.push('\n');
    }
    let done = json!({
        "model": model,
        "message": { "role": "assistant", "content": "" },
        "done": true,
        "done_reason": "stop"
    });
    ndjson.push_str(&done.to_string());
    ndjson.push('\n');

    // Small chunks so lines straddle chunk boundaries; large replies get at most ~4096
    let chunk_size = (ndjson.len() / 4096).max(7);
    let chunks: Vec<Result<Bytes, std::io::Error>> = ndjson
        .into_bytes()
        .chunks(chunk_size)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();

    Response::builder()
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .body(Body::from_stream(futures::stream::iter(chunks)))
        .unwrap()
}
