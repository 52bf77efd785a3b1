//! Shared test fixture: an in-process mock of the Kibana Logstash
//! management API, recording every request it receives.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as the mock server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
pub struct MockState {
    /// Stored pipeline bodies keyed by id, exactly as written.
    pub pipelines: Arc<Mutex<HashMap<String, Value>>>,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// When set, every PUT answers with this status and raw body instead.
    pub put_failure: Arc<Mutex<Option<(u16, String)>>>,
}

impl MockState {
    fn record(&self, method: &str, path: String, headers: HeaderMap, body: Option<Value>) {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.to_string(),
            path,
            headers,
            body,
        });
    }
}

pub struct MockKibana {
    pub addr: SocketAddr,
    pub state: MockState,
    handle: JoinHandle<()>,
}

impl MockKibana {
    pub async fn spawn() -> Self {
        let state = MockState::default();
        let app = Router::new()
            .route("/api/logstash/pipelines", get(list_pipelines))
            .route(
                "/api/logstash/pipeline/{id}",
                get(get_pipeline).put(put_pipeline).delete(delete_pipeline),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Store a pipeline body as if it had been written earlier.
    pub fn seed(&self, id: &str, body: Value) {
        self.state
            .pipelines
            .lock()
            .unwrap()
            .insert(id.to_string(), body);
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

fn not_found_body(message: &str) -> Json<Value> {
    Json(json!({
        "statusCode": 404,
        "error": "Not Found",
        "message": message,
    }))
}

async fn list_pipelines(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.record("GET", "/api/logstash/pipelines".to_string(), headers, None);
    let entries: Vec<Value> = state
        .pipelines
        .lock()
        .unwrap()
        .iter()
        .map(|(id, body)| {
            json!({
                "id": id,
                "description": body.get("description").cloned().unwrap_or(Value::Null),
                "last_modified": "2023-06-01T10:00:00.000Z",
                "username": "elastic",
            })
        })
        .collect();
    Json(json!({ "pipelines": entries })).into_response()
}

async fn get_pipeline(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record("GET", format!("/api/logstash/pipeline/{}", id), headers, None);
    match state.pipelines.lock().unwrap().get(&id) {
        Some(body) => {
            let mut body = body.clone();
            body.as_object_mut()
                .unwrap()
                .insert("username".to_string(), json!("elastic"));
            Json(body).into_response()
        }
        None => (StatusCode::NOT_FOUND, not_found_body("Not Found")).into_response(),
    }
}

async fn put_pipeline(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let parsed: Option<Value> = serde_json::from_slice(&body).ok();
    state.record(
        "PUT",
        format!("/api/logstash/pipeline/{}", id),
        headers,
        parsed.clone(),
    );

    if let Some((status, raw)) = state.put_failure.lock().unwrap().clone() {
        return (StatusCode::from_u16(status).unwrap(), raw).into_response();
    }

    let Some(parsed) = parsed else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "statusCode": 400,
                "error": "Bad Request",
                "message": "invalid JSON body",
            })),
        )
            .into_response();
    };

    state.pipelines.lock().unwrap().insert(id, parsed);
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_pipeline(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record(
        "DELETE",
        format!("/api/logstash/pipeline/{}", id),
        headers,
        None,
    );
    match state.pipelines.lock().unwrap().remove(&id) {
        Some(_) => Json(json!({})).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            not_found_body(&format!("no pipeline with id {}", id)),
        )
            .into_response(),
    }
}
