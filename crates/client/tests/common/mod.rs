//! Common test utilities
#![allow(dead_code)] // Not every test file uses every helper

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use eden_console::config::ClientConfig;
use eden_console::notify::RecordingNotifier;
use eden_console::store::{KeyValueStore, MemoryStore};
use eden_console::Console;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Canned answer of the mock backend
#[derive(Clone)]
pub enum Reply {
    Json(u16, Value),
    Text(u16, String),
    /// Wait before answering with the inner reply
    Slow(Duration, Box<Reply>),
}

impl Reply {
    /// HTTP 200 with a success envelope around `data`
    pub fn ok(data: Value) -> Self {
        Self::Json(200, json!({ "code": 200, "message": "ok", "data": data }))
    }

    /// HTTP 200 with a failure envelope
    pub fn app_error(code: i64, message: &str) -> Self {
        Self::Json(200, json!({ "code": code, "message": message, "data": null }))
    }

    pub fn status(status: u16, message: &str) -> Self {
        Self::Json(status, json!({ "code": status, "message": message, "data": null }))
    }
}

/// One request as seen by the mock backend
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Vec<String>,
    pub body: Option<Value>,
}

impl Hit {
    /// Value of a query parameter
    pub fn param(&self, key: &str) -> Option<String> {
        self.query.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == key).then(|| urlencoding::decode(v).map(|v| v.into_owned()).unwrap_or_default())
        })
    }
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(String, String), Reply>>,
    hits: Mutex<Vec<Hit>>,
}

/// HTTP backend on 127.0.0.1 that answers with canned replies and records
/// every request it receives
pub struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Answer `method path` with `reply` from now on
    pub fn on(&self, method: &str, path: &str, reply: Reply) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), reply);
    }

    /// Canned successful login for `token`
    pub fn on_login(&self, token: &str, user: Value) {
        self.on(
            "POST",
            "/api/v1/login",
            Reply::ok(json!({ "token": token, "user": user })),
        );
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.state.hits.lock().unwrap().clone()
    }

    pub fn hits_to(&self, path: &str) -> Vec<Hit> {
        self.hits().into_iter().filter(|h| h.path == path).collect()
    }

    pub fn last_hit(&self) -> Hit {
        self.hits().last().cloned().expect("no request received")
    }

    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::default();
        config.api.base_url = self.base_url.clone();
        config.api.timeout_secs = 2;
        config
    }

    /// Console against this backend with an in-memory store
    pub fn console(&self) -> (Console, Arc<RecordingNotifier>) {
        self.console_with_store(Arc::new(MemoryStore::new()))
    }

    pub fn console_with_store(
        &self,
        store: Arc<dyn KeyValueStore>,
    ) -> (Console, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let console = Console::with_store(self.config(), store, notifier.clone()).unwrap();
        (console, notifier)
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let hit = Hit {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        authorization: headers
            .get_all(header::AUTHORIZATION)
            .iter()
            .filter_map(|v| v.to_str().ok().map(ToString::to_string))
            .collect(),
        body: serde_json::from_slice(&body).ok(),
    };
    let key = (hit.method.clone(), hit.path.clone());
    state.hits.lock().unwrap().push(hit);

    let reply = state.routes.lock().unwrap().get(&key).cloned();
    match reply {
        Some(reply) => render(reply).await,
        None => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({ "code": 404, "message": "no such route", "data": null })),
        )
            .into_response(),
    }
}

async fn render(reply: Reply) -> Response {
    let mut reply = reply;
    while let Reply::Slow(delay, inner) = reply {
        tokio::time::sleep(delay).await;
        reply = *inner;
    }
    match reply {
        Reply::Json(status, value) => (status_code(status), axum::Json(value)).into_response(),
        Reply::Text(status, text) => (status_code(status), text).into_response(),
        Reply::Slow(..) => unreachable!(),
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap()
}

/// Profile as the backend renders it
pub fn admin_user() -> Value {
    json!({
        "id": 1,
        "username": "admin",
        "nickname": "Administrator",
        "email": "admin@example.com",
        "status": 1,
        "roles": [{ "id": 1, "name": "Administrator", "code": "admin" }],
        "created_at": "2024-01-01T00:00:00Z"
    })
}

pub fn viewer_user() -> Value {
    json!({
        "id": 2,
        "username": "viewer",
        "nickname": "",
        "status": 1,
        "roles": [{ "id": 3, "name": "Viewer", "code": "viewer" }]
    })
}
