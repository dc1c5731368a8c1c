#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// One request as the mock admin endpoint saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: StatusCode,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
    pub delay: Duration,
}

impl MockResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        MockResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: vec![("content-type", "application/json".to_string())],
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn empty(status: u16) -> Self {
        MockResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: vec![],
            body: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        MockResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: vec![("content-type", "text/plain".to_string())],
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Default)]
struct MockState {
    recorded: Vec<RecordedRequest>,
    scripted: VecDeque<MockResponse>,
}

/// Records every request and answers from a script, falling back to an
/// empty 200 once the script runs out.
#[derive(Clone)]
pub struct MockAdminServer {
    pub base_url: String,
    state: Arc<Mutex<MockState>>,
}

impl MockAdminServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(MockState::default()));

        let app = Router::new().fallback(record).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockAdminServer {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub async fn respond_with(&self, responses: impl IntoIterator<Item = MockResponse>) {
        self.state.lock().await.scripted.extend(responses);
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.recorded.clone()
    }

    pub async fn last_request(&self) -> RecordedRequest {
        self.state.lock().await.recorded.last().cloned().unwrap()
    }
}

async fn record(
    State(state): State<Arc<Mutex<MockState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let scripted = {
        let mut state = state.lock().await;
        state.recorded.push(RecordedRequest {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers,
            body,
        });
        state.scripted.pop_front()
    };
    let scripted = scripted.unwrap_or_else(|| MockResponse::empty(200));
    if !scripted.delay.is_zero() {
        tokio::time::sleep(scripted.delay).await;
    }

    let mut headers = HeaderMap::new();
    for (name, value) in &scripted.headers {
        headers.insert(
            HeaderName::from_static(*name),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    (scripted.status, headers, scripted.body).into_response()
}
