use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{self, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{
    routes::{self, AppState},
    store::memory::MemoryStore,
};

pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
}

pub fn setup() -> TestContext {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let store = Arc::new(MemoryStore::default());
    let app = routes::router(AppState::new(store.clone()));
    TestContext { app, store }
}

/// Sends one request through a clone of the router and decodes the JSON reply.
pub async fn send(
    app: &Router,
    method: http::Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(http::header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Registers a user through the API and returns its id.
pub async fn register_user(app: &Router, name: &str) -> i64 {
    let (status, body) = send(
        app,
        http::Method::POST,
        "/registrar",
        Some(json!({
            "nome": name,
            "email": format!("{name}@example.com"),
            "senha": "password123",
            "dataNascimento": "2000-01-31",
            "controle": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["user"]["id"].as_i64().unwrap()
}
