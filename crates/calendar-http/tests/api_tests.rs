//! Integration tests for the JSON API endpoints.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt`
//! without starting a TCP server, except for the final test which
//! serves on a loopback port to exercise graceful shutdown.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use calendar_core::{
    Calendar, CancelToken, Context, Event, MemoryStore, Repository, StorageError, TimeWindow,
};
use calendar_http::{AppState, HttpServer, ServerConfig, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;
use tracing_subscriber::layer::{Context as LayerContext, SubscriberExt};

fn app() -> Router {
    let calendar = Calendar::new(Arc::new(MemoryStore::new()));
    build_router(AppState::new(calendar, Duration::from_secs(5)))
}

fn event_body(id: &str, start: &str, minutes: i64) -> Value {
    json!({
        "id": id,
        "title": format!("event {id}"),
        "startTime": start,
        "duration": minutes * 60 * 1_000_000_000,
        "userId": "u1",
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, json)
}

#[tokio::test]
async fn root_says_hello() {
    let (status, body) = send(&app(), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String(String::from("Hello, world!")));
}

#[tokio::test]
async fn create_then_conflict_then_list() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/events",
        Some(event_body("a", "2025-07-03T12:00:00Z", 60)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "a");
    assert_eq!(body["duration"], 3_600_000_000_000_u64);

    let (status, body) = send(
        &app,
        Method::POST,
        "/events",
        Some(event_body("b", "2025-07-03T12:30:00Z", 60)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);
    assert!(body["error"].as_str().unwrap().contains("busy"));

    let (status, body) = send(
        &app,
        Method::GET,
        "/events/day?userId=u1&date=2025-07-03",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], "a");
    assert_eq!(events[0]["startTime"], "2025-07-03T12:00:00Z");
    assert_eq!(events[0]["userId"], "u1");
}

#[tokio::test]
async fn duplicate_id_is_conflict() {
    let app = app();
    let first = event_body("a", "2025-07-03T09:00:00Z", 30);
    let again = event_body("a", "2025-07-04T09:00:00Z", 30);

    let (status, _) = send(&app, Method::POST, "/events", Some(first)).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, Method::POST, "/events", Some(again)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_bodies_are_400() {
    let app = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/events")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let missing_start = json!({"id": "a", "duration": 1, "userId": "u1"});
    let (status, _) = send(&app, Method::POST, "/events", Some(missing_start)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let negative = event_body("a", "2025-07-03T12:00:00Z", -5);
    let (status, body) = send(&app, Method::POST, "/events", Some(negative)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let bad_time = json!({"id": "a", "startTime": "yesterday", "duration": 1, "userId": "u1"});
    let (status, _) = send(&app, Method::POST, "/events", Some(bad_time)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_paths() {
    let app = app();
    send(
        &app,
        Method::POST,
        "/events",
        Some(event_body("1", "2025-07-03T12:00:00Z", 60)),
    )
    .await;
    send(
        &app,
        Method::POST,
        "/events",
        Some(event_body("3", "2025-07-03T14:00:00Z", 60)),
    )
    .await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/events/42",
        Some(event_body("ignored", "2025-07-03T18:00:00Z", 60)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/events/3",
        Some(event_body("3", "2025-07-03T12:30:00Z", 60)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/events/3",
        Some(event_body("ignored", "2025-07-03T16:00:00Z", 30)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "3");

    let (_, body) = send(
        &app,
        Method::GET,
        "/events/day?userId=u1&date=2025-07-03",
        None,
    )
    .await;
    let starts: Vec<&str> = body["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["startTime"].as_str().unwrap())
        .collect();
    assert_eq!(starts, ["2025-07-03T12:00:00Z", "2025-07-03T16:00:00Z"]);
}

#[tokio::test]
async fn delete_once_then_not_found() {
    let app = app();
    send(
        &app,
        Method::POST,
        "/events",
        Some(event_body("1", "2025-07-03T12:00:00Z", 60)),
    )
    .await;

    let (status, body) = send(&app, Method::DELETE, "/events/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, Method::DELETE, "/events/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn week_and_month_windows() {
    let app = app();
    for (id, start) in [
        ("jun", "2025-06-30T23:00:00Z"),
        ("w1", "2025-07-01T08:00:00Z"),
        ("w7", "2025-07-07T23:00:00Z"),
        ("w8", "2025-07-08T00:00:00Z"),
        ("aug", "2025-08-01T00:00:00Z"),
    ] {
        let (status, _) = send(&app, Method::POST, "/events", Some(event_body(id, start, 30))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let ids = |body: &Value| -> Vec<String> {
        body["events"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap().to_owned())
            .collect()
    };

    let (status, body) = send(
        &app,
        Method::GET,
        "/events/week?userId=u1&start=2025-07-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), ["w1", "w7"]);

    let (_, body) = send(
        &app,
        Method::GET,
        "/events/month?userId=u1&start=2025-07-01",
        None,
    )
    .await;
    assert_eq!(ids(&body), ["w1", "w7", "w8"]);
}

#[tokio::test]
async fn list_parameters_are_validated() {
    let app = app();
    for uri in [
        "/events/day?date=2025-07-03",
        "/events/day?userId=u1",
        "/events/day?userId=u1&date=2025-7-3",
        "/events/week?userId=u1&start=tomorrow",
        "/events/month?userId=&start=2025-07-01",
    ] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["status"], 400);
    }
}

#[tokio::test]
async fn wrong_method_is_405() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/events", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    let (status, _) = send(&app, Method::POST, "/events/day", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

/// Repository whose every call fails with a backend error.
struct BrokenStore;

#[async_trait]
impl Repository for BrokenStore {
    async fn create_event(&self, _ctx: &Context, _event: Event) -> Result<(), StorageError> {
        Err(StorageError::backend(std::io::Error::other("password=hunter2 refused")))
    }

    async fn update_event(&self, _ctx: &Context, _event: Event) -> Result<(), StorageError> {
        Err(StorageError::backend(std::io::Error::other("refused")))
    }

    async fn delete_event(&self, _ctx: &Context, _id: &str) -> Result<(), StorageError> {
        Err(StorageError::backend(std::io::Error::other("refused")))
    }

    async fn list_window(
        &self,
        _ctx: &Context,
        _user_id: &str,
        _window: TimeWindow,
    ) -> Result<Vec<Event>, StorageError> {
        Err(StorageError::backend(std::io::Error::other("refused")))
    }
}

#[tokio::test]
async fn backend_failures_are_opaque_500s() {
    let app = build_router(AppState::new(
        Calendar::new(Arc::new(BrokenStore)),
        Duration::from_secs(5),
    ));

    let (status, body) = send(
        &app,
        Method::POST,
        "/events",
        Some(event_body("a", "2025-07-03T12:00:00Z", 60)),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal server error");
    assert_eq!(body["status"], 500);

    let (status, _) = send(
        &app,
        Method::GET,
        "/events/day?userId=u1&date=2025-07-03",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn server_stops_when_token_is_cancelled() {
    let config = ServerConfig {
        host: String::from("127.0.0.1"),
        port: 0,
    };
    let calendar = Calendar::new(Arc::new(MemoryStore::new()));
    let server = HttpServer::bind(&config, AppState::new(calendar, Duration::from_secs(5)))
        .await
        .unwrap();
    assert_ne!(server.local_addr().unwrap().port(), 0);

    let token = CancelToken::new();
    let handle = tokio::spawn(server.serve(token.clone()));
    token.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}

/// Counts every tracing event emitted while installed.
struct EventCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCounter {
    fn on_event(&self, _event: &tracing::Event<'_>, _ctx: LayerContext<'_, S>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn each_request_is_logged_once() {
    let events = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(EventCounter(Arc::clone(&events)));
    let _guard = tracing::subscriber::set_default(subscriber);

    let (status, _) = send(&app(), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.load(Ordering::SeqCst), 1);
}
