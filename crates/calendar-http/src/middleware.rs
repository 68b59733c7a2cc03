//! Request logging middleware.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request};
use axum::http::header::USER_AGENT;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

/// Log one line per request: peer, start time, request line, status,
/// latency and user agent. The response passes through untouched.
///
/// The peer address is only known when the router is served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let started_at = Utc::now();
    let timer = Instant::now();

    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| String::from("-"), |ConnectInfo(addr)| addr.to_string());
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_owned();

    let response = next.run(request).await;

    let latency_ms = u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::info!(
        remote = %remote,
        timestamp = %started_at.format("%d/%b/%Y:%H:%M:%S %z"),
        method = %method,
        uri = %uri,
        version = ?version,
        status = response.status().as_u16(),
        latency_ms,
        user_agent = %user_agent,
        "http request"
    );

    response
}
