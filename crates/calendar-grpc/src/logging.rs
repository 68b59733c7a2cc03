//! Per-call logging for the gRPC server.
//!
//! [`GrpcLogLayer`] wraps the tonic router. Errors produced by tonic
//! handlers are sent trailers-only, so their `grpc-status` is visible in
//! the response headers; a missing header means the call succeeded.

use std::task::{Context, Poll};
use std::time::Instant;

use chrono::Utc;
use tonic::codegen::{BoxFuture, http};
use tower::{Layer, Service};

/// Tower layer adding [`GrpcLog`] around a service.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrpcLogLayer;

impl<S> Layer<S> for GrpcLogLayer {
    type Service = GrpcLog<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GrpcLog { inner }
    }
}

/// Logs method, start time, status, latency and user agent of each call.
#[derive(Debug, Clone)]
pub struct GrpcLog<S> {
    inner: S,
}

/// The status code carried in the response headers, or `Ok`.
pub fn header_status(headers: &http::HeaderMap) -> tonic::Code {
    headers
        .get("grpc-status")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i32>().ok())
        .map_or(tonic::Code::Ok, tonic::Code::from)
}

impl<S, ReqBody, ResBody> Service<http::Request<ReqBody>> for GrpcLog<S>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: http::Request<ReqBody>) -> Self::Future {
        // The clone may not be ready; keep the instance that was polled.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let method = request.uri().path().to_owned();
        let user_agent = request
            .headers()
            .get(http::header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-")
            .to_owned();
        let started_at = Utc::now();
        let timer = Instant::now();

        Box::pin(async move {
            let response = inner.call(request).await?;
            let latency_ms = u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX);
            let status = header_status(response.headers());
            tracing::info!(
                method = %method,
                timestamp = %started_at.to_rfc3339(),
                status = ?status,
                latency_ms,
                user_agent = %user_agent,
                "grpc call"
            );
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_header_means_ok() {
        assert_eq!(header_status(&http::HeaderMap::new()), tonic::Code::Ok);
    }

    #[test]
    fn header_code_is_read() {
        let mut headers = http::HeaderMap::new();
        headers.insert("grpc-status", http::HeaderValue::from_static("5"));
        assert_eq!(header_status(&headers), tonic::Code::NotFound);
    }
}
