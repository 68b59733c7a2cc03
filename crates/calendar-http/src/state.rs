//! Shared application state for the JSON API.

use std::time::Duration;

use calendar_core::{Calendar, Context};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    /// The scheduling facade.
    pub calendar: Calendar,
    /// Deadline applied to each request's storage calls.
    pub request_timeout: Duration,
}

impl AppState {
    /// Create state over `calendar` with the given per-request deadline.
    pub const fn new(calendar: Calendar, request_timeout: Duration) -> Self {
        Self {
            calendar,
            request_timeout,
        }
    }

    /// A fresh context expiring `request_timeout` from now.
    pub fn context(&self) -> Context {
        Context::background().with_timeout(self.request_timeout)
    }
}
