//! Axum router construction for the JSON API.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::handlers;
use crate::middleware::log_requests;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- liveness greeting
/// - `POST /events` -- create
/// - `PUT /events/{id}` -- replace
/// - `DELETE /events/{id}` -- delete
/// - `GET /events/day` -- list one day
/// - `GET /events/week` -- list seven days
/// - `GET /events/month` -- list one calendar month
///
/// Any other method on a known path is answered with 405. Every request
/// is logged once by [`log_requests`].
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::hello))
        .route("/events", post(handlers::create_event))
        .route("/events/day", get(handlers::list_day))
        .route("/events/week", get(handlers::list_week))
        .route("/events/month", get(handlers::list_month))
        .route(
            "/events/{id}",
            put(handlers::update_event).delete(handlers::delete_event),
        )
        .layer(middleware::from_fn(log_requests))
        .with_state(Arc::new(state))
}
