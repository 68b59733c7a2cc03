//! Endpoint handlers for the JSON API.
//!
//! Handlers validate input into [`Event`](calendar_core::Event)s or
//! window anchors, then delegate to the [`Calendar`](calendar_core::Calendar)
//! facade. Nothing malformed reaches storage.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use crate::dto::{EventPayload, EventView, ListQuery, ListResponse, parse_date};
use crate::error::ApiError;
use crate::state::AppState;

/// `GET /` -- plain-text liveness greeting.
pub async fn hello() -> &'static str {
    "Hello, world!"
}

/// `POST /events` -- create an event.
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EventPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<EventView>), ApiError> {
    let Json(payload) = payload?;
    let event = payload.into_event(None)?;
    state
        .calendar
        .create_full_event(&state.context(), event.clone())
        .await?;
    Ok((StatusCode::CREATED, Json(EventView::from(event))))
}

/// `PUT /events/{id}` -- replace an event.
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<EventPayload>, JsonRejection>,
) -> Result<Json<EventView>, ApiError> {
    let Json(payload) = payload?;
    let event = payload.into_event(Some(id))?;
    state
        .calendar
        .update_event(&state.context(), event.clone())
        .await?;
    Ok(Json(EventView::from(event)))
}

/// `DELETE /events/{id}` -- delete an event.
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.calendar.delete_event(&state.context(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /events/day?userId=&date=YYYY-MM-DD`
pub async fn list_day(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError> {
    let Query(query) = query?;
    let user_id = query.user_id()?;
    let date = parse_date(query.date.as_deref(), "date")?;
    let events = state
        .calendar
        .list_day(&state.context(), user_id, date)
        .await?;
    Ok(Json(ListResponse::from(events)))
}

/// `GET /events/week?userId=&start=YYYY-MM-DD`
pub async fn list_week(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError> {
    let Query(query) = query?;
    let user_id = query.user_id()?;
    let start = parse_date(query.start.as_deref(), "start")?;
    let events = state
        .calendar
        .list_week(&state.context(), user_id, start)
        .await?;
    Ok(Json(ListResponse::from(events)))
}

/// `GET /events/month?userId=&start=YYYY-MM-DD`
pub async fn list_month(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError> {
    let Query(query) = query?;
    let user_id = query.user_id()?;
    let start = parse_date(query.start.as_deref(), "start")?;
    let events = state
        .calendar
        .list_month(&state.context(), user_id, start)
        .await?;
    Ok(Json(ListResponse::from(events)))
}
