//! Wire shapes of the JSON API.
//!
//! Field names are camelCase. `duration` and `notifyBefore` are integer
//! nanoseconds; `startTime` is RFC 3339.

use std::time::Duration;

use calendar_core::Event;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Request body for `POST /events` and `PUT /events/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    /// Event ID. Ignored on `PUT`, where the path supplies it.
    #[serde(default)]
    pub id: String,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// Length in nanoseconds.
    pub duration: i64,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Owner.
    #[serde(default)]
    pub user_id: String,
    /// Reminder lead time in nanoseconds.
    #[serde(default)]
    pub notify_before: Option<i64>,
}

impl EventPayload {
    /// Validate the payload and build an [`Event`].
    ///
    /// `path_id`, when given, replaces the body's ID.
    pub fn into_event(self, path_id: Option<String>) -> Result<Event, ApiError> {
        let id = path_id.unwrap_or(self.id);
        if id.is_empty() {
            return Err(ApiError::BadRequest(String::from("id is required")));
        }
        if self.user_id.is_empty() {
            return Err(ApiError::BadRequest(String::from("userId is required")));
        }

        let mut event = Event::new(id, self.user_id, self.start_time, nanos(self.duration, "duration")?)
            .with_title(self.title)
            .with_notify_before(nanos(self.notify_before.unwrap_or(0), "notifyBefore")?);
        event.description = self.description.filter(|d| !d.is_empty());
        if event.epoch_nanos_span().is_none() {
            return Err(ApiError::BadRequest(String::from(
                "startTime plus duration is out of range",
            )));
        }
        Ok(event)
    }
}

fn nanos(value: i64, field: &str) -> Result<Duration, ApiError> {
    u64::try_from(value)
        .map(Duration::from_nanos)
        .map_err(|e| ApiError::BadRequest(format!("{field} must not be negative: {e}")))
}

/// An event as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    /// Event ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// Length in nanoseconds.
    pub duration: u64,
    /// Description, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owner.
    pub user_id: String,
    /// Reminder lead time in nanoseconds.
    pub notify_before: u64,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            start_time: event.start_time,
            duration: saturating_nanos(event.duration),
            description: event.description,
            user_id: event.user_id,
            notify_before: saturating_nanos(event.notify_before),
        }
    }
}

fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Body of the list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    /// Matching events ordered by start time.
    pub events: Vec<EventView>,
}

impl From<Vec<Event>> for ListResponse {
    fn from(events: Vec<Event>) -> Self {
        Self {
            events: events.into_iter().map(EventView::from).collect(),
        }
    }
}

/// Query string of the list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Owner whose events to list.
    pub user_id: Option<String>,
    /// Day to list (`/events/day`).
    pub date: Option<String>,
    /// First day of the week or month (`/events/week`, `/events/month`).
    pub start: Option<String>,
}

impl ListQuery {
    /// The non-empty `userId` parameter.
    pub fn user_id(&self) -> Result<&str, ApiError> {
        match self.user_id.as_deref() {
            Some(user) if !user.is_empty() => Ok(user),
            _ => Err(ApiError::BadRequest(String::from("userId is required"))),
        }
    }
}

/// Parse a required `YYYY-MM-DD` parameter into UTC midnight.
pub fn parse_date(value: Option<&str>, name: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{name} is required")))?;

    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10 && bytes.get(4) == Some(&b'-') && bytes.get(7) == Some(&b'-');
    if !shaped {
        return Err(ApiError::BadRequest(format!("{name} must be YYYY-MM-DD")));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| ApiError::BadRequest(format!("{name} is not a valid date: {raw}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn payload() -> EventPayload {
        serde_json::from_value(serde_json::json!({
            "id": "e1",
            "title": "standup",
            "startTime": "2025-07-03T12:00:00Z",
            "duration": 1_800_000_000_000_i64,
            "userId": "u1",
            "notifyBefore": 60_000_000_000_i64,
        }))
        .unwrap()
    }

    #[test]
    fn payload_becomes_event() {
        let event = payload().into_event(None).unwrap();
        assert_eq!(event.id, "e1");
        assert_eq!(event.duration, Duration::from_secs(1800));
        assert_eq!(event.notify_before, Duration::from_secs(60));
        assert_eq!(event.start_time, Utc.with_ymd_and_hms(2025, 7, 3, 12, 0, 0).unwrap());
        assert!(event.description.is_none());
    }

    #[test]
    fn interval_past_year_2262_is_rejected() {
        let mut late = payload();
        late.start_time = Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(late.into_event(None), Err(ApiError::BadRequest(_))));

        let mut long = payload();
        long.start_time = Utc.with_ymd_and_hms(2262, 4, 11, 0, 0, 0).unwrap();
        long.duration = i64::MAX;
        assert!(matches!(long.into_event(None), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn path_id_wins() {
        let event = payload().into_event(Some(String::from("from-path"))).unwrap();
        assert_eq!(event.id, "from-path");
    }

    #[test]
    fn negative_duration_is_rejected() {
        let mut body = payload();
        body.duration = -1;
        assert!(matches!(body.into_event(None), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn missing_user_is_rejected() {
        let mut body = payload();
        body.user_id.clear();
        assert!(matches!(body.into_event(None), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn view_uses_camel_case_and_nanoseconds() {
        let view = EventView::from(payload().into_event(None).unwrap());
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["startTime"], "2025-07-03T12:00:00Z");
        assert_eq!(json["duration"], 1_800_000_000_000_u64);
        assert_eq!(json["userId"], "u1");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn dates_must_be_strict() {
        let ok = parse_date(Some("2025-07-03"), "date").unwrap();
        assert_eq!(ok, Utc.with_ymd_and_hms(2025, 7, 3, 0, 0, 0).unwrap());

        for bad in ["2025-7-3", "2025/07/03", "2025-02-30", "20250703", "", "2025-07-03T00"] {
            assert!(parse_date(Some(bad), "date").is_err(), "{bad} accepted");
        }
        assert!(parse_date(None, "date").is_err());
    }
}
