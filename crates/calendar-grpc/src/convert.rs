//! Conversions between protobuf messages and core types.
//!
//! Inbound conversions validate and fail with `InvalidArgument`; nothing
//! malformed reaches the facade.

use calendar_core::Event;
use chrono::{DateTime, Utc};
use prost_types::Timestamp;
use tonic::Status;

use crate::pb;

/// Convert a protobuf timestamp into a UTC instant.
pub fn timestamp_to_utc(timestamp: Timestamp) -> Result<DateTime<Utc>, Status> {
    let nanos = u32::try_from(timestamp.nanos)
        .map_err(|e| Status::invalid_argument(format!("invalid timestamp nanos: {e}")))?;
    DateTime::from_timestamp(timestamp.seconds, nanos)
        .ok_or_else(|| Status::invalid_argument("timestamp out of range"))
}

/// Convert a UTC instant into a protobuf timestamp.
pub fn utc_to_timestamp(instant: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: instant.timestamp(),
        nanos: i32::try_from(instant.timestamp_subsec_nanos()).unwrap_or(i32::MAX),
    }
}

/// A required timestamp field.
pub fn required_timestamp(value: Option<Timestamp>, field: &str) -> Result<DateTime<Utc>, Status> {
    value
        .ok_or_else(|| Status::invalid_argument(format!("{field} is required")))
        .and_then(timestamp_to_utc)
}

/// An optional duration field; absent means zero.
///
/// Bounded to `i64` nanoseconds, roughly 292 years, which is what every
/// backend can store.
fn duration_from_proto(
    value: Option<prost_types::Duration>,
    field: &str,
) -> Result<std::time::Duration, Status> {
    let Some(duration) = value else {
        return Ok(std::time::Duration::ZERO);
    };
    let duration = std::time::Duration::try_from(duration)
        .map_err(|e| Status::invalid_argument(format!("invalid {field}: {e}")))?;
    if i64::try_from(duration.as_nanos()).is_err() {
        return Err(Status::invalid_argument(format!(
            "{field} exceeds i64 nanoseconds"
        )));
    }
    Ok(duration)
}

/// Validate a wire event and convert it.
pub fn event_from_proto(event: pb::Event) -> Result<Event, Status> {
    if event.id.is_empty() {
        return Err(Status::invalid_argument("event id is required"));
    }
    if event.user_id.is_empty() {
        return Err(Status::invalid_argument("event user_id is required"));
    }

    let start_time = required_timestamp(event.start_time, "start_time")?;
    let duration = duration_from_proto(event.duration, "duration")?;
    let notify_before = duration_from_proto(event.notify_before, "notify_before")?;

    let event = Event {
        id: event.id,
        title: event.title,
        start_time,
        duration,
        description: Some(event.description).filter(|d| !d.is_empty()),
        user_id: event.user_id,
        notify_before,
    };
    if event.epoch_nanos_span().is_none() {
        return Err(Status::invalid_argument(
            "start_time plus duration is out of range",
        ));
    }
    Ok(event)
}

/// Convert a core event for the wire.
pub fn event_to_proto(event: Event) -> pb::Event {
    pb::Event {
        id: event.id,
        title: event.title,
        start_time: Some(utc_to_timestamp(event.start_time)),
        duration: prost_types::Duration::try_from(event.duration).ok(),
        description: event.description.unwrap_or_default(),
        user_id: event.user_id,
        notify_before: prost_types::Duration::try_from(event.notify_before).ok(),
    }
}
