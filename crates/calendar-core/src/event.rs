//! The [`Event`] entity and its interval arithmetic.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// A scheduled event owned by a single user.
///
/// Events are plain values: repositories hand out owned copies and
/// accept owned replacements, so no caller ever holds a reference into
/// a store's internal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Caller-assigned unique identifier.
    pub id: String,
    /// Short human-readable title.
    pub title: String,
    /// Start of the occupied interval.
    pub start_time: DateTime<Utc>,
    /// Length of the occupied interval.
    pub duration: Duration,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Owner of the event; the scope for conflict checks and queries.
    pub user_id: String,
    /// How far ahead of `start_time` the owner wants a reminder.
    pub notify_before: Duration,
}

impl Event {
    /// Create an event with an empty title and no description.
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        start_time: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            start_time,
            duration,
            description: None,
            user_id: user_id.into(),
            notify_before: Duration::ZERO,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the reminder lead time.
    #[must_use]
    pub const fn with_notify_before(mut self, notify_before: Duration) -> Self {
        self.notify_before = notify_before;
        self
    }

    /// Exclusive end of the occupied interval.
    ///
    /// Saturates at the largest representable timestamp rather than
    /// overflowing for absurd durations.
    pub fn end_time(&self) -> DateTime<Utc> {
        TimeDelta::from_std(self.duration)
            .ok()
            .and_then(|delta| self.start_time.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// The interval as `(start, end)` nanoseconds since the Unix epoch.
    ///
    /// `None` when either bound falls outside `i64` nanoseconds, roughly
    /// the years 1677 to 2262. Adapters reject such events up front so
    /// every backend can store the exact interval.
    pub fn epoch_nanos_span(&self) -> Option<(i64, i64)> {
        let start = self.start_time.timestamp_nanos_opt()?;
        let length = i64::try_from(self.duration.as_nanos()).ok()?;
        Some((start, start.checked_add(length)?))
    }

    /// Whether the intervals `[start, end)` of `self` and `other` intersect.
    ///
    /// Zero-length intervals are empty and never overlap anything. The
    /// owner is not compared here; callers scope the check per user.
    pub fn overlaps(&self, other: &Self) -> bool {
        if self.duration.is_zero() || other.duration.is_zero() {
            return false;
        }
        self.start_time < other.end_time() && other.start_time < self.end_time()
    }
}
