//! The storage capability set and its error taxonomy.
//!
//! [`Repository`] is implemented by the in-memory store in this crate and
//! by the `PostgreSQL` store in `calendar-db`. The service picks one at
//! startup and shares it as `Arc<dyn Repository>`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::context::Context;
use crate::event::Event;
use crate::window::TimeWindow;

/// Errors surfaced by every [`Repository`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The event's interval overlaps another event of the same user.
    #[error("date/time already busy by another event")]
    DateBusy,

    /// No event with the given ID exists.
    #[error("event not found")]
    NotFound,

    /// An event with the given ID already exists.
    #[error("event already exists")]
    AlreadyExists,

    /// The operation's context was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The operation's context deadline passed.
    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    /// The backend failed (I/O, connectivity, encoding).
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    /// Wrap an arbitrary backend failure.
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Backend(err.into())
    }
}

/// Storage operations over the live set of events.
///
/// Writes enforce the per-user overlap invariant atomically. Reads return
/// owned events ordered by start time, ties broken by ID.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Insert a new event.
    ///
    /// Fails with [`StorageError::AlreadyExists`] for a duplicate ID and
    /// [`StorageError::DateBusy`] when the interval is taken.
    async fn create_event(&self, ctx: &Context, event: Event) -> Result<(), StorageError>;

    /// Replace the event with the same ID.
    ///
    /// Fails with [`StorageError::NotFound`] when absent and
    /// [`StorageError::DateBusy`] when the new interval collides with any
    /// other event of the same user.
    async fn update_event(&self, ctx: &Context, event: Event) -> Result<(), StorageError>;

    /// Remove the event with the given ID.
    ///
    /// Fails with [`StorageError::NotFound`] when nothing was removed.
    async fn delete_event(&self, ctx: &Context, id: &str) -> Result<(), StorageError>;

    /// Events of `user_id` starting inside `window`.
    async fn list_window(
        &self,
        ctx: &Context,
        user_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<Event>, StorageError>;

    /// Events of `user_id` starting on the day of `date`.
    async fn list_day(
        &self,
        ctx: &Context,
        user_id: &str,
        date: DateTime<Utc>,
    ) -> Result<Vec<Event>, StorageError> {
        self.list_window(ctx, user_id, TimeWindow::day(date)).await
    }

    /// Events of `user_id` starting in the seven days from `week_start`.
    async fn list_week(
        &self,
        ctx: &Context,
        user_id: &str,
        week_start: DateTime<Utc>,
    ) -> Result<Vec<Event>, StorageError> {
        self.list_window(ctx, user_id, TimeWindow::week(week_start))
            .await
    }

    /// Events of `user_id` starting in the calendar month of `month_start`.
    async fn list_month(
        &self,
        ctx: &Context,
        user_id: &str,
        month_start: DateTime<Utc>,
    ) -> Result<Vec<Event>, StorageError> {
        self.list_window(ctx, user_id, TimeWindow::month(month_start))
            .await
    }
}

/// Sort events by start time, then ID.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| {
        a.start_time
            .cmp(&b.start_time)
            .then_with(|| a.id.cmp(&b.id))
    });
}
