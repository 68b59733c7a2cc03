//! Application facade shared by the HTTP and gRPC adapters.
//!
//! [`Calendar`] carries no business rules of its own. It exists so the
//! adapters depend on one concrete type instead of on whichever backend
//! was configured at startup.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::context::Context;
use crate::event::Event;
use crate::repository::{Repository, StorageError};

/// Entry point into the scheduling core.
///
/// Cheap to clone; all clones share the same repository.
#[derive(Clone)]
pub struct Calendar {
    store: Arc<dyn Repository>,
}

impl Calendar {
    /// Build a facade over the given repository.
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self { store }
    }

    /// Store a fully specified event.
    pub async fn create_full_event(&self, ctx: &Context, event: Event) -> Result<(), StorageError> {
        tracing::debug!(event_id = %event.id, user_id = %event.user_id, "create event");
        self.store.create_event(ctx, event).await
    }

    /// Replace an existing event.
    pub async fn update_event(&self, ctx: &Context, event: Event) -> Result<(), StorageError> {
        tracing::debug!(event_id = %event.id, user_id = %event.user_id, "update event");
        self.store.update_event(ctx, event).await
    }

    /// Delete an event by ID.
    pub async fn delete_event(&self, ctx: &Context, id: &str) -> Result<(), StorageError> {
        tracing::debug!(event_id = %id, "delete event");
        self.store.delete_event(ctx, id).await
    }

    /// Events of a user on one day.
    pub async fn list_day(
        &self,
        ctx: &Context,
        user_id: &str,
        date: DateTime<Utc>,
    ) -> Result<Vec<Event>, StorageError> {
        self.store.list_day(ctx, user_id, date).await
    }

    /// Events of a user in the week starting at `week_start`.
    pub async fn list_week(
        &self,
        ctx: &Context,
        user_id: &str,
        week_start: DateTime<Utc>,
    ) -> Result<Vec<Event>, StorageError> {
        self.store.list_week(ctx, user_id, week_start).await
    }

    /// Events of a user in the month of `month_start`.
    pub async fn list_month(
        &self,
        ctx: &Context,
        user_id: &str,
        month_start: DateTime<Utc>,
    ) -> Result<Vec<Event>, StorageError> {
        self.store.list_month(ctx, user_id, month_start).await
    }
}
