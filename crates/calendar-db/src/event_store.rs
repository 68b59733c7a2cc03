//! Transactional event store on the `events` table.
//!
//! Each write is one transaction: take the per-user advisory lock, check
//! existence and overlap, then write and commit. Returning early drops
//! the transaction, which rolls it back. Durations are stored as whole
//! nanoseconds in `BIGINT` columns.
//!
//! `TIMESTAMPTZ` only keeps microseconds, so each row also carries its
//! exact interval as epoch nanoseconds (`start_ns`, `end_ns`). Overlap
//! checks compare those; `start_time` serves the window queries, whose
//! bounds are whole days.

use std::time::Duration;

use async_trait::async_trait;
use calendar_core::{Context, Event, Repository, StorageError, TimeWindow};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::{PgConnection, PgPool};

use crate::error::DbError;
use crate::postgres::PostgresPool;

/// [`Repository`] backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    /// Create a store over an existing pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a store sharing the connections of `pool`.
    pub fn from_pool(pool: &PostgresPool) -> Self {
        Self::new(pool.pool().clone())
    }
}

/// A row from the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Event ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// Start instant, truncated to microseconds by the column type.
    pub start_time: DateTime<Utc>,
    /// Exact start, nanoseconds since the Unix epoch.
    pub start_ns: i64,
    /// Exact exclusive end, nanoseconds since the Unix epoch.
    pub end_ns: i64,
    /// Length in nanoseconds.
    pub duration: i64,
    /// Description, `NULL` when absent.
    pub description: Option<String>,
    /// Owner.
    pub user_id: String,
    /// Reminder lead time in nanoseconds.
    pub notify_before: i64,
}

impl EventRow {
    /// Encode an event for storage.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::OutOfRange`] if the interval or the reminder
    /// lead time does not fit `i64` nanoseconds.
    pub fn from_event(event: &Event) -> Result<Self, DbError> {
        let (start_ns, end_ns) = event.epoch_nanos_span().ok_or_else(|| {
            DbError::OutOfRange(format!(
                "interval of event {} ({} + {:?})",
                event.id, event.start_time, event.duration
            ))
        })?;
        Ok(Self {
            id: event.id.clone(),
            title: event.title.clone(),
            start_time: event.start_time,
            start_ns,
            end_ns,
            duration: duration_to_nanos(event.duration)?,
            description: event.description.clone().filter(|d| !d.is_empty()),
            user_id: event.user_id.clone(),
            notify_before: duration_to_nanos(event.notify_before)?,
        })
    }
}

impl TryFrom<EventRow> for Event {
    type Error = DbError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            start_time: Utc.timestamp_nanos(row.start_ns),
            duration: nanos_to_duration(row.duration)?,
            description: row.description,
            user_id: row.user_id,
            notify_before: nanos_to_duration(row.notify_before)?,
        })
    }
}

fn duration_to_nanos(duration: Duration) -> Result<i64, DbError> {
    i64::try_from(duration.as_nanos())
        .map_err(|e| DbError::OutOfRange(format!("duration {duration:?}: {e}")))
}

fn nanos_to_duration(nanos: i64) -> Result<Duration, DbError> {
    u64::try_from(nanos)
        .map(Duration::from_nanos)
        .map_err(|e| DbError::OutOfRange(format!("stored duration {nanos}ns: {e}")))
}

/// Serialize writers for `user_id` until the transaction ends.
async fn lock_user(conn: &mut PgConnection, user_id: &str) -> Result<(), DbError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

async fn id_exists(conn: &mut PgConnection, id: &str) -> Result<bool, DbError> {
    let found = sqlx::query_scalar::<_, i32>("SELECT 1 FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

/// Like [`id_exists`], but also row-locks the match.
async fn lock_existing(conn: &mut PgConnection, id: &str) -> Result<bool, DbError> {
    let found = sqlx::query_scalar::<_, i32>("SELECT 1 FROM events WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

/// Whether another non-empty event of the same user intersects `row`.
async fn has_overlap(conn: &mut PgConnection, row: &EventRow) -> Result<bool, DbError> {
    if row.duration == 0 {
        return Ok(false);
    }
    let busy = sqlx::query_scalar::<_, bool>(
        r"SELECT EXISTS (
              SELECT 1 FROM events
              WHERE user_id = $1
                AND id <> $2
                AND duration > 0
                AND start_ns < $4
                AND end_ns > $3
          )",
    )
    .bind(&row.user_id)
    .bind(&row.id)
    .bind(row.start_ns)
    .bind(row.end_ns)
    .fetch_one(conn)
    .await?;
    Ok(busy)
}

impl PgEventStore {
    async fn create_in_tx(&self, row: &EventRow) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        lock_user(&mut tx, &row.user_id).await?;

        if id_exists(&mut tx, &row.id).await? {
            return Err(StorageError::AlreadyExists);
        }
        if has_overlap(&mut tx, row).await? {
            return Err(StorageError::DateBusy);
        }

        let inserted = sqlx::query(
            r"INSERT INTO events
                  (id, title, start_time, start_ns, end_ns, duration, description, user_id, notify_before)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
              ON CONFLICT (id) DO NOTHING",
        )
        .bind(&row.id)
        .bind(&row.title)
        .bind(row.start_time)
        .bind(row.start_ns)
        .bind(row.end_ns)
        .bind(row.duration)
        .bind(&row.description)
        .bind(&row.user_id)
        .bind(row.notify_before)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        // Another user's writer may have claimed the ID between the check
        // and the insert; the advisory lock only covers this user.
        if inserted.rows_affected() == 0 {
            return Err(StorageError::AlreadyExists);
        }

        tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }

    async fn update_in_tx(&self, row: &EventRow) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        lock_user(&mut tx, &row.user_id).await?;

        if !lock_existing(&mut tx, &row.id).await? {
            return Err(StorageError::NotFound);
        }
        if has_overlap(&mut tx, row).await? {
            return Err(StorageError::DateBusy);
        }

        sqlx::query(
            r"UPDATE events
              SET title = $2, start_time = $3, start_ns = $4, end_ns = $5, duration = $6,
                  description = $7, user_id = $8, notify_before = $9
              WHERE id = $1",
        )
        .bind(&row.id)
        .bind(&row.title)
        .bind(row.start_time)
        .bind(row.start_ns)
        .bind(row.end_ns)
        .bind(row.duration)
        .bind(&row.description)
        .bind(&row.user_id)
        .bind(row.notify_before)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }
}

#[async_trait]
impl Repository for PgEventStore {
    async fn create_event(&self, ctx: &Context, event: Event) -> Result<(), StorageError> {
        let row = EventRow::from_event(&event)?;
        ctx.run(self.create_in_tx(&row)).await?;
        tracing::debug!(event_id = %event.id, user_id = %event.user_id, "postgres: event created");
        Ok(())
    }

    async fn update_event(&self, ctx: &Context, event: Event) -> Result<(), StorageError> {
        let row = EventRow::from_event(&event)?;
        ctx.run(self.update_in_tx(&row)).await?;
        tracing::debug!(event_id = %event.id, user_id = %event.user_id, "postgres: event updated");
        Ok(())
    }

    async fn delete_event(&self, ctx: &Context, id: &str) -> Result<(), StorageError> {
        let result = ctx
            .run(async {
                sqlx::query("DELETE FROM events WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| StorageError::from(DbError::from(e)))
            })
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        tracing::debug!(event_id = %id, "postgres: event deleted");
        Ok(())
    }

    async fn list_window(
        &self,
        ctx: &Context,
        user_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<Event>, StorageError> {
        let rows = ctx
            .run(async {
                sqlx::query_as::<_, EventRow>(
                    r"SELECT id, title, start_time, start_ns, end_ns, duration, description,
                             user_id, notify_before
                      FROM events
                      WHERE user_id = $1 AND start_time >= $2 AND start_time < $3
                      ORDER BY start_ns, id",
                )
                .bind(user_id)
                .bind(window.start)
                .bind(window.end)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StorageError::from(DbError::from(e)))
            })
            .await?;

        let events = rows
            .into_iter()
            .map(Event::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }
}
