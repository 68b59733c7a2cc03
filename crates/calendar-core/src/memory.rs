//! In-memory [`Repository`] backend.
//!
//! All events live in one map behind one [`RwLock`]. Writers hold the
//! write guard across the overlap scan and the mutation, so two
//! concurrent writers can never both see "no conflict" for intervals
//! that collide. Readers share the read guard and copy matches out.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::context::Context;
use crate::event::Event;
use crate::repository::{sort_events, Repository, StorageError};
use crate::window::TimeWindow;

/// Lock-guarded in-memory event store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<HashMap<String, Event>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Whether the store holds no events.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

/// Whether `candidate` collides with any other event of the same user.
fn conflicts(events: &HashMap<String, Event>, candidate: &Event) -> bool {
    events.values().any(|existing| {
        existing.user_id == candidate.user_id
            && existing.id != candidate.id
            && existing.overlaps(candidate)
    })
}

#[async_trait]
impl Repository for MemoryStore {
    async fn create_event(&self, ctx: &Context, event: Event) -> Result<(), StorageError> {
        ctx.run(async {
            let mut events = self.events.write().await;
            if events.contains_key(&event.id) {
                return Err(StorageError::AlreadyExists);
            }
            if conflicts(&events, &event) {
                return Err(StorageError::DateBusy);
            }
            tracing::debug!(event_id = %event.id, user_id = %event.user_id, "memory: event created");
            events.insert(event.id.clone(), event);
            Ok(())
        })
        .await
    }

    async fn update_event(&self, ctx: &Context, event: Event) -> Result<(), StorageError> {
        ctx.run(async {
            let mut events = self.events.write().await;
            if !events.contains_key(&event.id) {
                return Err(StorageError::NotFound);
            }
            if conflicts(&events, &event) {
                return Err(StorageError::DateBusy);
            }
            tracing::debug!(event_id = %event.id, user_id = %event.user_id, "memory: event updated");
            events.insert(event.id.clone(), event);
            Ok(())
        })
        .await
    }

    async fn delete_event(&self, ctx: &Context, id: &str) -> Result<(), StorageError> {
        ctx.run(async {
            let mut events = self.events.write().await;
            if events.remove(id).is_none() {
                return Err(StorageError::NotFound);
            }
            tracing::debug!(event_id = %id, "memory: event deleted");
            Ok(())
        })
        .await
    }

    async fn list_window(
        &self,
        ctx: &Context,
        user_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<Event>, StorageError> {
        ctx.run(async {
            let events = self.events.read().await;
            let mut found: Vec<Event> = events
                .values()
                .filter(|event| event.user_id == user_id && window.contains(event.start_time))
                .cloned()
                .collect();
            drop(events);
            sort_events(&mut found);
            Ok(found)
        })
        .await
    }
}
