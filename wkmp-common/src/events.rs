//! Event types for the WKMP explore subsystem
//!
//! Provides the ExploreEvent enum and the EventBus used to tell the read side
//! (UI projections) that pool or sync state changed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Explore event types
///
/// Events are broadcast via EventBus and can be serialized for transmission
/// to a UI layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ExploreEvent {
    /// A sync run acquired the run guard and is about to contact services
    SyncStarted {
        run_id: Uuid,
        seed_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A sync call returned without doing any work
    SyncSkipped {
        reason: SyncSkipReason,
        timestamp: DateTime<Utc>,
    },

    /// A sync run finished and meta was updated
    SyncCompleted {
        run_id: Uuid,
        consumed_count: usize,
        pool_size: usize,
        last_sync_error: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// A new similar-artist entry was merged into the pool
    PoolEntryAdded {
        artist_id: String,
        artist_name: String,
        album_count: usize,
        pool_size: usize,
        timestamp: DateTime<Utc>,
    },

    /// The "new data" badge was acknowledged by the UI
    NewDataCleared { timestamp: DateTime<Utc> },

    /// Entries and meta were dropped (retry or session invalidation)
    StoreCleared { timestamp: DateTime<Utc> },
}

/// Why a sync call was a no-op
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncSkipReason {
    /// Another run holds the guard
    AlreadyRunning,
    /// No authenticated session
    NotAuthenticated,
    /// Pool has already been filled once
    AlreadyFilled,
}

/// Broadcast bus for explore events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ExploreEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ExploreEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ExploreEvent,
    ) -> Result<usize, broadcast::error::SendError<ExploreEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ExploreEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
