//! Domain events emitted during the event lifecycle.
//!
//! These are transient messages carried by the [`crate::bus::EventBus`];
//! they are never persisted. The set is closed, so dispatch is a `match`
//! over the enum rather than runtime type lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A domain event flowing through the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A new event was persisted.
    EventCreated {
        event_id: String,
        /// Explicit reminder offsets; falls back to the defaults when absent.
        reminder_offsets_minutes: Option<Vec<i64>>,
    },
    /// A newly created event overlaps with existing ones.
    ConflictDetected {
        event_id: String,
        conflicting_event_ids: Vec<String>,
    },
    /// An event was shared with other people.
    EventShared {
        event_id: String,
        targets: Vec<String>,
    },
    /// An event was (re-)confirmed by a human.
    EventConfirmed { event_id: String },
    /// A reminder's trigger time was reached.
    ReminderSent {
        event_id: String,
        schedule_item_id: String,
        sent_at: DateTime<Utc>,
    },
}

/// Subscription key: the kind of a [`DomainEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainEventKind {
    EventCreated,
    ConflictDetected,
    EventShared,
    EventConfirmed,
    ReminderSent,
}

impl DomainEventKind {
    /// All kinds, in a stable order. Useful for wiring a handler that
    /// covers the whole lifecycle.
    pub const ALL: [DomainEventKind; 5] = [
        DomainEventKind::EventCreated,
        DomainEventKind::ConflictDetected,
        DomainEventKind::EventShared,
        DomainEventKind::EventConfirmed,
        DomainEventKind::ReminderSent,
    ];

    /// Get the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EventCreated => "event.created",
            Self::ConflictDetected => "conflict.detected",
            Self::EventShared => "event.shared",
            Self::EventConfirmed => "event.confirmed",
            Self::ReminderSent => "reminder.sent",
        }
    }
}

impl std::fmt::Display for DomainEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl DomainEvent {
    /// The kind tag of this event.
    pub fn kind(&self) -> DomainEventKind {
        match self {
            DomainEvent::EventCreated { .. } => DomainEventKind::EventCreated,
            DomainEvent::ConflictDetected { .. } => DomainEventKind::ConflictDetected,
            DomainEvent::EventShared { .. } => DomainEventKind::EventShared,
            DomainEvent::EventConfirmed { .. } => DomainEventKind::EventConfirmed,
            DomainEvent::ReminderSent { .. } => DomainEventKind::ReminderSent,
        }
    }

    /// The id of the event this domain event concerns.
    pub fn event_id(&self) -> &str {
        match self {
            DomainEvent::EventCreated { event_id, .. }
            | DomainEvent::ConflictDetected { event_id, .. }
            | DomainEvent::EventShared { event_id, .. }
            | DomainEvent::EventConfirmed { event_id }
            | DomainEvent::ReminderSent { event_id, .. } => event_id,
        }
    }
}
