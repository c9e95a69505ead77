//! Store trait definitions.
//!
//! The engine only needs simple keyed/filtered collection operations from
//! its persistence collaborators; any backend that satisfies these traits
//! can sit underneath the lifecycle handlers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Event, ParseResponse, ProposalStatus, ReminderPreference, ReminderScheduleItem,
    TimelineEntry,
};
use crate::error::Result;

/// Store for [`Event`]s, keyed by id.
///
/// `list_all` returns events in insertion order; the conflict detector
/// reports overlaps in that order.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Add a new event.
    async fn add(&self, event: Event) -> Result<()>;

    /// Get an event by id.
    async fn get(&self, id: &str) -> Result<Option<Event>>;

    /// Replace a stored event with an updated copy.
    /// Fails with [`crate::error::StorageError::NotFound`] for unknown ids.
    async fn update(&self, event: Event) -> Result<()>;

    /// List all events in insertion order.
    async fn list_all(&self) -> Result<Vec<Event>>;
}

/// Append-only store for [`TimelineEntry`]s.
#[async_trait]
pub trait TimelineStore: Send + Sync {
    /// Append an entry.
    async fn add(&self, entry: TimelineEntry) -> Result<()>;

    /// List entries for an event, in append order.
    async fn list_for_event(&self, event_id: &str) -> Result<Vec<TimelineEntry>>;
}

/// Store for [`ReminderPreference`]s.
#[async_trait]
pub trait ReminderPreferenceStore: Send + Sync {
    /// Add a preference.
    async fn add(&self, pref: ReminderPreference) -> Result<()>;

    /// List preferences for an event.
    async fn list_for_event(&self, event_id: &str) -> Result<Vec<ReminderPreference>>;
}

/// Store for [`ReminderScheduleItem`]s.
#[async_trait]
pub trait ReminderScheduleStore: Send + Sync {
    /// Add a schedule item.
    async fn add(&self, item: ReminderScheduleItem) -> Result<()>;

    /// Get a schedule item by id.
    async fn get(&self, id: &str) -> Result<Option<ReminderScheduleItem>>;

    /// List schedule items for an event.
    async fn list_for_event(&self, event_id: &str) -> Result<Vec<ReminderScheduleItem>>;

    /// List unsent items whose trigger time is at or before `now`.
    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<ReminderScheduleItem>>;

    /// Mark an item as sent at the given time.
    /// Fails with [`crate::error::StorageError::NotFound`] for unknown ids.
    async fn mark_sent(&self, id: &str, sent_at: DateTime<Utc>) -> Result<()>;
}

/// Store for pending proposals ([`ParseResponse`]s).
#[async_trait]
pub trait ProposalStore: Send + Sync {
    /// Add a proposal.
    async fn add(&self, proposal: ParseResponse) -> Result<()>;

    /// Get a proposal by id.
    async fn get(&self, id: &str) -> Result<Option<ParseResponse>>;

    /// List proposals still awaiting resolution.
    async fn list_pending(&self) -> Result<Vec<ParseResponse>>;

    /// Update a proposal's status.
    /// Fails with [`crate::error::StorageError::NotFound`] for unknown ids.
    async fn update_status(&self, id: &str, status: ProposalStatus) -> Result<()>;
}
