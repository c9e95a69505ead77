//! In-memory store backends.
//!
//! Vec-backed and guarded by `tokio::sync::RwLock`, preserving insertion
//! order (which the conflict detector and due-reminder queries rely on).
//! Suitable for tests and single-process deployments; durable backends
//! implement the same traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{
    Event, ParseResponse, ProposalStatus, ReminderPreference, ReminderScheduleItem,
    TimelineEntry,
};
use crate::error::{Result, StorageError};

use super::traits::{
    EventStore, ProposalStore, ReminderPreferenceStore, ReminderScheduleStore, TimelineStore,
};

/// In-memory [`EventStore`].
#[derive(Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<Event>>,
}

impl MemoryEventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn add(&self, event: Event) -> Result<()> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Event>> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn update(&self, event: Event) -> Result<()> {
        let mut events = self.events.write().await;
        match events.iter_mut().find(|e| e.id == event.id) {
            Some(stored) => {
                *stored = event;
                Ok(())
            }
            None => Err(StorageError::NotFound(event.id).into()),
        }
    }

    async fn list_all(&self) -> Result<Vec<Event>> {
        Ok(self.events.read().await.clone())
    }
}

/// In-memory [`TimelineStore`].
#[derive(Default)]
pub struct MemoryTimelineStore {
    entries: RwLock<Vec<TimelineEntry>>,
}

impl MemoryTimelineStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TimelineStore for MemoryTimelineStore {
    async fn add(&self, entry: TimelineEntry) -> Result<()> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn list_for_event(&self, event_id: &str) -> Result<Vec<TimelineEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| e.event_id == event_id)
            .cloned()
            .collect())
    }
}

/// In-memory [`ReminderPreferenceStore`].
#[derive(Default)]
pub struct MemoryReminderPreferenceStore {
    prefs: RwLock<Vec<ReminderPreference>>,
}

impl MemoryReminderPreferenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReminderPreferenceStore for MemoryReminderPreferenceStore {
    async fn add(&self, pref: ReminderPreference) -> Result<()> {
        self.prefs.write().await.push(pref);
        Ok(())
    }

    async fn list_for_event(&self, event_id: &str) -> Result<Vec<ReminderPreference>> {
        Ok(self
            .prefs
            .read()
            .await
            .iter()
            .filter(|p| p.event_id == event_id)
            .cloned()
            .collect())
    }
}

/// In-memory [`ReminderScheduleStore`].
#[derive(Default)]
pub struct MemoryReminderScheduleStore {
    items: RwLock<Vec<ReminderScheduleItem>>,
}

impl MemoryReminderScheduleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReminderScheduleStore for MemoryReminderScheduleStore {
    async fn add(&self, item: ReminderScheduleItem) -> Result<()> {
        self.items.write().await.push(item);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ReminderScheduleItem>> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    async fn list_for_event(&self, event_id: &str) -> Result<Vec<ReminderScheduleItem>> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .filter(|i| i.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<ReminderScheduleItem>> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .filter(|i| !i.sent && i.trigger_at <= now)
            .cloned()
            .collect())
    }

    async fn mark_sent(&self, id: &str, sent_at: DateTime<Utc>) -> Result<()> {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.sent = true;
                item.sent_at = Some(sent_at);
                Ok(())
            }
            None => Err(StorageError::NotFound(id.to_string()).into()),
        }
    }
}

/// In-memory [`ProposalStore`].
#[derive(Default)]
pub struct MemoryProposalStore {
    proposals: RwLock<Vec<ParseResponse>>,
}

impl MemoryProposalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProposalStore for MemoryProposalStore {
    async fn add(&self, proposal: ParseResponse) -> Result<()> {
        self.proposals.write().await.push(proposal);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ParseResponse>> {
        Ok(self
            .proposals
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn list_pending(&self) -> Result<Vec<ParseResponse>> {
        Ok(self
            .proposals
            .read()
            .await
            .iter()
            .filter(|p| p.status == ProposalStatus::Pending)
            .cloned()
            .collect())
    }

    async fn update_status(&self, id: &str, status: ProposalStatus) -> Result<()> {
        let mut proposals = self.proposals.write().await;
        match proposals.iter_mut().find(|p| p.id == id) {
            Some(proposal) => {
                proposal.status = status;
                Ok(())
            }
            None => Err(StorageError::NotFound(id.to_string()).into()),
        }
    }
}
