//! Core entity types for the event lifecycle engine.
//!
//! Defines events, proposals, reminders, and the append-only timeline,
//! together with the constructor-time validation the orchestration core
//! relies on (`end > start`, positive reminder offsets).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ============================================================================
// Event
// ============================================================================

/// Lifecycle status of a stored event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Parsed but not yet confirmed.
    #[default]
    Draft,
    /// Confirmed by a human (or created directly as confirmed).
    Confirmed,
    /// Overlaps with another event; awaiting resolution.
    Conflicted,
    /// Cancelled during conflict resolution.
    Cancelled,
    /// At least one reminder has fired.
    Reminded,
}

/// A calendar event owned by the event store and mutated only by
/// lifecycle handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier.
    pub id: String,
    /// Event title.
    pub title: String,
    /// Start time.
    pub start_time: DateTime<Utc>,
    /// End time; always strictly after `start_time`.
    pub end_time: DateTime<Utc>,
    /// Location of the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Free-form notes (typically the original raw text).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the event record was created.
    pub created_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Whether the event has been shared.
    #[serde(default)]
    pub was_shared: bool,
    /// Whether reminders have been scheduled for this event.
    #[serde(default)]
    pub reminders_scheduled: bool,
    /// Schedule item id of the most recently sent reminder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reminder_sent_id: Option<String>,
    /// When the most recent reminder was sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_last_sent_at: Option<DateTime<Utc>>,
    /// Parent event id when this is one occurrence of a recurring series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_event_id: Option<String>,
    /// Proposal this event was confirmed from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_event_id: Option<String>,
    /// Canonical recurrence rule text (see [`crate::recurrence`]).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<String>,
    /// End boundary of the recurrence series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_end: Option<DateTime<Utc>>,
}

impl Event {
    /// Create a new draft event, validating that `end > start`.
    pub fn new(
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if end_time <= start_time {
            return Err(ValidationError::EndNotAfterStart {
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            start_time,
            end_time,
            location: None,
            notes: None,
            created_at: Utc::now(),
            status: EventStatus::Draft,
            was_shared: false,
            reminders_scheduled: false,
            last_reminder_sent_id: None,
            reminder_last_sent_at: None,
            parent_event_id: None,
            proposed_event_id: None,
            recurrence_rule: None,
            recurrence_end: None,
        })
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Set the lifecycle status.
    pub fn with_status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }

    /// Link back to the originating proposal.
    pub fn with_proposal(mut self, proposal_id: impl Into<String>) -> Self {
        self.proposed_event_id = Some(proposal_id.into());
        self
    }

    /// Set the recurrence rule text and series end boundary.
    pub fn with_recurrence(
        mut self,
        rule: impl Into<String>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.recurrence_rule = Some(rule.into());
        self.recurrence_end = end;
        self
    }

    /// Duration of the event.
    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}

// ============================================================================
// Proposals
// ============================================================================

/// A not-yet-committed event shape, produced by the external text
/// extraction step or re-derived when an event is re-queued after a
/// conflict. Immutable value type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedEvent {
    /// Proposed title.
    pub title: String,
    /// Proposed start time.
    pub start_time: DateTime<Utc>,
    /// Proposed end time; always strictly after `start_time`.
    pub end_time: DateTime<Utc>,
    /// Proposed location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Human-readable recurrence phrase, e.g. "every other Thursday".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_description: Option<String>,
    /// Resolved anchor of the recurrence series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_recurrence: Option<DateTime<Utc>>,
    /// Human-readable end phrase, e.g. "until end of May".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_recurrence_description: Option<String>,
}

impl ProposedEvent {
    /// Create a new proposal, validating that `end > start`.
    pub fn new(
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if end_time <= start_time {
            return Err(ValidationError::EndNotAfterStart {
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            title: title.into(),
            start_time,
            end_time,
            location: None,
            notes: None,
            recurrence_description: None,
            begin_recurrence: None,
            end_recurrence_description: None,
        })
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Set the recurrence phrase and anchor.
    pub fn with_recurrence_description(
        mut self,
        description: impl Into<String>,
        begin: Option<DateTime<Utc>>,
    ) -> Self {
        self.recurrence_description = Some(description.into());
        self.begin_recurrence = begin;
        self
    }

    /// Set the recurrence end phrase.
    pub fn with_end_description(mut self, description: impl Into<String>) -> Self {
        self.end_recurrence_description = Some(description.into());
        self
    }
}

/// A field on a proposal that needs human input before confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ambiguity {
    /// Name of the ambiguous field.
    pub field: String,
    /// Human-readable reason the value could not be resolved.
    pub reason: String,
    /// Candidate resolutions; may be empty when the answer is open-ended.
    #[serde(default)]
    pub options: Vec<String>,
}

impl Ambiguity {
    /// Create a new ambiguity.
    pub fn new(
        field: impl Into<String>,
        reason: impl Into<String>,
        options: Vec<String>,
    ) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
            options,
        }
    }
}

/// Status of a pending proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Awaiting human confirmation or rejection.
    #[default]
    Pending,
    /// Confirmed; an event was created (or re-confirmed) from it.
    Confirmed,
    /// Rejected; no event was created (or the linked event was cancelled).
    Rejected,
}

/// A pending proposal awaiting human confirmation.
///
/// Created on text parse or when an event is re-queued after a conflict;
/// terminal once confirmed or rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResponse {
    /// Unique identifier.
    pub id: String,
    /// Resolution status.
    pub status: ProposalStatus,
    /// The proposed event shape.
    pub proposed_event: ProposedEvent,
    /// Ambiguities requiring human input.
    #[serde(default)]
    pub ambiguities: Vec<Ambiguity>,
    /// Textual descriptions of conflicting events, when re-queued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<String>>,
    /// Back-reference to an existing event when re-queued after a conflict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl ParseResponse {
    /// Create a new pending proposal.
    pub fn new(proposed_event: ProposedEvent, ambiguities: Vec<Ambiguity>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            status: ProposalStatus::Pending,
            proposed_event,
            ambiguities,
            conflicts: None,
            event_id: None,
        }
    }

    /// Attach conflict descriptions.
    pub fn with_conflicts(mut self, conflicts: Vec<String>) -> Self {
        self.conflicts = Some(conflicts);
        self
    }

    /// Link back to the event this proposal re-queues.
    pub fn with_event(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }
}

// ============================================================================
// Reminders
// ============================================================================

/// Delivery channel for a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderChannel {
    /// An in-app notification.
    #[default]
    Notification,
    /// An email reminder.
    Email,
    /// An SMS reminder.
    Sms,
}

/// A reminder preference: "remind me N minutes before start".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderPreference {
    /// Unique identifier.
    pub id: String,
    /// Owning event.
    pub event_id: String,
    /// Minutes before the event start; always positive.
    pub offset_minutes: i64,
    /// Delivery channel.
    pub channel: ReminderChannel,
    /// Delivery target (address, number); channel-dependent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl ReminderPreference {
    /// Create a new preference, validating that the offset is positive.
    pub fn new(
        event_id: impl Into<String>,
        offset_minutes: i64,
        channel: ReminderChannel,
        target: Option<String>,
    ) -> Result<Self, ValidationError> {
        if offset_minutes <= 0 {
            return Err(ValidationError::NonPositiveOffset(offset_minutes));
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_id: event_id.into(),
            offset_minutes,
            channel,
            target,
        })
    }
}

/// A concrete scheduled reminder, created alongside its preference and
/// marked sent exactly once when it fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderScheduleItem {
    /// Unique identifier.
    pub id: String,
    /// Owning event.
    pub event_id: String,
    /// The preference this item was derived from.
    pub preference_id: String,
    /// Absolute trigger time (`start − offset`).
    pub trigger_at: DateTime<Utc>,
    /// Delivery channel.
    pub channel: ReminderChannel,
    /// Delivery target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Whether this reminder has fired.
    #[serde(default)]
    pub sent: bool,
    /// When it fired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
}

impl ReminderScheduleItem {
    /// Create a new unsent schedule item for a preference.
    pub fn for_preference(pref: &ReminderPreference, trigger_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_id: pref.event_id.clone(),
            preference_id: pref.id.clone(),
            trigger_at,
            channel: pref.channel,
            target: pref.target.clone(),
            sent: false,
            sent_at: None,
        }
    }
}

// ============================================================================
// Timeline
// ============================================================================

/// Type of timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEntryType {
    Created,
    ReminderScheduled,
    ConflictDetected,
    Shared,
    Confirmed,
    ReminderSent,
    Rejected,
}

/// One record in an event's append-only audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Unique identifier.
    pub id: String,
    /// Owning event.
    pub event_id: String,
    /// When the entry was appended.
    pub at: DateTime<Utc>,
    /// Entry type.
    pub entry_type: TimelineEntryType,
    /// Free-form payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl TimelineEntry {
    /// Create an entry with an empty payload.
    pub fn new(event_id: impl Into<String>, entry_type: TimelineEntryType) -> Self {
        Self::with_payload(event_id, entry_type, serde_json::Value::Null)
    }

    /// Create an entry carrying a payload.
    pub fn with_payload(
        event_id: impl Into<String>,
        entry_type: TimelineEntryType,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_id: event_id.into(),
            at: Utc::now(),
            entry_type,
            payload,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
