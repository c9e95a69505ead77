//! Domain-event handlers for the event lifecycle.
//!
//! [`LifecycleHandlers`] holds direct references to every store it needs
//! and reacts to the closed set of [`DomainEvent`]s with a single `match`.
//! Handlers tolerate unknown event ids (late or duplicate delivery) by
//! doing nothing, and report follow-up events back to the bus rather than
//! publishing re-entrantly.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::bus::EventHandler;
use crate::config::Config;
use crate::conflicts::find_conflicts;
use crate::domain::{
    Ambiguity, DomainEvent, Event, EventStatus, ParseResponse, ProposedEvent, TimelineEntry,
    TimelineEntryType,
};
use crate::error::Result;
use crate::reminders::build_schedule;
use crate::storage::{
    EventStore, ProposalStore, ReminderPreferenceStore, ReminderScheduleStore, TimelineStore,
};

/// The lifecycle handler registry.
pub struct LifecycleHandlers {
    config: Config,
    events: Arc<dyn EventStore>,
    timeline: Arc<dyn TimelineStore>,
    reminder_prefs: Arc<dyn ReminderPreferenceStore>,
    reminder_schedule: Arc<dyn ReminderScheduleStore>,
    proposals: Arc<dyn ProposalStore>,
}

#[async_trait]
impl EventHandler for LifecycleHandlers {
    async fn handle(&self, event: &DomainEvent) -> Result<Vec<DomainEvent>> {
        match event {
            DomainEvent::EventCreated {
                event_id,
                reminder_offsets_minutes,
            } => {
                self.on_event_created(event_id, reminder_offsets_minutes.as_deref())
                    .await
            }
            DomainEvent::ConflictDetected {
                event_id,
                conflicting_event_ids,
            } => self.on_conflict_detected(event_id, conflicting_event_ids).await,
            DomainEvent::EventShared { event_id, targets } => {
                self.on_event_shared(event_id, targets).await
            }
            DomainEvent::EventConfirmed { event_id } => {
                self.on_event_confirmed(event_id).await
            }
            DomainEvent::ReminderSent {
                event_id,
                schedule_item_id,
                sent_at,
            } => {
                self.on_reminder_sent(event_id, schedule_item_id, *sent_at)
                    .await
            }
        }
    }
}

impl LifecycleHandlers {
    /// Create the registry over its collaborators.
    pub fn new(
        config: Config,
        events: Arc<dyn EventStore>,
        timeline: Arc<dyn TimelineStore>,
        reminder_prefs: Arc<dyn ReminderPreferenceStore>,
        reminder_schedule: Arc<dyn ReminderScheduleStore>,
        proposals: Arc<dyn ProposalStore>,
    ) -> Self {
        Self {
            config,
            events,
            timeline,
            reminder_prefs,
            reminder_schedule,
            proposals,
        }
    }

    async fn on_event_created(
        &self,
        event_id: &str,
        explicit_offsets: Option<&[i64]>,
    ) -> Result<Vec<DomainEvent>> {
        let Some(mut stored) = self.events.get(event_id).await? else {
            debug!(event_id, "event.created for unknown event, ignoring");
            return Ok(Vec::new());
        };

        self.timeline
            .add(TimelineEntry::new(event_id, TimelineEntryType::Created))
            .await?;

        // Schedule reminders.
        let offsets: Vec<i64> = match explicit_offsets {
            Some(offsets) => offsets.to_vec(),
            None => self.config.reminders.default_offsets_minutes.clone(),
        };
        let pairs = build_schedule(
            event_id,
            stored.start_time,
            &offsets,
            self.config.reminders.default_channel,
            None,
        )?;
        let mut schedule_item_ids = Vec::with_capacity(pairs.len());
        for (pref, item) in pairs {
            schedule_item_ids.push(item.id.clone());
            self.reminder_prefs.add(pref).await?;
            self.reminder_schedule.add(item).await?;
        }

        stored.reminders_scheduled = true;
        self.events.update(stored.clone()).await?;

        self.timeline
            .add(TimelineEntry::with_payload(
                event_id,
                TimelineEntryType::ReminderScheduled,
                json!({ "offsets": offsets, "schedule_item_ids": schedule_item_ids }),
            ))
            .await?;
        info!(event_id, ?offsets, "scheduled reminders");

        // Check conflicts, unless this event was already flagged. The guard
        // is what stops the re-publish loop when a conflicted event is
        // later re-confirmed and event.created fires again.
        let already_had_conflict = self
            .timeline
            .list_for_event(event_id)
            .await?
            .iter()
            .any(|e| e.entry_type == TimelineEntryType::ConflictDetected);
        if already_had_conflict {
            return Ok(Vec::new());
        }

        let all = self.events.list_all().await?;
        let others: Vec<Event> = all.into_iter().filter(|e| e.id != event_id).collect();
        let conflicting_event_ids: Vec<String> =
            find_conflicts(stored.start_time, stored.end_time, &others)
                .into_iter()
                .map(|e| e.id.clone())
                .collect();

        if conflicting_event_ids.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![DomainEvent::ConflictDetected {
                event_id: event_id.to_string(),
                conflicting_event_ids,
            }])
        }
    }

    async fn on_conflict_detected(
        &self,
        event_id: &str,
        conflicting_event_ids: &[String],
    ) -> Result<Vec<DomainEvent>> {
        let Some(mut stored) = self.events.get(event_id).await? else {
            debug!(event_id, "conflict.detected for unknown event, ignoring");
            return Ok(Vec::new());
        };

        self.timeline
            .add(TimelineEntry::with_payload(
                event_id,
                TimelineEntryType::ConflictDetected,
                json!({ "conflicting_event_ids": conflicting_event_ids }),
            ))
            .await?;

        stored.status = EventStatus::Conflicted;
        self.events.update(stored.clone()).await?;

        // Conflicting events may have been deleted; fall back to the bare id.
        let mut descriptions = Vec::with_capacity(conflicting_event_ids.len());
        for cid in conflicting_event_ids {
            match self.events.get(cid).await? {
                Some(conflicting) => {
                    descriptions.push(format!("{} ({})", conflicting.title, cid))
                }
                None => descriptions.push(cid.clone()),
            }
        }
        info!(event_id, conflicts = descriptions.len(), "event conflicted");

        // Re-queue as a pending proposal with a single "time" ambiguity.
        let mut proposed =
            ProposedEvent::new(&stored.title, stored.start_time, stored.end_time)?;
        proposed.location = stored.location.clone();
        proposed.notes = stored.notes.clone();

        let proposal = ParseResponse::new(
            proposed,
            vec![Ambiguity::new(
                "time",
                format!("Conflicts with: {}", descriptions.join(", ")),
                vec!["Keep both".to_string(), "Cancel this event".to_string()],
            )],
        )
        .with_conflicts(descriptions)
        .with_event(event_id);
        self.proposals.add(proposal).await?;

        Ok(Vec::new())
    }

    async fn on_event_shared(
        &self,
        event_id: &str,
        targets: &[String],
    ) -> Result<Vec<DomainEvent>> {
        let Some(mut stored) = self.events.get(event_id).await? else {
            debug!(event_id, "event.shared for unknown event, ignoring");
            return Ok(Vec::new());
        };

        stored.was_shared = true;
        self.events.update(stored).await?;
        self.timeline
            .add(TimelineEntry::with_payload(
                event_id,
                TimelineEntryType::Shared,
                json!({ "targets": targets }),
            ))
            .await?;

        Ok(Vec::new())
    }

    async fn on_event_confirmed(&self, event_id: &str) -> Result<Vec<DomainEvent>> {
        let Some(mut stored) = self.events.get(event_id).await? else {
            debug!(event_id, "event.confirmed for unknown event, ignoring");
            return Ok(Vec::new());
        };

        stored.status = EventStatus::Confirmed;
        self.events.update(stored).await?;
        self.timeline
            .add(TimelineEntry::new(event_id, TimelineEntryType::Confirmed))
            .await?;

        Ok(Vec::new())
    }

    async fn on_reminder_sent(
        &self,
        event_id: &str,
        schedule_item_id: &str,
        sent_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<DomainEvent>> {
        let Some(mut stored) = self.events.get(event_id).await? else {
            debug!(event_id, "reminder.sent for unknown event, ignoring");
            return Ok(Vec::new());
        };

        self.reminder_schedule
            .mark_sent(schedule_item_id, sent_at)
            .await?;

        stored.last_reminder_sent_id = Some(schedule_item_id.to_string());
        stored.reminder_last_sent_at = Some(sent_at);
        stored.status = EventStatus::Reminded;
        self.events.update(stored).await?;

        self.timeline
            .add(TimelineEntry::with_payload(
                event_id,
                TimelineEntryType::ReminderSent,
                json!({ "schedule_item_id": schedule_item_id }),
            ))
            .await?;
        info!(event_id, schedule_item_id, "reminder sent");

        Ok(Vec::new())
    }
}
