//! The lifecycle orchestrator.
//!
//! [`LifecycleEngine`] owns the bus and the stores, wires the
//! [`LifecycleHandlers`](super::LifecycleHandlers) registry to every
//! domain-event kind, and exposes the entry points callers use: creating
//! and sharing events, firing due reminders, and the proposal
//! confirmation flow.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::bus::EventBus;
use crate::config::Config;
use crate::domain::{
    DomainEvent, DomainEventKind, Event, EventStatus, ParseResponse, ProposalStatus,
    ProposedEvent, ReminderScheduleItem, TimelineEntry, TimelineEntryType,
};
use crate::error::{ProposalError, Result, StorageError};
use crate::recurrence::{compile_rule, derive_rule_end, detect_ambiguities, expand_rule};
use crate::storage::{
    EventStore, MemoryEventStore, MemoryProposalStore, MemoryReminderPreferenceStore,
    MemoryReminderScheduleStore, MemoryTimelineStore, ProposalStore, ReminderPreferenceStore,
    ReminderScheduleStore, TimelineStore,
};

use super::LifecycleHandlers;

/// The event lifecycle orchestrator.
pub struct LifecycleEngine {
    bus: Arc<EventBus>,
    events: Arc<dyn EventStore>,
    timeline: Arc<dyn TimelineStore>,
    reminder_schedule: Arc<dyn ReminderScheduleStore>,
    proposals: Arc<dyn ProposalStore>,
}

impl LifecycleEngine {
    /// Build an engine over the given stores and subscribe the lifecycle
    /// handlers to every domain-event kind.
    pub async fn new(
        config: Config,
        events: Arc<dyn EventStore>,
        timeline: Arc<dyn TimelineStore>,
        reminder_prefs: Arc<dyn ReminderPreferenceStore>,
        reminder_schedule: Arc<dyn ReminderScheduleStore>,
        proposals: Arc<dyn ProposalStore>,
    ) -> Self {
        let bus = Arc::new(EventBus::new());
        let handlers = Arc::new(LifecycleHandlers::new(
            config,
            Arc::clone(&events),
            Arc::clone(&timeline),
            reminder_prefs,
            Arc::clone(&reminder_schedule),
            Arc::clone(&proposals),
        ));
        let handlers: Arc<dyn crate::bus::EventHandler> = handlers;
        for kind in DomainEventKind::ALL {
            bus.subscribe(kind, Arc::clone(&handlers)).await;
        }

        Self {
            bus,
            events,
            timeline,
            reminder_schedule,
            proposals,
        }
    }

    /// Build an engine backed by fresh in-memory stores.
    pub async fn in_memory(config: Config) -> Self {
        Self::new(
            config,
            Arc::new(MemoryEventStore::new()),
            Arc::new(MemoryTimelineStore::new()),
            Arc::new(MemoryReminderPreferenceStore::new()),
            Arc::new(MemoryReminderScheduleStore::new()),
            Arc::new(MemoryProposalStore::new()),
        )
        .await
    }

    /// The underlying bus, for callers that want to attach extra handlers.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    // ========================================================================
    // Event entry points
    // ========================================================================

    /// Persist an event and announce it. Returns the stored event after
    /// the lifecycle handlers have run (reminders scheduled, and possibly
    /// flagged as conflicted).
    pub async fn create_event(
        &self,
        event: Event,
        reminder_offsets_minutes: Option<Vec<i64>>,
    ) -> Result<Event> {
        let event_id = event.id.clone();
        self.events.add(event).await?;
        self.bus
            .publish(DomainEvent::EventCreated {
                event_id: event_id.clone(),
                reminder_offsets_minutes,
            })
            .await?;

        self.events
            .get(&event_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(event_id).into())
    }

    /// Share an event with the given targets.
    pub async fn share_event(&self, event_id: &str, targets: Vec<String>) -> Result<()> {
        if self.events.get(event_id).await?.is_none() {
            return Err(StorageError::NotFound(event_id.to_string()).into());
        }
        self.bus
            .publish(DomainEvent::EventShared {
                event_id: event_id.to_string(),
                targets,
            })
            .await
    }

    /// Confirm an event directly, without going through a proposal.
    pub async fn confirm_event(&self, event_id: &str) -> Result<()> {
        if self.events.get(event_id).await?.is_none() {
            return Err(StorageError::NotFound(event_id.to_string()).into());
        }
        self.bus
            .publish(DomainEvent::EventConfirmed {
                event_id: event_id.to_string(),
            })
            .await
    }

    /// Fire every reminder due at `now`. Returns the schedule items that
    /// fired, as stored after their handlers ran.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<Vec<ReminderScheduleItem>> {
        let due = self.reminder_schedule.list_due(now).await?;
        let mut fired = Vec::with_capacity(due.len());
        for item in due {
            self.bus
                .publish(DomainEvent::ReminderSent {
                    event_id: item.event_id.clone(),
                    schedule_item_id: item.id.clone(),
                    sent_at: now,
                })
                .await?;
            if let Some(sent) = self.reminder_schedule.get(&item.id).await? {
                fired.push(sent);
            }
        }
        Ok(fired)
    }

    // ========================================================================
    // Proposal flow
    // ========================================================================

    /// Queue a proposed event for human confirmation, detecting any
    /// recurrence ambiguities along the way.
    pub async fn submit_proposal(&self, proposed: ProposedEvent) -> Result<ParseResponse> {
        let ambiguities = detect_ambiguities(&proposed);
        let proposal = ParseResponse::new(proposed, ambiguities);
        self.proposals.add(proposal.clone()).await?;
        info!(proposal_id = %proposal.id, "proposal submitted");
        Ok(proposal)
    }

    /// Confirm a pending proposal.
    ///
    /// For a proposal re-queued after a conflict ("Keep both"), the linked
    /// event is re-confirmed and re-announced. Otherwise a confirmed event
    /// is built from `resolved` (which carries any human-resolved
    /// ambiguity answers), stored along with its expanded recurrence
    /// children, and announced.
    pub async fn confirm_proposal(
        &self,
        proposal_id: &str,
        resolved: ProposedEvent,
    ) -> Result<Event> {
        let proposal = self.pending(proposal_id).await?;

        if let Some(event_id) = proposal.event_id {
            // "Keep both": the event already exists; re-confirm it. The
            // re-announce is safe because the conflict check is skipped
            // for events already flagged.
            self.proposals
                .update_status(proposal_id, ProposalStatus::Confirmed)
                .await?;
            self.bus
                .publish(DomainEvent::EventConfirmed {
                    event_id: event_id.clone(),
                })
                .await?;
            self.bus
                .publish(DomainEvent::EventCreated {
                    event_id: event_id.clone(),
                    reminder_offsets_minutes: None,
                })
                .await?;
            return self
                .events
                .get(&event_id)
                .await?
                .ok_or_else(|| StorageError::NotFound(event_id).into());
        }

        let mut parent = Event::new(&resolved.title, resolved.start_time, resolved.end_time)?
            .with_status(EventStatus::Confirmed)
            .with_proposal(proposal_id);
        parent.location = resolved.location.clone();
        parent.notes = resolved.notes.clone();
        if let Some(rule) = compile_rule(&resolved) {
            parent = parent.with_recurrence(rule.to_string(), derive_rule_end(&resolved));
        }

        let parent_id = parent.id.clone();
        self.events.add(parent.clone()).await?;

        let children = expand_rule(&parent);
        info!(
            proposal_id,
            event_id = %parent_id,
            occurrences = children.len(),
            "proposal confirmed"
        );
        for child in children {
            self.events.add(child).await?;
        }

        self.proposals
            .update_status(proposal_id, ProposalStatus::Confirmed)
            .await?;
        self.bus
            .publish(DomainEvent::EventCreated {
                event_id: parent_id.clone(),
                reminder_offsets_minutes: None,
            })
            .await?;

        self.events
            .get(&parent_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(parent_id).into())
    }

    /// Reject a pending proposal. For a proposal re-queued after a
    /// conflict ("Cancel this event"), the linked event is cancelled.
    pub async fn reject_proposal(&self, proposal_id: &str) -> Result<ParseResponse> {
        let proposal = self.pending(proposal_id).await?;

        self.proposals
            .update_status(proposal_id, ProposalStatus::Rejected)
            .await?;
        info!(proposal_id, "proposal rejected");

        if let Some(event_id) = &proposal.event_id {
            if let Some(mut event) = self.events.get(event_id).await? {
                event.status = EventStatus::Cancelled;
                self.events.update(event).await?;
                self.timeline
                    .add(TimelineEntry::with_payload(
                        event_id,
                        TimelineEntryType::Rejected,
                        serde_json::json!({ "proposal_id": proposal_id }),
                    ))
                    .await?;
            }
        }

        self.proposals
            .get(proposal_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(proposal_id.to_string()).into())
    }

    /// Fetch a proposal and ensure it is still pending.
    async fn pending(&self, proposal_id: &str) -> Result<ParseResponse> {
        let proposal = self
            .proposals
            .get(proposal_id)
            .await?
            .ok_or_else(|| ProposalError::NotFound(proposal_id.to_string()))?;
        match proposal.status {
            ProposalStatus::Pending => Ok(proposal),
            ProposalStatus::Confirmed => {
                Err(ProposalError::AlreadyConfirmed(proposal_id.to_string()).into())
            }
            ProposalStatus::Rejected => {
                Err(ProposalError::AlreadyRejected(proposal_id.to_string()).into())
            }
        }
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    /// All stored events, in insertion order.
    pub async fn events(&self) -> Result<Vec<Event>> {
        self.events.list_all().await
    }

    /// One event by id.
    pub async fn event(&self, event_id: &str) -> Result<Option<Event>> {
        self.events.get(event_id).await
    }

    /// Proposals awaiting resolution.
    pub async fn pending_proposals(&self) -> Result<Vec<ParseResponse>> {
        self.proposals.list_pending().await
    }

    /// The audit timeline for an event, in append order.
    pub async fn timeline(&self, event_id: &str) -> Result<Vec<TimelineEntry>> {
        self.timeline.list_for_event(event_id).await
    }

    /// Scheduled reminders for an event.
    pub async fn reminders(&self, event_id: &str) -> Result<Vec<ReminderScheduleItem>> {
        self.reminder_schedule.list_for_event(event_id).await
    }
}
