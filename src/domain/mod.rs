//! Domain layer: entities and domain events.
//!
//! - **Entities** ([`types`]): events, proposals, reminders, and the
//!   append-only timeline, with constructor-time validation.
//! - **Domain events** ([`events`]): the closed set of transient messages
//!   that drive the lifecycle handlers.

pub mod events;
pub mod types;

pub use events::{DomainEvent, DomainEventKind};
pub use types::{
    Ambiguity, Event, EventStatus, ParseResponse, ProposalStatus, ProposedEvent,
    ReminderChannel, ReminderPreference, ReminderScheduleItem, TimelineEntry,
    TimelineEntryType,
};
