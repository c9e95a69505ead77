//! Storage traits and in-memory backends.

pub mod memory;
pub mod traits;

pub use memory::{
    MemoryEventStore, MemoryProposalStore, MemoryReminderPreferenceStore,
    MemoryReminderScheduleStore, MemoryTimelineStore,
};
pub use traits::{
    EventStore, ProposalStore, ReminderPreferenceStore, ReminderScheduleStore, TimelineStore,
};
