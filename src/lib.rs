//! Cadence: an event lifecycle orchestration engine for calendar events.
//!
//! Cadence takes confirmed or proposed calendar events and drives them
//! through their lifecycle: announcement on an in-process domain-event
//! bus, reminder scheduling, overlap conflict detection with a human
//! resolution loop, recurrence compilation and expansion, and an
//! append-only per-event audit timeline.
//!
//! The pieces:
//!
//! - [`bus`]: synchronous publish/subscribe dispatch of [`domain::DomainEvent`]s
//! - [`lifecycle`]: the handler registry and the [`lifecycle::LifecycleEngine`]
//!   entry points
//! - [`conflicts`]: interval-overlap detection over stored events
//! - [`recurrence`]: phrase-to-rule compilation, series end derivation,
//!   occurrence expansion, and ambiguity detection
//! - [`reminders`]: offset-based reminder schedule construction
//! - [`storage`]: store traits plus in-memory backends
//!
//! ```no_run
//! use cadence::{Config, Event, LifecycleEngine};
//! use chrono::{TimeZone, Utc};
//!
//! # async fn demo() -> cadence::Result<()> {
//! let engine = LifecycleEngine::in_memory(Config::default()).await;
//!
//! let event = Event::new(
//!     "Team sync",
//!     Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap(),
//! )?;
//! let stored = engine.create_event(event, None).await?;
//! assert!(stored.reminders_scheduled);
//! # Ok(())
//! # }
//! ```

pub mod bus;
pub mod config;
pub mod conflicts;
pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod recurrence;
pub mod reminders;
pub mod storage;

pub use bus::{EventBus, EventHandler};
pub use config::Config;
pub use domain::{
    Ambiguity, DomainEvent, DomainEventKind, Event, EventStatus, ParseResponse,
    ProposalStatus, ProposedEvent, ReminderChannel, ReminderPreference, ReminderScheduleItem,
    TimelineEntry, TimelineEntryType,
};
pub use error::{CadenceError, Result};
pub use lifecycle::{LifecycleEngine, LifecycleHandlers};
