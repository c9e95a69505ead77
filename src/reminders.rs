//! Reminder scheduling: derive trigger times from minute offsets.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{ReminderChannel, ReminderPreference, ReminderScheduleItem};
use crate::error::Result;

/// Default offsets when an event carries none: a long lead (12 hours) and a
/// short lead (30 minutes).
pub const DEFAULT_OFFSETS_MINUTES: [i64; 2] = [720, 30];

/// Build one preference/schedule-item pair per offset, with
/// `trigger_at = start − offset` minutes. Offsets must be positive; a
/// non-positive offset is a validation error.
pub fn build_schedule(
    event_id: &str,
    start_time: DateTime<Utc>,
    offsets_minutes: &[i64],
    channel: ReminderChannel,
    target: Option<String>,
) -> Result<Vec<(ReminderPreference, ReminderScheduleItem)>> {
    let mut pairs = Vec::with_capacity(offsets_minutes.len());
    for &offset in offsets_minutes {
        let pref = ReminderPreference::new(event_id, offset, channel, target.clone())?;
        let trigger_at = start_time - Duration::minutes(offset);
        let item = ReminderScheduleItem::for_preference(&pref, trigger_at);
        pairs.push((pref, item));
    }
    Ok(pairs)
}
