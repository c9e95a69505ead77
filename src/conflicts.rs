//! Conflict detection between a candidate time range and existing events.

use chrono::{DateTime, Utc};

use crate::domain::Event;

/// Return the existing events that overlap `[new_start, new_end)`, in the
/// input collection's original order.
///
/// The overlap rule is strict on both sides: an event conflicts iff
/// `new_start < existing.end && existing.start < new_end`. Exact boundary
/// touches (back-to-back events) are not conflicts.
pub fn find_conflicts<'a>(
    new_start: DateTime<Utc>,
    new_end: DateTime<Utc>,
    existing: &'a [Event],
) -> Vec<&'a Event> {
    existing
        .iter()
        .filter(|e| new_start < e.end_time && e.start_time < new_end)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, h, m, 0).unwrap()
    }

    fn event(title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        Event::new(title, start, end).unwrap()
    }

    #[test]
    fn test_no_overlap() {
        let existing = vec![event("Existing", t(8, 0), t(9, 0))];
        let conflicts = find_conflicts(t(10, 0), t(11, 0), &existing);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_partial_overlap() {
        let existing = vec![event("Existing", t(9, 0), t(10, 30))];
        let conflicts = find_conflicts(t(10, 0), t(11, 0), &existing);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].start_time, t(9, 0));
    }

    #[test]
    fn test_containment_overlaps() {
        let existing = vec![event("Existing", t(9, 0), t(12, 0))];
        let conflicts = find_conflicts(t(10, 0), t(11, 0), &existing);
        assert_eq!(conflicts.len(), 1);
    }

    #[test]
    fn test_exact_boundary_touch_is_not_a_conflict() {
        // existing.end == new_start
        let before = vec![event("Before", t(9, 0), t(10, 0))];
        assert!(find_conflicts(t(10, 0), t(11, 0), &before).is_empty());

        // new_end == existing.start
        let after = vec![event("After", t(11, 0), t(12, 0))];
        assert!(find_conflicts(t(10, 0), t(11, 0), &after).is_empty());
    }

    #[test]
    fn test_identical_interval_conflicts() {
        let existing = vec![event("Twin", t(10, 0), t(11, 0))];
        assert_eq!(find_conflicts(t(10, 0), t(11, 0), &existing).len(), 1);
    }

    #[test]
    fn test_results_preserve_input_order() {
        let existing = vec![
            event("C", t(10, 30), t(11, 30)),
            event("A", t(9, 0), t(10, 30)),
            event("Clear", t(13, 0), t(14, 0)),
            event("B", t(10, 0), t(11, 0)),
        ];
        let conflicts = find_conflicts(t(10, 0), t(11, 0), &existing);
        let titles: Vec<_> = conflicts.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }
}
