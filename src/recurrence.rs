//! Recurrence compilation and expansion.
//!
//! Turns human-readable recurrence phrases ("every other Thursday") into a
//! canonical [`RepeatRule`], derives the series end boundary from phrases
//! like "until end of May", and expands a recurring parent event into its
//! concrete child occurrences.
//!
//! The canonical rule text `FREQ=<F>[;INTERVAL=<n>][;BYDAY=<d,...>]` is the
//! one persisted artifact with a bit-exact contract: it must round-trip
//! through [`RepeatRule::parse`] and [`std::fmt::Display`] without loss.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use regex::Regex;

use crate::domain::{Ambiguity, Event, ProposedEvent};

// ============================================================================
// Rule type
// ============================================================================

/// Base frequency of a repeat rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "DAILY" => Some(Frequency::Daily),
            "WEEKLY" => Some(Frequency::Weekly),
            "MONTHLY" => Some(Frequency::Monthly),
            _ => None,
        }
    }
}

/// Canonical repeat rule: frequency, interval, and (for weekly rules) the
/// days of week the series falls on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatRule {
    /// Base frequency.
    pub frequency: Frequency,
    /// Every N units; 1 means every unit.
    pub interval: u32,
    /// Days of week for weekly rules, in Monday-first order.
    pub by_day: Vec<Weekday>,
}

const DAY_CODES: [(Weekday, &str); 7] = [
    (Weekday::Mon, "MO"),
    (Weekday::Tue, "TU"),
    (Weekday::Wed, "WE"),
    (Weekday::Thu, "TH"),
    (Weekday::Fri, "FR"),
    (Weekday::Sat, "SA"),
    (Weekday::Sun, "SU"),
];

fn day_code(day: Weekday) -> &'static str {
    DAY_CODES
        .iter()
        .find(|(d, _)| *d == day)
        .map(|(_, code)| *code)
        .unwrap_or("MO")
}

fn parse_day_code(code: &str) -> Option<Weekday> {
    DAY_CODES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(d, _)| *d)
}

impl std::fmt::Display for RepeatRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FREQ={}", self.frequency.as_str())?;
        if self.interval > 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        if self.frequency == Frequency::Weekly && !self.by_day.is_empty() {
            let days: Vec<_> = self.by_day.iter().map(|d| day_code(*d)).collect();
            write!(f, ";BYDAY={}", days.join(","))?;
        }
        Ok(())
    }
}

impl RepeatRule {
    /// Parse canonical rule text. Returns `None` for malformed input.
    pub fn parse(text: &str) -> Option<Self> {
        let mut frequency = None;
        let mut interval = 1u32;
        let mut by_day = Vec::new();

        for part in text.split(';') {
            let (key, value) = part.split_once('=')?;
            match key {
                "FREQ" => frequency = Frequency::parse(value),
                "INTERVAL" => interval = value.parse().ok()?,
                "BYDAY" => {
                    for code in value.split(',') {
                        by_day.push(parse_day_code(code)?);
                    }
                }
                _ => return None,
            }
        }

        Some(Self {
            frequency: frequency?,
            interval,
            by_day,
        })
    }
}

// ============================================================================
// Compilation from human phrases
// ============================================================================

const WEEKDAY_NAMES: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

/// Compile a proposal's recurrence phrase into a [`RepeatRule`].
///
/// Returns `None` when the proposal carries no recurrence phrase. Interval
/// is 2 for "every other" / "biweekly" phrases, otherwise taken from an
/// "every N day/week/month" pattern, defaulting to 1. Explicit "daily" or
/// "monthly" wording overrides an earlier weekly match. Literal weekday
/// names become the day-of-week set; "weekday" expands to Monday through
/// Friday.
pub fn compile_rule(proposed: &ProposedEvent) -> Option<RepeatRule> {
    let desc = proposed.recurrence_description.as_ref()?;
    let desc = desc.to_lowercase();
    let desc = desc.trim();

    let mut frequency = Frequency::Weekly;
    let mut interval = 1u32;

    if ["every other", "biweekly", "bi-weekly"]
        .iter()
        .any(|phrase| desc.contains(phrase))
    {
        interval = 2;
    } else {
        let every_n = Regex::new(r"every\s+(\d+)\s+(day|week|month)").ok()?;
        if let Some(cap) = every_n.captures(desc) {
            interval = cap[1].parse().unwrap_or(1);
            match &cap[2] {
                "day" => frequency = Frequency::Daily,
                "month" => frequency = Frequency::Monthly,
                _ => {}
            }
        }
    }

    if desc.contains("daily") || desc.contains("every day") {
        frequency = Frequency::Daily;
    } else if desc.contains("monthly") || desc.contains("every month") {
        frequency = Frequency::Monthly;
    }

    let mut by_day: Vec<Weekday> = WEEKDAY_NAMES
        .iter()
        .filter(|(name, _)| desc.contains(name))
        .map(|(_, day)| *day)
        .collect();

    if desc.contains("weekday") {
        by_day = vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ];
    }

    Some(RepeatRule {
        frequency,
        interval,
        by_day,
    })
}

// ============================================================================
// End-phrase derivation
// ============================================================================

const MONTH_NAMES: [(&str, u32); 12] = [
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

/// Derive an absolute series end from a proposal's end phrase.
///
/// "until end of <month>" resolves to the last calendar day of that month
/// at 23:59:59, taking the year from the proposal's start and rolling into
/// the next year when the month has already passed. Explicit date phrases
/// ("until April 30 2026", ISO dates) resolve to that date at 23:59:59.
/// Anything else returns `None`; the engine never guesses a boundary.
pub fn derive_rule_end(proposed: &ProposedEvent) -> Option<DateTime<Utc>> {
    let phrase = proposed.end_recurrence_description.as_ref()?;
    let phrase = phrase.to_lowercase();
    let phrase = phrase.trim();
    let start = proposed.start_time;

    // "end of <month>"
    for (name, month) in &MONTH_NAMES {
        if phrase.contains(&format!("end of {name}")) {
            let year = if *month < start.month() {
                start.year() + 1
            } else {
                start.year()
            };
            let last_day = days_in_month(year, *month);
            return end_of_day(year, *month, last_day);
        }
    }

    // ISO date: 2026-04-30
    if let Ok(iso) = Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b") {
        if let Some(cap) = iso.captures(phrase) {
            let (year, month, day) = (
                cap[1].parse().ok()?,
                cap[2].parse().ok()?,
                cap[3].parse().ok()?,
            );
            return end_of_day(year, month, day);
        }
    }

    // "<month> 30 2026", "<month> 30th, 2026"
    for (name, month) in &MONTH_NAMES {
        let pattern = format!(r"\b{name}\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s*(\d{{4}})?\b");
        let re = Regex::new(&pattern).ok()?;
        if let Some(cap) = re.captures(phrase) {
            let day: u32 = cap[1].parse().ok()?;
            let year: i32 = cap
                .get(2)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or_else(|| start.year());
            return end_of_day(year, *month, day);
        }
    }

    None
}

fn end_of_day(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 23, 59, 59).single()
}

/// Number of days in a month.
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

// ============================================================================
// Expansion into child events
// ============================================================================

/// Expand a parent event's rule into child occurrences.
///
/// Returns an empty vector when the parent has no rule or no end boundary,
/// or when the rule text is malformed. Occurrences run from the parent's
/// start through the boundary (inclusive); the timestamp equal to the
/// parent's own start is excluded, since the parent already represents that
/// occurrence. Children copy title, location, and notes, keep the parent's
/// duration, carry a `parent_event_id`, and have no rule of their own.
pub fn expand_rule(parent: &Event) -> Vec<Event> {
    let Some(rule_text) = parent.recurrence_rule.as_deref() else {
        return Vec::new();
    };
    let Some(until) = parent.recurrence_end else {
        return Vec::new();
    };
    let Some(rule) = RepeatRule::parse(rule_text) else {
        return Vec::new();
    };

    let duration = parent.duration();

    occurrences(&rule, parent.start_time, until)
        .into_iter()
        .filter(|&occ| occ != parent.start_time)
        .map(|occ| Event {
            id: uuid::Uuid::new_v4().to_string(),
            title: parent.title.clone(),
            start_time: occ,
            end_time: occ + duration,
            location: parent.location.clone(),
            notes: parent.notes.clone(),
            created_at: Utc::now(),
            status: parent.status,
            was_shared: false,
            reminders_scheduled: false,
            last_reminder_sent_id: None,
            reminder_last_sent_at: None,
            parent_event_id: Some(parent.id.clone()),
            proposed_event_id: None,
            recurrence_rule: None,
            recurrence_end: None,
        })
        .collect()
}

/// All occurrence timestamps of `rule` in `[start, until]`, including the
/// start itself when it matches.
pub fn occurrences(
    rule: &RepeatRule,
    start: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    let interval = rule.interval.max(1) as i64;
    match rule.frequency {
        Frequency::Daily => stepped(start, until, Duration::days(interval)),
        Frequency::Weekly if rule.by_day.is_empty() => {
            stepped(start, until, Duration::weeks(interval))
        }
        Frequency::Weekly => weekly_by_day(rule, start, until, interval),
        Frequency::Monthly => monthly(start, until, interval),
    }
}

fn stepped(start: DateTime<Utc>, until: DateTime<Utc>, step: Duration) -> Vec<DateTime<Utc>> {
    let mut out = Vec::new();
    let mut current = start;
    while current <= until {
        out.push(current);
        current += step;
    }
    out
}

/// Weekly rules with explicit days: occurrences fall on each listed weekday
/// of weeks whose offset from the start's week (Monday-anchored) is a
/// multiple of the interval, at the parent's time of day.
fn weekly_by_day(
    rule: &RepeatRule,
    start: DateTime<Utc>,
    until: DateTime<Utc>,
    interval: i64,
) -> Vec<DateTime<Utc>> {
    let anchor_week = monday_of(start.date_naive());
    let time = start.time();

    let mut out = Vec::new();
    let mut date = start.date_naive();
    while date <= until.date_naive() {
        if rule.by_day.contains(&date.weekday()) {
            let week_offset = (monday_of(date) - anchor_week).num_days() / 7;
            if week_offset % interval == 0 {
                let occ = Utc.from_utc_datetime(&date.and_time(time));
                if occ >= start && occ <= until {
                    out.push(occ);
                }
            }
        }
        date += Duration::days(1);
    }
    out
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn monthly(start: DateTime<Utc>, until: DateTime<Utc>, interval: i64) -> Vec<DateTime<Utc>> {
    let mut out = Vec::new();
    let day = start.day();
    let mut year = start.year();
    let mut month = start.month() as i32;

    loop {
        let clamped_day = day.min(days_in_month(year, month as u32));
        let occ = Utc
            .with_ymd_and_hms(
                year,
                month as u32,
                clamped_day,
                start.hour(),
                start.minute(),
                start.second(),
            )
            .single();
        match occ {
            Some(occ) if occ <= until => {
                if occ >= start {
                    out.push(occ);
                }
            }
            _ => break,
        }

        month += interval as i32;
        while month > 12 {
            month -= 12;
            year += 1;
        }
    }
    out
}

// ============================================================================
// Ambiguity detection
// ============================================================================

/// Detect the ambiguities a recurrence phrase leaves open.
///
/// An interval phrase without a clear anchor week ("every other Thursday")
/// yields a `begin_recurrence` ambiguity offering the literal first
/// occurrence and the next candidate anchor. A recurrence phrase whose end
/// phrase cannot be resolved yields an `end_recurrence_description`
/// ambiguity with no preset options.
pub fn detect_ambiguities(proposed: &ProposedEvent) -> Vec<Ambiguity> {
    let Some(rule) = compile_rule(proposed) else {
        return Vec::new();
    };

    let mut ambiguities = Vec::new();

    if rule.interval > 1 && proposed.begin_recurrence.is_none() {
        // The candidate anchors are adjacent base units: with "every other
        // Thursday", one base unit ahead starts a distinct series, while a
        // full interval ahead lands inside the first one.
        let first = proposed.start_time;
        let second = first + base_step(&rule);
        ambiguities.push(Ambiguity::new(
            "begin_recurrence",
            "'every other' is ambiguous: does the series start this week or next?",
            vec![
                first.format("%Y-%m-%d").to_string(),
                second.format("%Y-%m-%d").to_string(),
            ],
        ));
    }

    if derive_rule_end(proposed).is_none() {
        ambiguities.push(Ambiguity::new(
            "end_recurrence_description",
            "No end date specified for recurring event",
            Vec::new(),
        ));
    }

    ambiguities
}

fn base_step(rule: &RepeatRule) -> Duration {
    match rule.frequency {
        Frequency::Daily => Duration::days(1),
        Frequency::Weekly => Duration::weeks(1),
        // Close enough for presenting a candidate date; monthly phrases
        // are anchored by day-of-month, not elapsed days.
        Frequency::Monthly => Duration::days(30),
    }
}

// ============================================================================
// Tests
// ============================================================================
