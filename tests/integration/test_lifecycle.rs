//! End-to-end lifecycle tests: creation, conflicts, sharing, reminders.

use chrono::{DateTime, Duration, TimeZone, Utc};

use cadence::{Config, Event, EventStatus, LifecycleEngine, TimelineEntryType};

fn t(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, minute, 0).unwrap()
}

async fn engine() -> LifecycleEngine {
    LifecycleEngine::in_memory(Config::default()).await
}

fn event(title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
    Event::new(title, start, end)
        .unwrap()
        .with_status(EventStatus::Confirmed)
}

#[tokio::test]
async fn test_create_event_schedules_default_reminders() {
    let engine = engine().await;
    let stored = engine
        .create_event(event("Team sync", t(2, 10, 0), t(2, 11, 0)), None)
        .await
        .unwrap();

    assert!(stored.reminders_scheduled);
    // Announcing a clean event must not disturb its status.
    assert_eq!(stored.status, EventStatus::Confirmed);

    let reminders = engine.reminders(&stored.id).await.unwrap();
    let triggers: Vec<_> = reminders.iter().map(|r| r.trigger_at).collect();
    assert_eq!(
        triggers,
        vec![
            t(2, 10, 0) - Duration::minutes(720),
            t(2, 10, 0) - Duration::minutes(30),
        ]
    );

    let kinds: Vec<_> = engine
        .timeline(&stored.id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.entry_type)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TimelineEntryType::Created,
            TimelineEntryType::ReminderScheduled,
        ]
    );
}

#[tokio::test]
async fn test_create_event_with_explicit_offsets() {
    let engine = engine().await;
    let stored = engine
        .create_event(event("Demo", t(2, 15, 0), t(2, 16, 0)), Some(vec![10]))
        .await
        .unwrap();

    let reminders = engine.reminders(&stored.id).await.unwrap();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].trigger_at, t(2, 15, 0) - Duration::minutes(10));
}

#[tokio::test]
async fn test_overlapping_event_is_flagged_and_requeued() {
    let engine = engine().await;
    let first = engine
        .create_event(event("Standup", t(2, 10, 0), t(2, 11, 0)), None)
        .await
        .unwrap();
    let second = engine
        .create_event(event("1:1", t(2, 10, 30), t(2, 11, 30)), None)
        .await
        .unwrap();

    assert_eq!(second.status, EventStatus::Conflicted);
    assert_eq!(first.status, EventStatus::Confirmed);

    let conflict_entries = engine
        .timeline(&second.id)
        .await
        .unwrap()
        .iter()
        .filter(|e| e.entry_type == TimelineEntryType::ConflictDetected)
        .count();
    assert_eq!(conflict_entries, 1);
    assert!(engine
        .timeline(&first.id)
        .await
        .unwrap()
        .iter()
        .all(|e| e.entry_type != TimelineEntryType::ConflictDetected));

    let pending = engine.pending_proposals().await.unwrap();
    assert_eq!(pending.len(), 1);
    let proposal = &pending[0];
    assert_eq!(proposal.event_id.as_deref(), Some(second.id.as_str()));
    assert_eq!(proposal.ambiguities.len(), 1);
    assert_eq!(proposal.ambiguities[0].field, "time");
    assert_eq!(
        proposal.ambiguities[0].options,
        vec!["Keep both".to_string(), "Cancel this event".to_string()]
    );
    assert_eq!(
        proposal.conflicts,
        Some(vec![format!("Standup ({})", first.id)])
    );
}

#[tokio::test]
async fn test_boundary_touch_is_not_a_conflict() {
    let engine = engine().await;
    engine
        .create_event(event("Morning", t(2, 10, 0), t(2, 11, 0)), None)
        .await
        .unwrap();
    let second = engine
        .create_event(event("Afternoon", t(2, 11, 0), t(2, 12, 0)), None)
        .await
        .unwrap();

    assert_eq!(second.status, EventStatus::Confirmed);
    assert!(engine.pending_proposals().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_keep_both_reconfirms_without_reflagging() {
    let engine = engine().await;
    engine
        .create_event(event("Standup", t(2, 10, 0), t(2, 11, 0)), None)
        .await
        .unwrap();
    let second = engine
        .create_event(event("1:1", t(2, 10, 30), t(2, 11, 30)), None)
        .await
        .unwrap();

    let proposal = engine.pending_proposals().await.unwrap().remove(0);
    let kept = engine
        .confirm_proposal(&proposal.id, proposal.proposed_event.clone())
        .await
        .unwrap();

    assert_eq!(kept.id, second.id);
    assert_eq!(kept.status, EventStatus::Confirmed);
    assert!(engine.pending_proposals().await.unwrap().is_empty());

    // Re-announcing the kept event must not flag it again or re-queue it.
    let timeline = engine.timeline(&second.id).await.unwrap();
    let conflict_entries = timeline
        .iter()
        .filter(|e| e.entry_type == TimelineEntryType::ConflictDetected)
        .count();
    assert_eq!(conflict_entries, 1);
    assert!(timeline
        .iter()
        .any(|e| e.entry_type == TimelineEntryType::Confirmed));
}

#[tokio::test]
async fn test_cancel_this_event_rejects_and_cancels() {
    let engine = engine().await;
    engine
        .create_event(event("Standup", t(2, 10, 0), t(2, 11, 0)), None)
        .await
        .unwrap();
    let second = engine
        .create_event(event("1:1", t(2, 10, 30), t(2, 11, 30)), None)
        .await
        .unwrap();

    let proposal = engine.pending_proposals().await.unwrap().remove(0);
    let rejected = engine.reject_proposal(&proposal.id).await.unwrap();
    assert_eq!(rejected.status, cadence::ProposalStatus::Rejected);

    let cancelled = engine.event(&second.id).await.unwrap().unwrap();
    assert_eq!(cancelled.status, EventStatus::Cancelled);
    assert!(engine
        .timeline(&second.id)
        .await
        .unwrap()
        .iter()
        .any(|e| e.entry_type == TimelineEntryType::Rejected));
    assert!(engine.pending_proposals().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_share_event_marks_and_logs() {
    let engine = engine().await;
    let stored = engine
        .create_event(event("Picnic", t(7, 12, 0), t(7, 14, 0)), None)
        .await
        .unwrap();

    engine
        .share_event(&stored.id, vec!["alice".to_string(), "bob".to_string()])
        .await
        .unwrap();

    let shared = engine.event(&stored.id).await.unwrap().unwrap();
    assert!(shared.was_shared);

    let timeline = engine.timeline(&stored.id).await.unwrap();
    let entry = timeline
        .iter()
        .find(|e| e.entry_type == TimelineEntryType::Shared)
        .unwrap();
    assert_eq!(entry.payload["targets"], serde_json::json!(["alice", "bob"]));
}

#[tokio::test]
async fn test_confirm_event_directly() {
    let engine = engine().await;
    let draft = Event::new("Review", t(3, 9, 0), t(3, 10, 0)).unwrap();
    let stored = engine.create_event(draft, None).await.unwrap();
    assert_eq!(stored.status, EventStatus::Draft);

    engine.confirm_event(&stored.id).await.unwrap();

    let confirmed = engine.event(&stored.id).await.unwrap().unwrap();
    assert_eq!(confirmed.status, EventStatus::Confirmed);
    assert!(engine
        .timeline(&stored.id)
        .await
        .unwrap()
        .iter()
        .any(|e| e.entry_type == TimelineEntryType::Confirmed));
}

#[tokio::test]
async fn test_tick_fires_due_reminders_once() {
    let engine = engine().await;
    let stored = engine
        .create_event(event("Dentist", t(4, 9, 0), t(4, 10, 0)), Some(vec![30]))
        .await
        .unwrap();

    let now = t(4, 8, 30);
    let fired = engine.tick(now).await.unwrap();
    assert_eq!(fired.len(), 1);
    assert!(fired[0].sent);
    assert_eq!(fired[0].sent_at, Some(now));

    let reminded = engine.event(&stored.id).await.unwrap().unwrap();
    assert_eq!(reminded.status, EventStatus::Reminded);
    assert_eq!(reminded.last_reminder_sent_id.as_deref(), Some(fired[0].id.as_str()));
    assert_eq!(reminded.reminder_last_sent_at, Some(now));
    assert!(engine
        .timeline(&stored.id)
        .await
        .unwrap()
        .iter()
        .any(|e| e.entry_type == TimelineEntryType::ReminderSent));

    // A second tick at the same instant finds nothing due.
    assert!(engine.tick(now).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_event_operations_fail() {
    let engine = engine().await;
    assert!(engine
        .share_event("missing", vec!["alice".to_string()])
        .await
        .is_err());
    assert!(engine.confirm_event("missing").await.is_err());
}
