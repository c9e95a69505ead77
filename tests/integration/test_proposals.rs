//! Proposal flow tests: submission, ambiguities, confirmation with
//! recurrence expansion, and rejection.

use chrono::{DateTime, Duration, TimeZone, Utc};

use cadence::{Config, EventStatus, LifecycleEngine, ProposalStatus, ProposedEvent};

fn t(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, month, day, hour, 0, 0).unwrap()
}

async fn engine() -> LifecycleEngine {
    LifecycleEngine::in_memory(Config::default()).await
}

#[tokio::test]
async fn test_simple_proposal_confirms_into_event() {
    let engine = engine().await;
    let proposed = ProposedEvent::new("Lunch with Sam", t(3, 4, 12), t(3, 4, 13))
        .unwrap()
        .with_location("Cafe Brio");

    let proposal = engine.submit_proposal(proposed).await.unwrap();
    assert!(proposal.ambiguities.is_empty());
    assert_eq!(engine.pending_proposals().await.unwrap().len(), 1);

    let confirmed = engine
        .confirm_proposal(&proposal.id, proposal.proposed_event.clone())
        .await
        .unwrap();

    assert_eq!(confirmed.status, EventStatus::Confirmed);
    assert_eq!(confirmed.proposed_event_id.as_deref(), Some(proposal.id.as_str()));
    assert_eq!(confirmed.location.as_deref(), Some("Cafe Brio"));
    assert!(confirmed.reminders_scheduled);
    assert!(engine.pending_proposals().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_weekly_recurrence_expands_until_boundary() {
    let engine = engine().await;
    // 2026-02-19 is a Thursday.
    let proposed = ProposedEvent::new("Yoga class", t(2, 19, 10), t(2, 19, 11))
        .unwrap()
        .with_recurrence_description("every Thursday", None)
        .with_end_description("until March 13");

    let proposal = engine.submit_proposal(proposed).await.unwrap();
    assert!(proposal.ambiguities.is_empty());

    let parent = engine
        .confirm_proposal(&proposal.id, proposal.proposed_event.clone())
        .await
        .unwrap();

    assert_eq!(parent.recurrence_rule.as_deref(), Some("FREQ=WEEKLY;BYDAY=TH"));
    assert_eq!(
        parent.recurrence_end,
        Some(Utc.with_ymd_and_hms(2026, 3, 13, 23, 59, 59).unwrap())
    );

    let events = engine.events().await.unwrap();
    assert_eq!(events.len(), 4);

    let children: Vec<_> = events
        .iter()
        .filter(|e| e.parent_event_id.as_deref() == Some(parent.id.as_str()))
        .collect();
    let starts: Vec<_> = children.iter().map(|e| e.start_time).collect();
    assert_eq!(starts, vec![t(2, 26, 10), t(3, 5, 10), t(3, 12, 10)]);
    for child in &children {
        assert_eq!(child.duration(), Duration::hours(1));
        assert_eq!(child.status, EventStatus::Confirmed);
        assert!(child.recurrence_rule.is_none());
        assert!(!child.reminders_scheduled);
    }
    assert!(parent.reminders_scheduled);
}

#[tokio::test]
async fn test_biweekly_without_end_surfaces_ambiguities() {
    let engine = engine().await;
    // 2026-03-05 is a Thursday.
    let proposed = ProposedEvent::new("Book club", t(3, 5, 19), t(3, 5, 20))
        .unwrap()
        .with_recurrence_description("every other Thursday", None);

    let proposal = engine.submit_proposal(proposed).await.unwrap();

    let fields: Vec<_> = proposal.ambiguities.iter().map(|a| a.field.as_str()).collect();
    assert_eq!(fields, vec!["begin_recurrence", "end_recurrence_description"]);
    assert_eq!(
        proposal.ambiguities[0].options,
        vec!["2026-03-05".to_string(), "2026-03-12".to_string()]
    );
    assert!(proposal.ambiguities[1].options.is_empty());
}

#[tokio::test]
async fn test_biweekly_confirm_after_resolution() {
    let engine = engine().await;
    let proposed = ProposedEvent::new("Book club", t(3, 5, 19), t(3, 5, 20))
        .unwrap()
        .with_recurrence_description("every other Thursday", None);
    let proposal = engine.submit_proposal(proposed).await.unwrap();

    let resolved = proposal
        .proposed_event
        .clone()
        .with_recurrence_description("every other Thursday", Some(t(3, 5, 19)))
        .with_end_description("until April 3");
    let parent = engine.confirm_proposal(&proposal.id, resolved).await.unwrap();

    assert_eq!(
        parent.recurrence_rule.as_deref(),
        Some("FREQ=WEEKLY;INTERVAL=2;BYDAY=TH")
    );

    let events = engine.events().await.unwrap();
    let starts: Vec<_> = events
        .iter()
        .filter(|e| e.parent_event_id.is_some())
        .map(|e| e.start_time)
        .collect();
    assert_eq!(starts, vec![t(3, 19, 19), t(4, 2, 19)]);
}

#[tokio::test]
async fn test_reject_simple_proposal_creates_nothing() {
    let engine = engine().await;
    let proposed = ProposedEvent::new("Maybe drinks", t(3, 6, 18), t(3, 6, 19)).unwrap();
    let proposal = engine.submit_proposal(proposed).await.unwrap();

    let rejected = engine.reject_proposal(&proposal.id).await.unwrap();
    assert_eq!(rejected.status, ProposalStatus::Rejected);
    assert!(engine.events().await.unwrap().is_empty());
    assert!(engine.pending_proposals().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_resolving_a_proposal_twice_fails() {
    let engine = engine().await;
    let proposed = ProposedEvent::new("Lunch", t(3, 4, 12), t(3, 4, 13)).unwrap();
    let proposal = engine.submit_proposal(proposed).await.unwrap();

    engine
        .confirm_proposal(&proposal.id, proposal.proposed_event.clone())
        .await
        .unwrap();

    assert!(engine
        .confirm_proposal(&proposal.id, proposal.proposed_event.clone())
        .await
        .is_err());
    assert!(engine.reject_proposal(&proposal.id).await.is_err());
}

#[tokio::test]
async fn test_unknown_proposal_fails() {
    let engine = engine().await;
    let proposed = ProposedEvent::new("Lunch", t(3, 4, 12), t(3, 4, 13)).unwrap();
    assert!(engine.confirm_proposal("missing", proposed).await.is_err());
}
