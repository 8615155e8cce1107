//! Integration tests for the notification ledger.

use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;

use redress::ledger::{NotificationLedger, Tab, UNDO_WINDOW};
use redress::model::Notification;
use redress::storage::LedgerStore;

fn test_ledger() -> NotificationLedger {
    NotificationLedger::new(LedgerStore::in_memory().unwrap()).unwrap()
}

fn notification(id: &str, hours_ago: i64) -> Notification {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "date": Utc::now() - ChronoDuration::hours(hours_ago),
        "type": "status",
        "message": format!("status update for {id}"),
    }))
    .unwrap()
}

/// Let spawned timer tasks run after advancing the paused clock.
async fn settle() {
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
}

// ---------------------------------------------------------------------------
// Watermark
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mark_seen_up_to_is_monotonic() {
    let mut ledger = test_ledger();

    let t1 = Utc::now();
    let t2 = t1 - ChronoDuration::hours(1);

    ledger.mark_seen_up_to(t1);
    assert_eq!(ledger.last_seen_at(), t1);

    // Earlier timestamp never moves the watermark backward.
    ledger.mark_seen_up_to(t2);
    assert_eq!(ledger.last_seen_at(), t1);
}

#[tokio::test]
async fn unread_tab_respects_watermark() {
    let mut ledger = test_ledger();
    let feed = vec![notification("N1", 1), notification("N2", 3)];

    // Watermark between the two notifications.
    ledger.mark_seen_up_to(Utc::now() - ChronoDuration::hours(2));

    let unread = ledger.visible(&feed, Tab::Unread);
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].id, "N1");

    ledger.mark_all_seen();
    assert!(ledger.visible(&feed, Tab::Unread).is_empty());
    assert_eq!(ledger.visible(&feed, Tab::All).len(), 2);
}

// ---------------------------------------------------------------------------
// Dismiss + undo
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn undo_within_window_restores_visibility() {
    let mut ledger = test_ledger();
    let feed = vec![notification("N1", 1)];

    ledger.dismiss("N1").unwrap();
    assert!(ledger.visible(&feed, Tab::All).is_empty());

    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;

    let restored = ledger.undo().unwrap();
    assert_eq!(restored, vec!["N1"]);
    assert_eq!(ledger.visible(&feed, Tab::All).len(), 1);

    // A second undo is a no-op.
    assert!(ledger.undo().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn undo_after_window_lapses_is_a_noop() {
    let mut ledger = test_ledger();
    let feed = vec![notification("N1", 1)];

    ledger.dismiss("N1").unwrap();

    tokio::time::advance(UNDO_WINDOW + Duration::from_secs(1)).await;
    settle().await;

    assert!(ledger.pending_undo().is_empty());
    assert!(ledger.undo().unwrap().is_empty());
    assert!(ledger.visible(&feed, Tab::All).is_empty());
}

#[tokio::test(start_paused = true)]
async fn dismiss_all_undo_restores_exactly_the_newly_dismissed() {
    let mut ledger = test_ledger();
    let feed = vec![
        notification("a", 1),
        notification("b", 2),
        notification("c", 3),
    ];

    // "a" was dismissed earlier; its window lapsed.
    ledger.dismiss("a").unwrap();
    tokio::time::advance(UNDO_WINDOW + Duration::from_secs(1)).await;
    settle().await;

    ledger.dismiss_all(["a", "b", "c"]).unwrap();
    assert!(ledger.visible(&feed, Tab::All).is_empty());
    assert_eq!(ledger.pending_undo(), vec!["b", "c"]);

    let restored = ledger.undo().unwrap();
    assert_eq!(restored, vec!["b", "c"]);

    // "a" stays dismissed; only the newly-added ids came back.
    let visible: Vec<String> = ledger
        .visible(&feed, Tab::All)
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(visible, vec!["b", "c"]);
}

#[tokio::test(start_paused = true)]
async fn new_dismiss_replaces_the_previous_undo_buffer() {
    let mut ledger = test_ledger();

    ledger.dismiss("N1").unwrap();
    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;

    // Replaces, does not merge: only the most recent delete is undoable.
    ledger.dismiss("N2").unwrap();
    assert_eq!(ledger.pending_undo(), vec!["N2"]);

    let restored = ledger.undo().unwrap();
    assert_eq!(restored, vec!["N2"]);
    assert_eq!(ledger.dismissed(), vec!["N1"]);
}

#[tokio::test(start_paused = true)]
async fn stale_timer_does_not_clear_a_newer_buffer() {
    let mut ledger = test_ledger();

    ledger.dismiss("N1").unwrap();
    tokio::time::advance(Duration::from_secs(9)).await;
    settle().await;

    // Re-armed window: the first timer must not clear this buffer.
    ledger.dismiss("N2").unwrap();
    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;

    assert_eq!(ledger.pending_undo(), vec!["N2"]);

    tokio::time::advance(Duration::from_secs(6)).await;
    settle().await;
    assert!(ledger.pending_undo().is_empty());
}

#[tokio::test(start_paused = true)]
async fn pending_undo_is_subset_of_dismissed() {
    let mut ledger = test_ledger();

    ledger.dismiss_all(["x", "y"]).unwrap();
    let dismissed = ledger.dismissed();
    for id in ledger.pending_undo() {
        assert!(dismissed.contains(&id));
    }
}

// ---------------------------------------------------------------------------
// Durability
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dismissed_set_survives_restart_but_session_state_resets() {
    let path = std::env::temp_dir().join(format!("redress-test-{}.db", uuid::Uuid::new_v4()));

    {
        let mut ledger = NotificationLedger::new(LedgerStore::open(&path).unwrap()).unwrap();
        ledger.mark_all_seen();
        ledger.dismiss("N1").unwrap();
    }

    let ledger = NotificationLedger::new(LedgerStore::open(&path).unwrap()).unwrap();
    assert_eq!(ledger.dismissed(), vec!["N1"]);
    // Watermark and undo buffer are session-scoped.
    assert_eq!(ledger.last_seen_at(), chrono::DateTime::UNIX_EPOCH);
    assert!(ledger.pending_undo().is_empty());

    let _ = std::fs::remove_file(&path);
}
