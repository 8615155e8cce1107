//! Notification ledger.
//!
//! Tracks what the viewer has seen (a monotonic watermark), what they have
//! dismissed (durable across restarts), and a time-bounded undo buffer for
//! the most recent delete action. The ledger owns its state exclusively;
//! the single undo timer is the only scheduled background operation, and
//! arming a new one always cancels the old one first.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::Result;
use crate::model::Notification;
use crate::storage::LedgerStore;

/// How long a delete action stays undoable.
pub const UNDO_WINDOW: Duration = Duration::from_secs(10);

/// Which notifications `visible` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    All,
    Unread,
}

struct LedgerState {
    /// Unread comparison watermark. Session-scoped, never moves backward.
    last_seen_at: DateTime<Utc>,
    /// Dismissed notification ids, in dismissal order. Durable.
    dismissed: Vec<String>,
    /// Ids removed by the most recent delete action. Session-scoped.
    pending_undo: Vec<String>,
    /// Bumped on every buffer replacement so a stale timer that already
    /// woke can't clear a newer buffer.
    generation: u64,
}

pub struct NotificationLedger {
    state: Arc<Mutex<LedgerState>>,
    store: LedgerStore,
    timer: Option<JoinHandle<()>>,
}

impl NotificationLedger {
    /// Load the durable dismissed set and start with a fresh session state
    /// (epoch watermark, empty undo buffer).
    pub fn new(store: LedgerStore) -> Result<Self> {
        let dismissed = store.load_dismissed()?;
        Ok(Self {
            state: Arc::new(Mutex::new(LedgerState {
                last_seen_at: DateTime::UNIX_EPOCH,
                dismissed,
                pending_undo: Vec::new(),
                generation: 0,
            })),
            store,
            timer: None,
        })
    }

    // -----------------------------------------------------------------------
    // Watermark
    // -----------------------------------------------------------------------

    /// Advance the watermark to now. The dismissed set is untouched.
    pub fn mark_all_seen(&mut self) {
        let now = Utc::now();
        let mut state = self.state.lock().unwrap();
        if now > state.last_seen_at {
            state.last_seen_at = now;
        }
    }

    /// Advance the watermark to `t` only if later; never moves backward.
    pub fn mark_seen_up_to(&mut self, t: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap();
        if t > state.last_seen_at {
            state.last_seen_at = t;
        }
    }

    pub fn last_seen_at(&self) -> DateTime<Utc> {
        self.state.lock().unwrap().last_seen_at
    }

    // -----------------------------------------------------------------------
    // Dismissal + undo
    // -----------------------------------------------------------------------

    /// Dismiss one notification. Replaces the undo buffer with exactly this
    /// id and restarts the undo window.
    pub fn dismiss(&mut self, id: &str) -> Result<()> {
        let generation = {
            let mut state = self.state.lock().unwrap();
            if !state.dismissed.iter().any(|d| d == id) {
                state.dismissed.push(id.to_string());
            }
            state.pending_undo = vec![id.to_string()];
            state.generation += 1;
            self.store.save_dismissed(&state.dismissed)?;
            state.generation
        };
        self.arm_timer(generation);
        Ok(())
    }

    /// Dismiss a batch. The undo buffer holds only the ids this call newly
    /// dismissed; anything already dismissed stays non-undoable.
    pub fn dismiss_all<I, S>(&mut self, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (newly_added, generation) = {
            let mut state = self.state.lock().unwrap();
            let mut newly_added = Vec::new();
            for id in ids {
                let id = id.into();
                if !state.dismissed.contains(&id) && !newly_added.contains(&id) {
                    newly_added.push(id);
                }
            }
            state.dismissed.extend(newly_added.iter().cloned());
            state.pending_undo = newly_added.clone();
            state.generation += 1;
            self.store.save_dismissed(&state.dismissed)?;
            (newly_added, state.generation)
        };

        if newly_added.is_empty() {
            // Nothing became undoable; drop any earlier undo window.
            self.cancel_timer();
        } else {
            self.arm_timer(generation);
        }
        Ok(())
    }

    /// Reverse the most recent delete action. Returns the restored ids;
    /// empty when the buffer already lapsed or was never armed (no-op).
    pub fn undo(&mut self) -> Result<Vec<String>> {
        let restored = {
            let mut state = self.state.lock().unwrap();
            if state.pending_undo.is_empty() {
                return Ok(Vec::new());
            }
            let buffer = std::mem::take(&mut state.pending_undo);
            state.dismissed.retain(|id| !buffer.contains(id));
            state.generation += 1;
            self.store.save_dismissed(&state.dismissed)?;
            buffer
        };
        self.cancel_timer();
        debug!(restored = restored.len(), "undo applied");
        Ok(restored)
    }

    pub fn dismissed(&self) -> Vec<String> {
        self.state.lock().unwrap().dismissed.clone()
    }

    pub fn pending_undo(&self) -> Vec<String> {
        self.state.lock().unwrap().pending_undo.clone()
    }

    // -----------------------------------------------------------------------
    // Visibility
    // -----------------------------------------------------------------------

    /// Notifications not dismissed, in feed order. `Tab::Unread` further
    /// restricts to dates after the watermark.
    pub fn visible(&self, notifications: &[Notification], tab: Tab) -> Vec<Notification> {
        let state = self.state.lock().unwrap();
        notifications
            .iter()
            .filter(|n| !state.dismissed.contains(&n.id))
            .filter(|n| tab == Tab::All || n.date > state.last_seen_at)
            .cloned()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Undo timer
    // -----------------------------------------------------------------------

    fn arm_timer(&mut self, generation: u64) {
        self.cancel_timer();
        let state = Arc::clone(&self.state);
        // Anchor the deadline now, not at the task's first poll, so the
        // window starts when the dismissal happens (observable under a
        // paused test clock).
        let window = tokio::time::sleep(UNDO_WINDOW);
        self.timer = Some(tokio::spawn(async move {
            window.await;
            let mut state = state.lock().unwrap();
            // A newer dismissal replaced the buffer; its own timer owns it.
            if state.generation == generation {
                state.pending_undo.clear();
            }
        }));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for NotificationLedger {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
