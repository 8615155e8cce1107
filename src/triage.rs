//! Triage engine. Builds the urgent complaint queue.
//!
//! Each run fetches the full complaint set, extracts descriptive text per
//! complaint, classifies urgency, and keeps Critical/High complaints the
//! viewer's scope admits. Classification calls are dispatched concurrently
//! but the queue is assembled in source order: stable, never sorted by
//! urgency. The queue is rebuilt from scratch every run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::classify::Classify;
use crate::error::{Error, Result};
use crate::extract::ExtractionProfile;
use crate::model::{QueueEntry, Scope};
use crate::source::ComplaintSource;

/// Cancellation handle for an in-flight triage run. When the consuming
/// context goes away it cancels the run; results are discarded rather than
/// applied to a disposed state.
#[derive(Clone, Default)]
pub struct CancelHandle {
    inner: Arc<CancelInner>,
}

#[derive(Default)]
struct CancelInner {
    flag: AtomicBool,
    notify: Notify,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    async fn cancelled(&self) {
        loop {
            // Register the waiter before checking the flag so a cancel()
            // landing in between still wakes us.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// The triage engine. Owns its collaborators; state never leaks between runs.
pub struct TriageEngine {
    source: Arc<dyn ComplaintSource>,
    classifier: Arc<dyn Classify>,
    profile: ExtractionProfile,
}

impl TriageEngine {
    pub fn new(source: Arc<dyn ComplaintSource>, classifier: Arc<dyn Classify>) -> Self {
        Self {
            source,
            classifier,
            profile: ExtractionProfile::default(),
        }
    }

    /// Override the text-extraction field order.
    pub fn with_profile(mut self, profile: ExtractionProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Run a triage pass for the given scope.
    pub async fn run(&self, scope: &Scope) -> Result<Vec<QueueEntry>> {
        self.run_with_cancel(scope, &CancelHandle::default()).await
    }

    /// Run a triage pass that can be torn down mid-flight.
    ///
    /// An upstream fetch failure surfaces as [`Error::Unavailable`] with no
    /// partially populated queue. Classifier failures and timeouts are not
    /// errors: the affected complaint is simply not urgent.
    pub async fn run_with_cancel(
        &self,
        scope: &Scope,
        cancel: &CancelHandle,
    ) -> Result<Vec<QueueEntry>> {
        let complaints = tokio::select! {
            fetched = self.source.list_complaints() => fetched?,
            _ = cancel.cancelled() => return Err(Error::Cancelled),
        };

        info!(total = complaints.len(), "triage run started");

        // One classification task per complaint. Completion order doesn't
        // matter; awaiting the handles in order restores source order.
        let mut handles = Vec::with_capacity(complaints.len());
        for complaint in &complaints {
            let classifier = Arc::clone(&self.classifier);
            let text = self.profile.extract(complaint).to_string();
            handles.push(tokio::spawn(
                async move { classifier.classify(&text).await },
            ));
        }

        let mut queue = Vec::new();
        for (complaint, handle) in complaints.into_iter().zip(handles) {
            let joined = tokio::select! {
                joined = handle => joined,
                // In-flight classifications finish on their own; their
                // results are dropped with the handles.
                _ = cancel.cancelled() => return Err(Error::Cancelled),
            };

            let urgency = match joined {
                Ok(Ok(urgency)) => urgency,
                Ok(Err(e)) => {
                    warn!(id = %complaint.id, "classification failed, treating as not urgent: {e}");
                    None
                }
                Err(e) => {
                    warn!(id = %complaint.id, "classification task panicked: {e}");
                    None
                }
            };

            let Some(urgency) = urgency else { continue };
            if !urgency.is_urgent() {
                continue;
            }
            if !scope.admits(&complaint) {
                debug!(id = %complaint.id, "urgent but outside viewer scope");
                continue;
            }

            queue.push(QueueEntry {
                complaint_id: complaint.id.clone(),
                snippet: self.profile.snippet(&complaint),
                category: complaint.category.clone(),
                submission_date: complaint.submission_date,
                urgency,
                complaint,
            });
        }

        info!(urgent = queue.len(), "triage run finished");
        Ok(queue)
    }
}
