use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::view_model::{DraftView, JobRowView, QueueViewModel};
use crate::{Effect, JobId, Notification, QueueStore, SelectedOffsets};

/// The video and offsets the user is preparing to submit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionDraft {
    pub source: Option<PathBuf>,
    pub offsets: SelectedOffsets,
}

impl SubmissionDraft {
    pub fn is_ready(&self) -> bool {
        self.source.is_some() && !self.offsets.is_empty()
    }

    pub(crate) fn file_name(&self) -> Option<String> {
        let source = self.source.as_ref()?;
        let name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());
        Some(name)
    }
}

/// Session state: the queue store plus everything the shell needs around it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) store: QueueStore,
    /// Jobs whose start was sent and not yet observed leaving `pending`.
    pub(crate) starting: BTreeSet<JobId>,
    /// Jobs whose start failed; only an explicit "process next" retries them.
    pub(crate) failed_starts: BTreeSet<JobId>,
    pub(crate) polling: bool,
    pub(crate) draft: SubmissionDraft,
    pub(crate) notifications: Vec<Notification>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &QueueStore {
        &self.store
    }

    pub fn draft(&self) -> &SubmissionDraft {
        &self.draft
    }

    /// Whether the driver must not start `id` on its own.
    pub fn is_held(&self, id: &str) -> bool {
        self.starting.contains(id) || self.failed_starts.contains(id)
    }

    /// A start for `id` was sent and nothing has confirmed or failed it yet.
    pub fn is_starting(&self, id: &str) -> bool {
        self.starting.contains(id)
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn view(&self) -> QueueViewModel {
        let current = self.store.current_id().cloned();
        let jobs = self
            .store
            .jobs()
            .map(|job| JobRowView {
                job_id: job.id.clone(),
                file_name: job.file_name.clone(),
                status: job.status,
                progress: job.progress,
                error: job.error.clone(),
                has_result: job.result.is_some(),
                is_current: current.as_ref() == Some(&job.id),
            })
            .collect::<Vec<_>>();
        let can_process_next = !self.store.is_processing()
            && self.store.first_pending(|_| false).is_some();

        QueueViewModel {
            job_count: jobs.len(),
            jobs,
            current,
            is_processing: self.store.is_processing(),
            polling: self.polling,
            can_process_next,
            draft: DraftView {
                file_name: self.draft.file_name(),
                default_minutes: self.draft.offsets.minutes(crate::OffsetKind::Default),
                vertical_minutes: self.draft.offsets.minutes(crate::OffsetKind::Vertical),
                ready: self.draft.is_ready(),
            },
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Drain queued notifications for display.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Track the "any job still active" predicate and report when it flips.
    pub(crate) fn sync_polling(&mut self) -> Option<Effect> {
        let active = self.store.has_active_jobs();
        if active == self.polling {
            return None;
        }
        self.polling = active;
        Some(Effect::SetPolling { active })
    }
}
