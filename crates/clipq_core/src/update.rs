use crate::driver;
use crate::{
    AppState, Command, Effect, JobStatus, Msg, Notification, QueueStore, StoreEvent,
    SubmissionDraft,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// The processing driver and the polling predicate are re-evaluated after
/// every message, so effects they produce follow the message's own effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if matches!(msg, Msg::NoOp) {
        return (state, Vec::new());
    }
    let before = Visible::of(&state);

    let mut effects = match msg {
        Msg::SessionStarted => vec![Effect::RefreshQueue],
        Msg::Apply(event) => {
            state.store.apply(event);
            Vec::new()
        }
        Msg::FileChosen(path) => {
            state.draft.source = Some(path);
            Vec::new()
        }
        Msg::OffsetSelected { kind, minute } => {
            state.draft.offsets.select(kind, minute);
            Vec::new()
        }
        Msg::OffsetDeselected { kind, minute } => {
            state.draft.offsets.deselect(kind, minute);
            Vec::new()
        }
        Msg::OffsetToggled { kind, minute } => {
            state.draft.offsets.toggle(kind, minute);
            Vec::new()
        }
        Msg::SubmitClicked => submit_draft(&mut state),
        Msg::DeleteClicked(job_id) => match state.store.job(&job_id).map(|job| job.status) {
            None => Vec::new(),
            Some(JobStatus::Processing) => {
                state.notify(Notification::warning(
                    "Cannot remove item",
                    "Job is being processed",
                ));
                Vec::new()
            }
            Some(_) => vec![Effect::DeleteJob { job_id }],
        },
        Msg::DownloadClicked(job_id) => {
            let target = state
                .store
                .job(&job_id)
                .filter(|job| job.status == JobStatus::Completed)
                .and_then(|job| job.result.clone());
            match target {
                Some(result) => vec![Effect::DownloadResult {
                    job_id,
                    locator: result.download_url,
                    file_name: result.file_name,
                }],
                None => {
                    state.notify(Notification::warning(
                        "Result not available",
                        format!("Job {job_id} has no downloadable result"),
                    ));
                    Vec::new()
                }
            }
        }
        Msg::ProcessNextClicked => {
            // Starts still awaiting confirmation stay held.
            if !state.store.is_processing() {
                state.failed_starts.clear();
            }
            Vec::new()
        }
        Msg::StopClicked => {
            state.store.apply(StoreEvent::SetProcessing(false));
            Vec::new()
        }
        Msg::ClearCompletedClicked => {
            state.store.apply(StoreEvent::ClearCompleted);
            Vec::new()
        }
        Msg::CommandAccepted { command } => match command {
            Command::Submit { .. } | Command::Delete { .. } => vec![Effect::RefreshQueue],
            Command::StartProcessing { .. } | Command::Download { .. } => Vec::new(),
        },
        Msg::CommandFailed { command, message } => {
            command_failed(&mut state, command, message);
            Vec::new()
        }
        Msg::ResultSaved { job_id, path } => {
            state.notify(Notification::info(
                "Download complete",
                format!("Result of job {job_id} saved to {}", path.display()),
            ));
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    effects.extend(driver::drive(&mut state));
    effects.extend(state.sync_polling());
    if before.differs(&state) {
        state.mark_dirty();
    }
    (state, effects)
}

/// What a render depends on, captured before a message is applied.
struct Visible {
    store: QueueStore,
    draft: SubmissionDraft,
    polling: bool,
    notifications: usize,
}

impl Visible {
    fn of(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            draft: state.draft.clone(),
            polling: state.polling,
            notifications: state.notifications.len(),
        }
    }

    fn differs(&self, state: &AppState) -> bool {
        self.store != state.store
            || self.draft != state.draft
            || self.polling != state.polling
            || self.notifications != state.notifications.len()
    }
}

fn submit_draft(state: &mut AppState) -> Vec<Effect> {
    let Some(file_name) = state.draft.file_name().filter(|_| state.draft.is_ready()) else {
        state.notify(Notification::warning(
            "Missing selection",
            "Please select a video and at least one minute",
        ));
        return Vec::new();
    };
    let draft = std::mem::take(&mut state.draft);
    let Some(source) = draft.source else {
        return Vec::new();
    };
    vec![Effect::SubmitJob {
        source,
        file_name,
        offsets: draft.offsets,
    }]
}

fn command_failed(state: &mut AppState, command: Command, message: String) {
    let title = match &command {
        Command::Submit { .. } => "Failed to add video to queue",
        Command::Delete { .. } => "Failed to remove item from queue",
        Command::StartProcessing { job_id } => {
            if state.starting.remove(job_id) {
                state.failed_starts.insert(job_id.clone());
            }
            // A late failure for a job the slot no longer belongs to must not
            // release someone else's claim.
            if state.store.is_processing() && state.store.current_id() == Some(job_id) {
                state.store.apply(StoreEvent::AbortProcessing);
            }
            "Failed to process video"
        }
        Command::Download { .. } => "Failed to download file",
    };
    state.notify(Notification::error(title, message));
}
