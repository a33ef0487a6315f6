//! Processing driver: keeps at most one job in flight.
//!
//! Runs after every message. It is level-triggered: whenever the slot is free
//! and an eligible pending job exists, the first one in queue order is claimed
//! and a start command is emitted in the same step.
//!
//! A job is never started twice on the driver's own initiative: once its start
//! is sent it stays held until a snapshot shows it leaving `pending`. A failed
//! start keeps it held until the user asks for the next job explicitly.

use crate::{AppState, Effect, JobId, JobStatus, StoreEvent};

pub(crate) fn drive(state: &mut AppState) -> Vec<Effect> {
    release_held(state);
    release_slot(state);

    if state.store.is_processing() {
        return Vec::new();
    }

    let (starting, failed_starts) = (&state.starting, &state.failed_starts);
    let Some(next_id) = state
        .store
        .first_pending(|id| starting.contains(id) || failed_starts.contains(id))
        .map(|job| job.id.clone())
    else {
        return Vec::new();
    };

    state.store.apply(StoreEvent::BeginProcessing(next_id.clone()));
    state.starting.insert(next_id.clone());
    vec![Effect::StartProcessing { job_id: next_id }]
}

/// A job stops being held once it is observed leaving `pending` or the queue.
fn release_held(state: &mut AppState) {
    let store = &state.store;
    let still_pending = |id: &JobId| {
        store
            .job(id)
            .is_some_and(|job| job.status == JobStatus::Pending)
    };
    state.starting.retain(still_pending);
    state.failed_starts.retain(still_pending);
}

/// Free the slot when the job it was claimed for is gone or finished.
fn release_slot(state: &mut AppState) {
    if !state.store.is_processing() {
        return;
    }
    let finished = state
        .store
        .current_job()
        .map_or(true, |job| job.status.is_terminal());
    if finished {
        state.store.apply(StoreEvent::AbortProcessing);
    }
}
