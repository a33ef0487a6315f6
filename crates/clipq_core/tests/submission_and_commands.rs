use std::path::PathBuf;
use std::sync::Once;

use clipq_core::{
    update, AppState, Command, Effect, Job, JobResult, JobStatus, Msg, NotificationLevel,
    OffsetKind, SelectedOffsets, StoreEvent, SubmissionDraft,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(clipq_logging::initialize_for_tests);
}

fn select(state: AppState, kind: OffsetKind, minute: u32) -> AppState {
    update(state, Msg::OffsetSelected { kind, minute }).0
}

fn completed_job(id: &str) -> Job {
    let mut job = Job::new(id, format!("{id}.mp4"), JobStatus::Completed);
    job.progress = 100.0;
    job.result = Some(JobResult {
        download_url: format!("/download/{id}"),
        file_name: format!("{id}_segments.zip"),
    });
    job
}

#[test]
fn selecting_same_offset_twice_keeps_one_entry() {
    init_logging();
    let state = select(AppState::new(), OffsetKind::Default, 3);
    let state = select(state, OffsetKind::Default, 3);

    assert_eq!(state.view().draft.default_minutes, vec![3]);
}

#[test]
fn deselect_only_touches_its_own_set() {
    init_logging();
    let state = select(AppState::new(), OffsetKind::Default, 1);
    let state = select(state, OffsetKind::Vertical, 2);
    let state = select(state, OffsetKind::Default, 5);
    let (state, _) = update(
        state,
        Msg::OffsetDeselected {
            kind: OffsetKind::Default,
            minute: 5,
        },
    );

    let draft = state.view().draft;
    assert_eq!(draft.default_minutes, vec![1]);
    assert_eq!(draft.vertical_minutes, vec![2]);
}

#[test]
fn toggled_offsets_stay_sorted() {
    init_logging();
    let mut state = AppState::new();
    for minute in [9, 2, 5, 2, 0] {
        state = update(
            state,
            Msg::OffsetToggled {
                kind: OffsetKind::Vertical,
                minute,
            },
        )
        .0;
    }
    // 2 was toggled on then off.
    assert_eq!(state.view().draft.vertical_minutes, vec![0, 5, 9]);
}

#[test]
fn submit_emits_effect_and_resets_draft() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::FileChosen(PathBuf::from("/videos/talk.mp4")),
    );
    let state = select(state, OffsetKind::Default, 4);
    let state = select(state, OffsetKind::Default, 1);
    let state = select(state, OffsetKind::Vertical, 2);
    assert!(state.view().draft.ready);

    let (state, effects) = update(state, Msg::SubmitClicked);

    assert_eq!(
        effects,
        vec![Effect::SubmitJob {
            source: PathBuf::from("/videos/talk.mp4"),
            file_name: "talk.mp4".to_string(),
            offsets: SelectedOffsets::from_minutes([1, 4], [2]),
        }]
    );
    assert_eq!(state.draft(), &SubmissionDraft::default());
    // Nothing is fabricated locally before the backend reflects the job.
    assert_eq!(state.view().job_count, 0);
}

#[test]
fn submit_without_offsets_warns_and_keeps_draft() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::FileChosen(PathBuf::from("clip.mov")),
    );

    let (mut state, effects) = update(state, Msg::SubmitClicked);

    assert!(effects.is_empty());
    assert_eq!(state.view().draft.file_name.as_deref(), Some("clip.mov"));
    let notifications = state.take_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, NotificationLevel::Warning);
    assert_eq!(
        notifications[0].message,
        "Please select a video and at least one minute"
    );
}

#[test]
fn submit_without_file_warns() {
    init_logging();
    let state = select(AppState::new(), OffsetKind::Default, 1);
    let (mut state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
    assert_eq!(state.take_notifications().len(), 1);
}

#[test]
fn accepted_submit_and_delete_trigger_refresh() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::CommandAccepted {
            command: Command::Submit {
                file_name: "talk.mp4".to_string(),
            },
        },
    );
    assert_eq!(effects, vec![Effect::RefreshQueue]);

    let (_state, effects) = update(
        state,
        Msg::CommandAccepted {
            command: Command::Delete {
                job_id: "a".to_string(),
            },
        },
    );
    assert_eq!(effects, vec![Effect::RefreshQueue]);
}

#[test]
fn session_start_loads_queue() {
    init_logging();
    let (_state, effects) = update(AppState::new(), Msg::SessionStarted);
    assert_eq!(effects, vec![Effect::RefreshQueue]);
}

#[test]
fn command_failures_notify_without_touching_queue() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::Apply(StoreEvent::ReplaceAll(vec![completed_job("a")])),
    );
    let before = state.store().clone();

    let (state, effects) = update(
        state,
        Msg::CommandFailed {
            command: Command::Delete {
                job_id: "a".to_string(),
            },
            message: "http status 404".to_string(),
        },
    );
    let (mut state, _) = update(
        state,
        Msg::CommandFailed {
            command: Command::Submit {
                file_name: "talk.mp4".to_string(),
            },
            message: "network error".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.store(), &before);
    let titles: Vec<_> = state
        .take_notifications()
        .into_iter()
        .map(|notification| notification.title)
        .collect();
    assert_eq!(
        titles,
        vec!["Failed to remove item from queue", "Failed to add video to queue"]
    );
}

#[test]
fn delete_is_requested_not_applied() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::Apply(StoreEvent::ReplaceAll(vec![completed_job("a")])),
    );

    let (state, effects) = update(state, Msg::DeleteClicked("a".to_string()));

    assert_eq!(
        effects,
        vec![Effect::DeleteJob {
            job_id: "a".to_string()
        }]
    );
    assert_eq!(state.view().job_count, 1);
}

#[test]
fn delete_of_processing_job_is_refused() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::Apply(StoreEvent::ReplaceAll(vec![Job::new(
            "a",
            "a.mp4",
            JobStatus::Processing,
        )])),
    );

    let (mut state, effects) = update(state, Msg::DeleteClicked("a".to_string()));

    assert!(effects.is_empty());
    assert_eq!(state.take_notifications()[0].title, "Cannot remove item");
}

#[test]
fn download_requires_completed_result() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::Apply(StoreEvent::ReplaceAll(vec![
            completed_job("a"),
            Job::new("b", "b.mp4", JobStatus::Failed),
        ])),
    );

    let (state, effects) = update(state, Msg::DownloadClicked("a".to_string()));
    assert_eq!(
        effects,
        vec![Effect::DownloadResult {
            job_id: "a".to_string(),
            locator: "/download/a".to_string(),
            file_name: "a_segments.zip".to_string(),
        }]
    );

    let (mut state, effects) = update(state, Msg::DownloadClicked("b".to_string()));
    assert!(effects.is_empty());
    assert_eq!(state.take_notifications()[0].level, NotificationLevel::Warning);
}

#[test]
fn result_saved_produces_info_notification() {
    init_logging();
    let (mut state, effects) = update(
        AppState::new(),
        Msg::ResultSaved {
            job_id: "a".to_string(),
            path: PathBuf::from("downloads/a_segments.zip"),
        },
    );
    assert!(effects.is_empty());
    let notifications = state.take_notifications();
    assert_eq!(notifications[0].level, NotificationLevel::Info);
    assert!(notifications[0].message.contains("a_segments.zip"));
}

#[test]
fn clear_completed_keeps_pending_and_failed_jobs() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::Apply(StoreEvent::ReplaceAll(vec![
            completed_job("a"),
            Job::new("b", "b.mp4", JobStatus::Failed),
        ])),
    );
    let (mut state, _) = update(state, Msg::ClearCompletedClicked);

    let view = state.view();
    assert_eq!(view.job_count, 1);
    assert_eq!(view.jobs[0].job_id, "b");
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn identical_snapshot_leaves_state_clean() {
    init_logging();
    let jobs = vec![Job::new("a", "a.mp4", JobStatus::Processing)];
    let (mut state, _) = update(
        AppState::new(),
        Msg::Apply(StoreEvent::ReplaceAll(jobs.clone())),
    );
    assert!(state.consume_dirty());

    let (mut state, effects) = update(state, Msg::Apply(StoreEvent::ReplaceAll(jobs)));
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn reordered_snapshot_marks_state_dirty() {
    init_logging();
    let (mut state, _) = update(
        AppState::new(),
        Msg::Apply(StoreEvent::ReplaceAll(vec![
            completed_job("a"),
            completed_job("b"),
        ])),
    );
    assert!(state.consume_dirty());

    let (mut state, _) = update(
        state,
        Msg::Apply(StoreEvent::ReplaceAll(vec![
            completed_job("b"),
            completed_job("a"),
        ])),
    );
    assert!(state.consume_dirty());
}

#[test]
fn failed_command_marks_state_dirty() {
    init_logging();
    let (mut state, _) = update(
        AppState::new(),
        Msg::CommandFailed {
            command: Command::Delete {
                job_id: "a".to_string(),
            },
            message: "network error: refused".to_string(),
        },
    );
    assert!(state.consume_dirty());
    assert_eq!(state.take_notifications().len(), 1);
}
