use clipq_core::{update, AppState, Job, JobStatus, Msg, StoreEvent};

#[test]
fn update_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn noop_does_not_wake_the_driver() {
    let mut state = AppState::new();
    // A completed job leaves the driver with nothing to start.
    let (staged, _) = update(
        state,
        Msg::Apply(StoreEvent::Insert(Job::new("a", "a.mp4", JobStatus::Completed))),
    );
    state = staged;

    let (next, effects) = update(state.clone(), Msg::NoOp);
    assert_eq!(state, next);
    assert!(effects.is_empty());
}
