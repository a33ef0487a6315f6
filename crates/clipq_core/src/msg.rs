use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// The owning session came up; load the queue once.
    SessionStarted,
    /// An observed change from the push channel, the poll driver or a refresh.
    Apply(crate::StoreEvent),
    /// User picked the video to submit.
    FileChosen(PathBuf),
    OffsetSelected {
        kind: crate::OffsetKind,
        minute: u32,
    },
    OffsetDeselected {
        kind: crate::OffsetKind,
        minute: u32,
    },
    OffsetToggled {
        kind: crate::OffsetKind,
        minute: u32,
    },
    /// User submitted the current draft.
    SubmitClicked,
    DeleteClicked(crate::JobId),
    DownloadClicked(crate::JobId),
    /// Explicit request to pick up the next pending job, retrying failed starts.
    ProcessNextClicked,
    /// Local pause. Does not cancel anything on the backend.
    StopClicked,
    ClearCompletedClicked,
    /// The backend accepted a command.
    CommandAccepted { command: crate::Command },
    /// A command failed at the transport or HTTP level.
    CommandFailed {
        command: crate::Command,
        message: String,
    },
    /// A downloaded result was written to disk.
    ResultSaved { job_id: crate::JobId, path: PathBuf },
    /// Fallback for placeholder wiring.
    NoOp,
}
