use std::path::PathBuf;

use crate::{JobId, SelectedOffsets};

/// IO requested by [`crate::update`]. Executing an effect never mutates the
/// store directly; outcomes come back as messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// One-shot full queue fetch.
    RefreshQueue,
    /// Start or stop the periodic queue fetch.
    SetPolling { active: bool },
    SubmitJob {
        source: PathBuf,
        file_name: String,
        offsets: SelectedOffsets,
    },
    DeleteJob { job_id: JobId },
    StartProcessing { job_id: JobId },
    DownloadResult {
        job_id: JobId,
        locator: String,
        file_name: String,
    },
}

/// A backend command, used to correlate outcomes with what was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit { file_name: String },
    Delete { job_id: JobId },
    StartProcessing { job_id: JobId },
    Download { job_id: JobId },
}
