use crate::SelectedOffsets;

/// Backend-assigned job identifier. Opaque to the client.
pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Pending and processing jobs still expect server-side progress.
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Processing)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Where a completed job's output can be retrieved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    /// Locator relative to the API base, e.g. `/download/{id}`.
    pub download_url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Job {
    pub id: JobId,
    pub file_name: String,
    pub status: JobStatus,
    pub progress: f64,
    pub offsets: SelectedOffsets,
    pub error: Option<String>,
    pub result: Option<JobResult>,
    pub created_at: String,
    pub updated_at: String,
}

impl Job {
    pub fn new(id: impl Into<JobId>, file_name: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            status,
            ..Self::default()
        }
    }

    pub(crate) fn merge(&mut self, patch: JobPatch) {
        let JobPatch {
            id: _,
            status,
            progress,
            offsets,
            error,
            result,
            updated_at,
        } = patch;
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(progress) = progress {
            self.progress = progress;
        }
        if let Some(offsets) = offsets {
            self.offsets = offsets;
        }
        if let Some(error) = error {
            self.error = Some(error);
        }
        if let Some(result) = result {
            self.result = Some(result);
        }
        if let Some(updated_at) = updated_at {
            self.updated_at = updated_at;
        }
    }
}

/// A partial update for one job. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobPatch {
    pub id: JobId,
    pub status: Option<JobStatus>,
    pub progress: Option<f64>,
    pub offsets: Option<SelectedOffsets>,
    pub error: Option<String>,
    pub result: Option<JobResult>,
    pub updated_at: Option<String>,
}

impl JobPatch {
    pub fn new(id: impl Into<JobId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn result(mut self, result: JobResult) -> Self {
        self.result = Some(result);
        self
    }
}
