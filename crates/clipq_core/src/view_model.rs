use crate::{JobId, JobStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftView {
    pub file_name: Option<String>,
    pub default_minutes: Vec<u32>,
    pub vertical_minutes: Vec<u32>,
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueueViewModel {
    pub jobs: Vec<JobRowView>,
    pub job_count: usize,
    pub current: Option<JobId>,
    pub is_processing: bool,
    pub polling: bool,
    /// Mirrors the "Process Next" button: idle slot and at least one pending job.
    pub can_process_next: bool,
    pub draft: DraftView,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub file_name: String,
    pub status: JobStatus,
    pub progress: f64,
    pub error: Option<String>,
    pub has_result: bool,
    pub is_current: bool,
}
