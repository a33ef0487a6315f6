use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use serde::Deserialize;

/// Job status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RemoteMinutes {
    #[serde(default)]
    pub default: Vec<u32>,
    #[serde(default)]
    pub vertical: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteResult {
    pub download_url: String,
    pub file_name: String,
}

/// One queue entry in the backend's wire format.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteJob {
    pub id: String,
    pub file_name: String,
    pub status: RemoteStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub selected_minutes: RemoteMinutes,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub result: Option<RemoteResult>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// A video upload for `POST /upload/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
    pub default_minutes: Vec<u32>,
    pub vertical_minutes: Vec<u32>,
}

/// A submission whose video still has to be read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub source: PathBuf,
    pub file_name: String,
    pub default_minutes: Vec<u32>,
    pub vertical_minutes: Vec<u32>,
}

/// Which channel produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Push,
    Poll,
    Refresh,
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotSource::Push => write!(f, "push"),
            SnapshotSource::Poll => write!(f, "poll"),
            SnapshotSource::Refresh => write!(f, "refresh"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    Submit { file_name: String },
    Delete { job_id: String },
    StartProcessing { job_id: String },
    Download { job_id: String },
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteCommand::Submit { file_name } => write!(f, "submit {file_name}"),
            RemoteCommand::Delete { job_id } => write!(f, "delete {job_id}"),
            RemoteCommand::StartProcessing { job_id } => write!(f, "start {job_id}"),
            RemoteCommand::Download { job_id } => write!(f, "download {job_id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Snapshot {
        source: SnapshotSource,
        jobs: Vec<RemoteJob>,
    },
    FetchFailed {
        source: SnapshotSource,
        error: ApiError,
    },
    CommandAccepted {
        command: RemoteCommand,
    },
    CommandFailed {
        command: RemoteCommand,
        error: ApiError,
    },
    ResultSaved {
        job_id: String,
        path: PathBuf,
    },
    /// The push connection ended or never came up. It is not reopened.
    PushClosed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}
