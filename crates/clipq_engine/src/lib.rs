//! Clipq engine: backend commands, push and poll channels, result downloads.
mod client;
mod engine;
mod persist;
mod poll;
mod push;
mod types;

pub use client::{ClientSettings, QueueApi, ReqwestQueueClient};
pub use engine::{EngineConfig, EngineEvents, EngineHandle};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poll::{run_poll_loop, DEFAULT_POLL_INTERVAL};
pub use push::{parse_push_message, run_push_channel, PushError, PushMessage};
pub use types::{
    ApiError, EngineEvent, FailureKind, RemoteCommand, RemoteJob, RemoteMinutes, RemoteResult,
    RemoteStatus, SnapshotSource, SubmitRequest, Upload,
};
