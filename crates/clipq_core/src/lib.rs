//! Clipq core: pure queue store, processing driver and view-model helpers.
mod driver;
mod effect;
mod job;
mod msg;
mod notification;
mod offsets;
mod state;
mod store;
mod update;
mod view_model;

pub use effect::{Command, Effect};
pub use job::{Job, JobId, JobPatch, JobResult, JobStatus};
pub use msg::Msg;
pub use notification::{Notification, NotificationLevel};
pub use offsets::{OffsetKind, SelectedOffsets};
pub use state::{AppState, SubmissionDraft};
pub use store::{QueueStore, StoreEvent};
pub use update::update;
pub use view_model::{DraftView, JobRowView, QueueViewModel};
