use std::sync::mpsc;
use std::thread;

use clipq_core::{
    Command, Effect, Job, JobResult, JobStatus, Msg, OffsetKind, SelectedOffsets, StoreEvent,
};
use clipq_engine::{
    EngineConfig, EngineEvent, EngineEvents, EngineHandle, RemoteCommand, RemoteJob, RemoteStatus,
    SubmitRequest,
};
use clipq_logging::{clipq_debug, clipq_info, clipq_warn};

use crate::session::Input;

/// Executes core effects against the engine and feeds engine events back to
/// the session as messages.
pub struct EffectRunner {
    engine: EngineHandle,
    forwarder: Option<thread::JoinHandle<()>>,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, input_tx: mpsc::Sender<Input>) -> anyhow::Result<Self> {
        let (engine, events) = EngineHandle::new(config)?;
        let forwarder = thread::Builder::new()
            .name("clipq-events".to_string())
            .spawn(move || forward_events(events, input_tx))?;
        Ok(Self {
            engine,
            forwarder: Some(forwarder),
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RefreshQueue => self.engine.refresh(),
                Effect::SetPolling { active } => {
                    clipq_info!("Polling {}", if active { "started" } else { "stopped" });
                    self.engine.set_polling(active);
                }
                Effect::SubmitJob {
                    source,
                    file_name,
                    offsets,
                } => {
                    clipq_info!("SubmitJob file={} source={:?}", file_name, source);
                    self.engine.submit(SubmitRequest {
                        source,
                        file_name,
                        default_minutes: offsets.minutes(OffsetKind::Default),
                        vertical_minutes: offsets.minutes(OffsetKind::Vertical),
                    });
                }
                Effect::DeleteJob { job_id } => {
                    clipq_info!("DeleteJob job_id={}", job_id);
                    self.engine.delete(job_id);
                }
                Effect::StartProcessing { job_id } => {
                    clipq_info!("StartProcessing job_id={}", job_id);
                    self.engine.start_processing(job_id);
                }
                Effect::DownloadResult {
                    job_id,
                    locator,
                    file_name,
                } => {
                    clipq_info!("DownloadResult job_id={} locator={}", job_id, locator);
                    self.engine.download(job_id, locator, file_name);
                }
            }
        }
    }

    /// Stop the engine, then wait for the event forwarder to drain.
    pub fn shutdown(mut self) {
        self.engine.shutdown();
        if let Some(forwarder) = self.forwarder.take() {
            let _ = forwarder.join();
        }
    }
}

fn forward_events(events: EngineEvents, input_tx: mpsc::Sender<Input>) {
    while let Some(event) = events.recv() {
        let Some(msg) = event_to_msg(event) else {
            continue;
        };
        if input_tx.send(Input::Msg(msg)).is_err() {
            break;
        }
    }
    clipq_debug!("Engine event stream ended");
}

/// Translate an engine event into a core message. Channel health events are
/// logged only; they never change the queue.
pub fn event_to_msg(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::Snapshot { source, jobs } => {
            clipq_debug!("Snapshot from {} with {} jobs", source, jobs.len());
            let jobs = jobs.into_iter().map(map_job).collect();
            Some(Msg::Apply(StoreEvent::ReplaceAll(jobs)))
        }
        EngineEvent::FetchFailed { source, error } => {
            clipq_warn!("Queue fetch via {} failed: {}", source, error);
            None
        }
        EngineEvent::PushClosed { reason } => {
            clipq_warn!("Push channel gone ({}); relying on polling", reason);
            None
        }
        EngineEvent::CommandAccepted { command } => Some(Msg::CommandAccepted {
            command: map_command(command),
        }),
        EngineEvent::CommandFailed { command, error } => Some(Msg::CommandFailed {
            command: map_command(command),
            message: error.to_string(),
        }),
        EngineEvent::ResultSaved { job_id, path } => Some(Msg::ResultSaved { job_id, path }),
    }
}

fn map_job(remote: RemoteJob) -> Job {
    Job {
        id: remote.id,
        file_name: remote.file_name,
        status: map_status(remote.status),
        progress: remote.progress,
        offsets: SelectedOffsets::from_minutes(
            remote.selected_minutes.default,
            remote.selected_minutes.vertical,
        ),
        error: remote.error,
        result: remote.result.map(|result| JobResult {
            download_url: result.download_url,
            file_name: result.file_name,
        }),
        created_at: remote.created_at,
        updated_at: remote.updated_at,
    }
}

fn map_status(status: RemoteStatus) -> JobStatus {
    match status {
        RemoteStatus::Pending => JobStatus::Pending,
        RemoteStatus::Processing => JobStatus::Processing,
        RemoteStatus::Completed => JobStatus::Completed,
        RemoteStatus::Failed => JobStatus::Failed,
    }
}

fn map_command(command: RemoteCommand) -> Command {
    match command {
        RemoteCommand::Submit { file_name } => Command::Submit { file_name },
        RemoteCommand::Delete { job_id } => Command::Delete { job_id },
        RemoteCommand::StartProcessing { job_id } => Command::StartProcessing { job_id },
        RemoteCommand::Download { job_id } => Command::Download { job_id },
    }
}
