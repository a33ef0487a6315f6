use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use clipq_logging::{clipq_debug, clipq_error, clipq_info, clipq_warn};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::client::{ClientSettings, QueueApi, ReqwestQueueClient};
use crate::persist::AtomicFileWriter;
use crate::poll::{run_poll_loop, DEFAULT_POLL_INTERVAL};
use crate::push::run_push_channel;
use crate::{ApiError, EngineEvent, FailureKind, RemoteCommand, SnapshotSource, SubmitRequest, Upload};

/// How long shutdown waits for commands that are already on the wire.
const COMMAND_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub client: ClientSettings,
    /// Push subscription endpoint; `None` runs on polling alone.
    pub push_url: Option<String>,
    pub poll_interval: Duration,
    pub download_dir: PathBuf,
}

impl EngineConfig {
    pub fn default_with_output(download_dir: PathBuf) -> Self {
        Self {
            client: ClientSettings::default(),
            push_url: Some("ws://localhost:8000/ws/queue".to_string()),
            poll_interval: DEFAULT_POLL_INTERVAL,
            download_dir,
        }
    }
}

enum EngineCommand {
    Refresh,
    SetPolling(bool),
    Submit(SubmitRequest),
    Delete {
        job_id: String,
    },
    StartProcessing {
        job_id: String,
    },
    Download {
        job_id: String,
        locator: String,
        file_name: String,
    },
    Shutdown,
}

/// Receiving side of the engine: snapshots and command outcomes, in the order
/// the engine produced them.
pub struct EngineEvents {
    rx: mpsc::Receiver<EngineEvent>,
}

impl EngineEvents {
    /// Blocks until the next event; `None` once the engine is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.rx.try_recv().ok()
    }
}

/// Owns the IO side: a background thread running a tokio runtime with the
/// push channel, the poll driver and one task per command.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<(Self, EngineEvents), ApiError> {
        let api = Arc::new(ReqwestQueueClient::new(config.client.clone())?);
        Ok(Self::with_api(config, api))
    }

    /// Start the engine against any [`QueueApi`] implementation.
    pub fn with_api(config: EngineConfig, api: Arc<dyn QueueApi>) -> (Self, EngineEvents) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("clipq-engine".to_string())
            .spawn(move || run_engine(config, api, cmd_rx, event_tx));
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                clipq_error!("Failed to spawn engine thread: {}", err);
                None
            }
        };

        (Self { cmd_tx, worker }, EngineEvents { rx: event_rx })
    }

    pub fn refresh(&self) {
        self.send(EngineCommand::Refresh);
    }

    pub fn set_polling(&self, active: bool) {
        self.send(EngineCommand::SetPolling(active));
    }

    pub fn submit(&self, request: SubmitRequest) {
        self.send(EngineCommand::Submit(request));
    }

    pub fn delete(&self, job_id: impl Into<String>) {
        self.send(EngineCommand::Delete {
            job_id: job_id.into(),
        });
    }

    pub fn start_processing(&self, job_id: impl Into<String>) {
        self.send(EngineCommand::StartProcessing {
            job_id: job_id.into(),
        });
    }

    pub fn download(
        &self,
        job_id: impl Into<String>,
        locator: impl Into<String>,
        file_name: impl Into<String>,
    ) {
        self.send(EngineCommand::Download {
            job_id: job_id.into(),
            locator: locator.into(),
            file_name: file_name.into(),
        });
    }

    /// Close the push channel and stop polling. Commands already sent get a
    /// short grace period to finish; their results may go unobserved.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.send(EngineCommand::Shutdown);
        if worker.join().is_err() {
            clipq_error!("Engine thread panicked");
        }
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            clipq_warn!("Engine is not running; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_engine(
    config: EngineConfig,
    api: Arc<dyn QueueApi>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("clipq-io")
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            clipq_error!("Failed to start engine runtime: {}", err);
            return;
        }
    };

    let cancel = CancellationToken::new();
    let commands = TaskTracker::new();
    let writer = Arc::new(AtomicFileWriter::new(config.download_dir.clone()));
    let (active_tx, active_rx) = watch::channel(false);

    if let Some(url) = config.push_url.clone() {
        runtime.spawn(run_push_channel(url, event_tx.clone(), cancel.child_token()));
    }
    runtime.spawn(run_poll_loop(
        api.clone(),
        config.poll_interval,
        active_rx,
        event_tx.clone(),
        cancel.child_token(),
    ));

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::SetPolling(active) => {
                clipq_debug!("Polling {}", if active { "enabled" } else { "disabled" });
                active_tx.send_replace(active);
            }
            EngineCommand::Shutdown => break,
            command => {
                let api = api.clone();
                let writer = writer.clone();
                let event_tx = event_tx.clone();
                commands.spawn_on(
                    async move {
                        handle_command(api.as_ref(), &writer, command, event_tx).await;
                    },
                    runtime.handle(),
                );
            }
        }
    }

    clipq_info!("Engine shutting down");
    cancel.cancel();
    commands.close();
    runtime.block_on(async {
        if tokio::time::timeout(COMMAND_GRACE, commands.wait())
            .await
            .is_err()
        {
            clipq_warn!("Abandoning {} unfinished commands", commands.len());
        }
    });
}

async fn handle_command(
    api: &dyn QueueApi,
    writer: &Arc<AtomicFileWriter>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Refresh => match api.fetch_queue().await {
            Ok(jobs) => EngineEvent::Snapshot {
                source: SnapshotSource::Refresh,
                jobs,
            },
            Err(error) => {
                clipq_warn!("Queue refresh failed: {}", error);
                EngineEvent::FetchFailed {
                    source: SnapshotSource::Refresh,
                    error,
                }
            }
        },
        EngineCommand::Submit(request) => {
            let command = RemoteCommand::Submit {
                file_name: request.file_name.clone(),
            };
            let result = match read_upload(request).await {
                Ok(upload) => api.submit(upload).await,
                Err(error) => Err(error),
            };
            command_outcome(command, result)
        }
        EngineCommand::Delete { job_id } => {
            let result = api.delete(&job_id).await;
            command_outcome(RemoteCommand::Delete { job_id }, result)
        }
        EngineCommand::StartProcessing { job_id } => {
            let result = api.start_processing(&job_id).await;
            command_outcome(RemoteCommand::StartProcessing { job_id }, result)
        }
        EngineCommand::Download {
            job_id,
            locator,
            file_name,
        } => match download(api, writer, &locator, &file_name).await {
            Ok(path) => {
                clipq_info!("Saved result of job {} to {:?}", job_id, path);
                EngineEvent::ResultSaved { job_id, path }
            }
            Err(error) => command_outcome(RemoteCommand::Download { job_id }, Err(error)),
        },
        EngineCommand::SetPolling(_) | EngineCommand::Shutdown => return,
    };
    let _ = event_tx.send(event);
}

fn command_outcome(command: RemoteCommand, result: Result<(), ApiError>) -> EngineEvent {
    match result {
        Ok(()) => {
            clipq_info!("Backend accepted {}", command);
            EngineEvent::CommandAccepted { command }
        }
        Err(error) => {
            clipq_warn!("Command {} failed: {}", command, error);
            EngineEvent::CommandFailed { command, error }
        }
    }
}

async fn read_upload(request: SubmitRequest) -> Result<Upload, ApiError> {
    let bytes = tokio::fs::read(&request.source).await.map_err(|err| {
        ApiError::new(
            FailureKind::Io,
            format!("cannot read {}: {err}", request.source.display()),
        )
    })?;
    Ok(Upload {
        file_name: request.file_name,
        bytes: Bytes::from(bytes),
        default_minutes: request.default_minutes,
        vertical_minutes: request.vertical_minutes,
    })
}

async fn download(
    api: &dyn QueueApi,
    writer: &Arc<AtomicFileWriter>,
    locator: &str,
    file_name: &str,
) -> Result<PathBuf, ApiError> {
    let bytes = api.download_result(locator).await?;
    let writer = Arc::clone(writer);
    let file_name = file_name.to_string();
    tokio::task::spawn_blocking(move || writer.write(&file_name, &bytes))
        .await
        .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?
        .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))
}
