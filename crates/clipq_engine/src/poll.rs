use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use clipq_logging::{clipq_debug, clipq_warn};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, QueueApi, SnapshotSource};

/// Reference polling period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Periodically fetch the full queue while `active` is true.
///
/// The fetch is awaited inside the tick handler, so a tick that comes due
/// while a request is outstanding is skipped instead of starting a second
/// request. The first fetch happens one `interval` after activation.
pub async fn run_poll_loop(
    api: Arc<dyn QueueApi>,
    interval: Duration,
    mut active: watch::Receiver<bool>,
    events: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) {
    loop {
        while !*active.borrow_and_update() {
            tokio::select! {
                _ = cancel.cancelled() => return,
                changed = active.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }

        clipq_debug!("Poll driver active every {:?}", interval);
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                changed = active.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    if !*active.borrow_and_update() {
                        clipq_debug!("Poll driver idle");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let outcome = tokio::select! {
                        _ = cancel.cancelled() => return,
                        outcome = api.fetch_queue() => outcome,
                    };
                    let event = match outcome {
                        Ok(jobs) => EngineEvent::Snapshot {
                            source: SnapshotSource::Poll,
                            jobs,
                        },
                        Err(error) => {
                            clipq_warn!("Queue poll failed: {}", error);
                            EngineEvent::FetchFailed {
                                source: SnapshotSource::Poll,
                                error,
                            }
                        }
                    };
                    if events.send(event).is_err() {
                        return;
                    }
                }
            }
        }
    }
}
