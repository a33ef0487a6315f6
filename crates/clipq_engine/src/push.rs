//! Push channel: one WebSocket subscription carrying queue snapshots.
//!
//! The backend sends `{"type": "queue_update", "items": [...]}` whenever the
//! queue changes. Other message types are ignored so newer servers can add
//! kinds without breaking older clients.
//!
//! The connection is single-shot. When it ends for any reason a single
//! [`EngineEvent::PushClosed`] is emitted and the task returns; whoever owns
//! the channel decides whether to open a new one.

use std::sync::mpsc;

use clipq_logging::{clipq_debug, clipq_info, clipq_warn};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, RemoteJob, SnapshotSource};

const QUEUE_UPDATE: &str = "queue_update";

#[derive(Debug, Clone, PartialEq)]
pub enum PushMessage {
    QueueUpdate(Vec<RemoteJob>),
    /// A message type this client does not handle.
    Other { kind: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("malformed push message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("queue_update without items")]
    MissingItems,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    items: Option<serde_json::Value>,
}

/// Parse one text frame from the push channel.
pub fn parse_push_message(text: &str) -> Result<PushMessage, PushError> {
    let envelope: Envelope = serde_json::from_str(text)?;
    if envelope.kind != QUEUE_UPDATE {
        return Ok(PushMessage::Other {
            kind: envelope.kind,
        });
    }
    let items = envelope.items.ok_or(PushError::MissingItems)?;
    Ok(PushMessage::QueueUpdate(serde_json::from_value(items)?))
}

/// Run the push subscription until the socket ends or `cancel` fires.
pub async fn run_push_channel(
    url: String,
    events: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) {
    let connected = tokio::select! {
        _ = cancel.cancelled() => return,
        connected = connect_async(url.as_str()) => connected,
    };
    let mut stream = match connected {
        Ok((stream, _response)) => {
            clipq_info!("Push channel connected to {}", url);
            stream
        }
        Err(err) => {
            clipq_warn!("Push channel could not connect to {}: {}", url, err);
            let _ = events.send(EngineEvent::PushClosed {
                reason: err.to_string(),
            });
            return;
        }
    };

    let reason = loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => {
                let _ = stream.close(None).await;
                clipq_debug!("Push channel closed by owner");
                return;
            }
            frame = stream.next() => frame,
        };

        match frame {
            Some(Ok(Message::Text(text))) => match parse_push_message(&text) {
                Ok(PushMessage::QueueUpdate(jobs)) => {
                    clipq_debug!("Push snapshot with {} jobs", jobs.len());
                    let snapshot = EngineEvent::Snapshot {
                        source: SnapshotSource::Push,
                        jobs,
                    };
                    if events.send(snapshot).is_err() {
                        break "event receiver dropped".to_string();
                    }
                }
                Ok(PushMessage::Other { kind }) => {
                    clipq_debug!("Ignoring push message of type {:?}", kind);
                }
                Err(err) => {
                    clipq_warn!("Dropping push message: {}", err);
                }
            },
            Some(Ok(Message::Close(frame))) => {
                break frame
                    .map(|frame| format!("closed by server: {}", frame.reason))
                    .unwrap_or_else(|| "closed by server".to_string());
            }
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                clipq_warn!("Push channel error: {}", err);
                break err.to_string();
            }
            None => break "stream ended".to_string(),
        }
    };

    clipq_info!("Push channel closed: {}", reason);
    let _ = events.send(EngineEvent::PushClosed { reason });
}
