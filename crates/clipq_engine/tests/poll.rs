use std::sync::{mpsc, Arc};
use std::time::Duration;

use clipq_engine::{
    run_poll_loop, ClientSettings, EngineEvent, FailureKind, QueueApi, ReqwestQueueClient,
    SnapshotSource,
};
use serde_json::json;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> Arc<dyn QueueApi> {
    Arc::new(
        ReqwestQueueClient::new(ClientSettings {
            base_url: server.uri(),
            ..ClientSettings::default()
        })
        .expect("client"),
    )
}

async fn mount_queue(server: &MockServer, delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/queue/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(delay)
                .set_body_json(json!([
                    {"id": "a", "fileName": "a.mp4", "status": "processing", "progress": 10}
                ])),
        )
        .mount(server)
        .await;
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn polls_only_while_active() {
    let server = MockServer::start().await;
    mount_queue(&server, Duration::ZERO).await;
    let (events_tx, events_rx) = mpsc::channel();
    let (active_tx, active_rx) = watch::channel(false);
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run_poll_loop(
        api_for(&server),
        Duration::from_millis(30),
        active_rx,
        events_tx,
        cancel.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(request_count(&server).await, 0);

    active_tx.send_replace(true);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(request_count(&server).await >= 2);
    match events_rx.try_recv().expect("snapshot event") {
        EngineEvent::Snapshot { source, jobs } => {
            assert_eq!(source, SnapshotSource::Poll);
            assert_eq!(jobs[0].id, "a");
        }
        other => panic!("Expected Snapshot, got {other:?}"),
    }

    active_tx.send_replace(false);
    tokio::time::sleep(Duration::from_millis(60)).await;
    let settled = request_count(&server).await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(request_count(&server).await, settled);

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_fetch_is_never_overlapped() {
    let server = MockServer::start().await;
    mount_queue(&server, Duration::from_millis(150)).await;
    let (events_tx, _events_rx) = mpsc::channel();
    let (_active_tx, active_rx) = watch::channel(true);
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run_poll_loop(
        api_for(&server),
        Duration::from_millis(10),
        active_rx,
        events_tx,
        cancel.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(500)).await;
    cancel.cancel();
    task.await.unwrap();

    // Back-to-back 150 ms fetches fit at most four times into 500 ms.
    let count = request_count(&server).await;
    assert!(count >= 1 && count <= 4, "unexpected request count {count}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fetch_failure_is_reported_and_polling_continues() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/queue/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let (events_tx, events_rx) = mpsc::channel();
    let (_active_tx, active_rx) = watch::channel(true);
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run_poll_loop(
        api_for(&server),
        Duration::from_millis(20),
        active_rx,
        events_tx,
        cancel.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel.cancel();
    task.await.unwrap();

    let failures: Vec<_> = events_rx.try_iter().collect();
    assert!(failures.len() >= 2);
    for event in failures {
        match event {
            EngineEvent::FetchFailed { source, error } => {
                assert_eq!(source, SnapshotSource::Poll);
                assert_eq!(error.kind, FailureKind::HttpStatus(500));
            }
            other => panic!("Expected FetchFailed, got {other:?}"),
        }
    }
}
