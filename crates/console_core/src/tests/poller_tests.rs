use super::*;
use shared::domain::Mode;
use tokio::sync::{mpsc, Mutex};

use crate::{
    error::FailureKind,
    test_support::{sample, Scripted, ScriptedRemote},
};

#[derive(Default)]
struct RecordingSink {
    samples: Mutex<Vec<StatusSample>>,
    failures: Mutex<Vec<FailureKind>>,
}

#[async_trait]
impl StatusSink for RecordingSink {
    async fn accept(&self, sample: StatusSample) {
        self.samples.lock().await.push(sample);
    }

    async fn reject(&self, error: ConsoleError) {
        self.failures.lock().await.push(error.kind());
    }
}

struct ChannelSink(mpsc::UnboundedSender<StatusSample>);

#[async_trait]
impl StatusSink for ChannelSink {
    async fn accept(&self, sample: StatusSample) {
        let _ = self.0.send(sample);
    }

    async fn reject(&self, _error: ConsoleError) {}
}

#[tokio::test]
async fn poll_once_routes_success_and_failure() {
    let remote = Arc::new(ScriptedRemote::new([
        Scripted::Sample(sample(Mode::Explore, 1)),
        Scripted::Failure("truncated body"),
    ]));
    let poller = StatusPoller::new(remote.clone(), DEFAULT_POLL_INTERVAL);
    let sink = RecordingSink::default();

    assert!(poller.poll_once(&sink).await);
    assert!(!poller.poll_once(&sink).await);

    assert_eq!(sink.samples.lock().await.len(), 1);
    assert_eq!(*sink.failures.lock().await, vec![FailureKind::Protocol]);
    assert_eq!(remote.fetches(), 2);
}

#[test]
fn zero_interval_falls_back_to_default() {
    let remote = Arc::new(ScriptedRemote::new([]));
    let poller = StatusPoller::new(remote, Duration::ZERO);
    assert_eq!(poller.interval(), DEFAULT_POLL_INTERVAL);
}

#[tokio::test]
async fn spawned_poller_delivers_samples_in_request_order() {
    let remote = Arc::new(ScriptedRemote::new([
        Scripted::Sample(sample(Mode::Explore, 1)),
        Scripted::Sample(sample(Mode::Explore, 2)),
        Scripted::Sample(sample(Mode::Return, 2)),
    ]));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = StatusPoller::new(remote.clone(), Duration::from_millis(10))
        .spawn(Arc::new(ChannelSink(tx)));

    let mut received = Vec::new();
    while received.len() < 3 {
        let next = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("sample before timeout")
            .expect("channel open");
        received.push((next.mode, next.landmark_count));
    }
    assert_eq!(
        received,
        vec![(Mode::Explore, 1), (Mode::Explore, 2), (Mode::Return, 2)]
    );

    handle.shutdown().await;
}

#[tokio::test]
async fn first_request_waits_one_interval() {
    let remote = Arc::new(ScriptedRemote::new([Scripted::Sample(sample(
        Mode::Explore,
        0,
    ))]));
    let handle = StatusPoller::new(remote.clone(), Duration::from_secs(60))
        .spawn(Arc::new(RecordingSink::default()));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(remote.fetches(), 0);
    handle.shutdown().await;
}

#[tokio::test]
async fn shutdown_cancels_the_timer() {
    let remote = Arc::new(ScriptedRemote::new([Scripted::Sample(sample(
        Mode::Explore,
        0,
    ))]));
    let handle = StatusPoller::new(remote.clone(), Duration::from_millis(5))
        .spawn(Arc::new(RecordingSink::default()));

    tokio::time::sleep(Duration::from_millis(40)).await;
    handle.shutdown().await;
    let fetched = remote.fetches();
    assert!(fetched > 0);

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(remote.fetches(), fetched);
}

#[tokio::test]
async fn dropping_the_handle_cancels_the_timer() {
    let remote = Arc::new(ScriptedRemote::new([Scripted::Sample(sample(
        Mode::Explore,
        0,
    ))]));
    let handle = StatusPoller::new(remote.clone(), Duration::from_millis(5))
        .spawn(Arc::new(RecordingSink::default()));
    drop(handle);

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(remote.fetches(), 0);
}
