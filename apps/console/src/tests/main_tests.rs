use std::sync::Mutex;

use async_trait::async_trait;
use console_core::{ConsoleError, RemoteController, SessionOptions};
use shared::{domain::Mode, protocol::StatusSample};
use tokio::sync::oneshot;

use super::*;

const FEED: &str = "http://robot.local:8000/video_feed";

#[derive(Default)]
struct SteadyRemote {
    mode_requests: Mutex<Vec<Mode>>,
}

#[async_trait]
impl RemoteController for SteadyRemote {
    async fn fetch_status(&self) -> Result<StatusSample, ConsoleError> {
        Ok(StatusSample {
            status: "EXPLORATION MODE ACTIVE".into(),
            landmark_count: 2,
            ..StatusSample::default()
        })
    }

    async fn set_mode(&self, mode: Mode) -> Result<(), ConsoleError> {
        self.mode_requests.lock().expect("requests lock").push(mode);
        Ok(())
    }
}

fn session_with(remote: Arc<SteadyRemote>) -> Arc<ConsoleSession> {
    ConsoleSession::new(
        remote,
        SessionOptions {
            poll_interval: Duration::from_millis(10),
            link_loss_threshold: 3,
        },
    )
}

#[tokio::test]
async fn closed_stdin_keeps_console_running_until_shutdown() {
    let session = session_with(Arc::new(SteadyRemote::default()));
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let task = tokio::spawn({
        let session = Arc::clone(&session);
        async move {
            let shutdown = async {
                let _ = stop_rx.await;
            };
            run_console(&session, FEED, &b""[..], shutdown).await
        }
    });

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!task.is_finished());
    assert!(session.is_running().await);
    assert_eq!(session.snapshot().await.timeline().len(), 2);

    stop_tx.send(()).expect("console still listening");
    task.await.expect("join").expect("clean exit");
    assert!(!session.is_running().await);
}

#[tokio::test]
async fn toggle_then_quit_sends_one_request_and_stops() {
    let remote = Arc::new(SteadyRemote::default());
    let session = session_with(Arc::clone(&remote));

    tokio::time::timeout(
        Duration::from_secs(5),
        run_console(&session, FEED, &b"t\nq\n"[..], std::future::pending::<()>()),
    )
    .await
    .expect("quit before timeout")
    .expect("clean exit");
    assert!(!session.is_running().await);

    for _ in 0..100 {
        if !remote.mode_requests.lock().expect("requests lock").is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(
        *remote.mode_requests.lock().expect("requests lock"),
        vec![Mode::Return]
    );
}
