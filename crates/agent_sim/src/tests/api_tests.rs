use super::*;
use axum::{body, http::Request};
use tower::ServiceExt;

use crate::led::LoggingLed;

fn test_app() -> (Router, Arc<Mutex<SimulatedAgent>>) {
    let agent = Arc::new(Mutex::new(SimulatedAgent::new(
        CameraSource::Device(0),
        Duration::from_millis(2500),
        Arc::new(LoggingLed),
    )));
    let app = build_router(AppState {
        agent: Arc::clone(&agent),
        frame_interval: Duration::from_millis(20),
    });
    (app, agent)
}

async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (app, _agent) = test_app();
    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn status_route_serves_wire_fields() {
    let (app, _agent) = test_app();
    let response = app
        .oneshot(Request::get("/status").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let raw: serde_json::Value = json_body(response).await;
    assert_eq!(raw["mode"], "EXPLORE");
    assert_eq!(raw["status"], "SYSTEM INITIALIZING");
    assert_eq!(raw["landmark_count"], 0);
    assert_eq!(raw["best_match"], -1);
    assert_eq!(raw["camera_source"], "Webcam");
}

#[tokio::test]
async fn set_mode_switches_agent() {
    let (app, agent) = test_app();
    let response = app
        .oneshot(
            Request::post("/set_mode/RETURN")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let reply: SetModeResponse = json_body(response).await;
    assert!(reply.success);
    assert_eq!(reply.mode, Some(Mode::Return));
    assert_eq!(agent.lock().await.mode(), Mode::Return);
}

#[tokio::test]
async fn unknown_mode_is_refused_with_ok_status() {
    let (app, agent) = test_app();
    let response = app
        .oneshot(
            Request::post("/set_mode/HOVER")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let reply: SetModeResponse = json_body(response).await;
    assert!(!reply.success);
    assert_eq!(reply.error.as_deref(), Some("Invalid mode"));
    assert_eq!(agent.lock().await.mode(), Mode::Explore);
}

#[tokio::test]
async fn update_source_replaces_camera() {
    let (app, agent) = test_app();
    let response = app
        .clone()
        .oneshot(
            Request::post("/update_source?source_url=http://esp32.local/cam")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let reply: UpdateSourceResponse = json_body(response).await;
    assert_eq!(reply.source, "http://esp32.local/cam");
    assert_eq!(
        agent.lock().await.snapshot().camera_source.as_deref(),
        Some("http://esp32.local/cam")
    );

    let empty = app
        .oneshot(
            Request::post("/update_source?source_url=")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn video_feed_streams_multipart_jpeg() {
    let (app, _agent) = test_app();
    let response = app
        .oneshot(Request::get("/video_feed").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "multipart/x-mixed-replace; boundary=frame"
    );

    let mut frames = response.into_body().into_data_stream();
    let first = tokio::time::timeout(Duration::from_secs(5), futures::StreamExt::next(&mut frames))
        .await
        .expect("frame before timeout")
        .expect("stream open")
        .expect("frame bytes");
    assert!(first.starts_with(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n"));
    // JPEG start-of-image marker follows the part header.
    let header_len = "--frame\r\nContent-Type: image/jpeg\r\n\r\n".len();
    assert_eq!(&first[header_len..header_len + 2], &[0xFF, 0xD8]);
}
