use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::Mode,
    error::ApiError,
    protocol::{SetModeResponse, StatusSample, UpdateSourceQuery, UpdateSourceResponse},
};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::{
    agent::{CameraSource, SimulatedAgent},
    feed,
};

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Mutex<SimulatedAgent>>,
    pub frame_interval: Duration,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/status", get(status))
        .route("/set_mode/:mode", post(set_mode))
        .route("/video_feed", get(video_feed))
        .route("/update_source", post(update_source))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn status(State(state): State<AppState>) -> Json<StatusSample> {
    Json(state.agent.lock().await.snapshot())
}

/// Unknown modes are answered with `200 {"success": false}` for wire compatibility.
async fn set_mode(State(state): State<AppState>, Path(raw): Path<String>) -> Json<SetModeResponse> {
    match raw.parse::<Mode>() {
        Ok(mode) => {
            state.agent.lock().await.set_mode(mode);
            Json(SetModeResponse {
                success: true,
                mode: Some(mode),
                error: None,
            })
        }
        Err(err) => {
            warn!(%err, "api: rejected mode switch");
            Json(SetModeResponse {
                success: false,
                mode: None,
                error: Some("Invalid mode".to_string()),
            })
        }
    }
}

async fn video_feed(State(state): State<AppState>) -> Response {
    let stream = feed::frame_stream(Arc::clone(&state.agent), state.frame_interval);
    ([(header::CONTENT_TYPE, feed::content_type())], Body::from_stream(stream)).into_response()
}

async fn update_source(
    State(state): State<AppState>,
    Query(query): Query<UpdateSourceQuery>,
) -> Result<Json<UpdateSourceResponse>, (StatusCode, Json<ApiError>)> {
    let source_url = query.source_url.trim();
    if source_url.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::validation("source_url must not be empty")),
        ));
    }

    state
        .agent
        .lock()
        .await
        .set_camera_source(CameraSource::parse(source_url));
    Ok(Json(UpdateSourceResponse {
        success: true,
        source: source_url.to_string(),
    }))
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
