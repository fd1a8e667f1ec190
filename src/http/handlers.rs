use super::state::AppState;
use crate::capture::LoopState;
use crate::session::SessionSnapshot;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub state: LoopState,
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub command: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /capture/start
/// Activate the capture loop. The gate is single-use: only the first call
/// starts it.
pub async fn start_capture(State(state): State<AppState>) -> impl IntoResponse {
    if state.capture.start().await {
        info!("capture loop activated");
        (
            StatusCode::OK,
            Json(CaptureResponse {
                status: "listening".to_string(),
                message: "Voice control activated".to_string(),
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "Voice capture is already active".to_string(),
            }),
        )
            .into_response()
    }
}

/// POST /capture/stop
/// Request a stop; the loop exits before its next restart.
pub async fn stop_capture(State(state): State<AppState>) -> impl IntoResponse {
    state.capture.stop().await;
    (
        StatusCode::OK,
        Json(CaptureResponse {
            status: "stopping".to_string(),
            message: "Voice capture will stop before the next restart".to_string(),
        }),
    )
}

/// GET /status
/// Latest status line and capture loop state.
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.bridge.status_line().await;
    let loop_state = state.capture.state().await;
    (
        StatusCode::OK,
        Json(StatusResponse {
            status,
            state: loop_state,
        }),
    )
}

/// GET /session
/// Session state snapshot.
pub async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot: SessionSnapshot = state.session.lock().await.snapshot();
    (StatusCode::OK, Json(snapshot))
}

/// POST /command
/// Feed a typed utterance through the same interpret → dispatch path the
/// capture loop uses.
pub async fn post_command(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> impl IntoResponse {
    let text = req.text.trim().to_string();
    if text.chars().count() < 2 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Command text must be at least two characters".to_string(),
            }),
        )
            .into_response();
    }

    info!("typed command: {text}");
    let intent = state.interpreter.interpret(&text).await;
    let command = intent.tag().to_string();
    state.dispatcher.dispatch(intent).await;

    (
        StatusCode::OK,
        Json(CommandResponse {
            command,
            status: "dispatched".to_string(),
        }),
    )
        .into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
