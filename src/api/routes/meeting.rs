//! Meeting control API endpoints.
//!
//! Provides HTTP endpoints for:
//! - Starting a meeting (POST /meeting/start, consent required)
//! - Ending a meeting (POST /meeting/end)
//! - One-shot assistant prompts (POST /meeting/ask)
//! - Session status (GET /meeting/status)
//! - The reconciled transcript and suggestion buffer (GET /meeting/transcript)

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tracing::info;

use crate::error::MeetingResult;
use crate::session::{SessionStatusHandle, StartOptions};
use crate::transcript::{SuggestionHandle, TranscriptHandle};

use crate::api::error::{ApiError, ApiResult};

/// Commands the API sends into the session supervisor loop. Each carries a
/// responder so the caller sees the real outcome instead of a guess.
pub enum ApiCommand {
    Start {
        options: StartOptions,
        respond: oneshot::Sender<MeetingResult<()>>,
    },
    End {
        respond: oneshot::Sender<MeetingResult<()>>,
    },
    Ask {
        prompt: String,
        respond: oneshot::Sender<MeetingResult<()>>,
    },
}

/// Shared state for meeting routes.
#[derive(Clone)]
pub struct MeetingApiState {
    pub tx: mpsc::Sender<ApiCommand>,
    pub status: SessionStatusHandle,
    pub transcript: TranscriptHandle,
    pub suggestions: SuggestionHandle,
}

/// Request body for the start endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct StartMeetingRequest {
    pub contact_id: String,
    /// The recording disclosure must be acknowledged explicitly.
    #[serde(default)]
    pub consent: bool,
}

/// Request body for the ask endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct AskRequest {
    pub prompt: String,
}

pub fn router(state: MeetingApiState) -> Router {
    Router::new()
        .route("/meeting/start", post(start_meeting))
        .route("/meeting/end", post(end_meeting))
        .route("/meeting/ask", post(ask_assistant))
        .route("/meeting/status", get(meeting_status))
        .route("/meeting/transcript", get(meeting_transcript))
        .with_state(state)
}

async fn dispatch(
    tx: &mpsc::Sender<ApiCommand>,
    build: impl FnOnce(oneshot::Sender<MeetingResult<()>>) -> ApiCommand,
) -> ApiResult<()> {
    let (respond, rx) = oneshot::channel();
    tx.send(build(respond))
        .await
        .map_err(|_| ApiError::internal("session supervisor is not running"))?;

    match rx.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ApiError::from(e)),
        Err(_) => Err(ApiError::internal("session supervisor dropped the request")),
    }
}

async fn start_meeting(
    State(state): State<MeetingApiState>,
    Json(request): Json<StartMeetingRequest>,
) -> ApiResult<Json<Value>> {
    info!("Meeting start command received via API");

    let options = StartOptions {
        contact_id: request.contact_id,
        consent_acknowledged: request.consent,
    };

    dispatch(&state.tx, |respond| ApiCommand::Start { options, respond }).await?;

    let status = state.status.get().await;
    Ok(Json(json!({
        "success": true,
        "meeting_id": status.meeting_id,
        "phase": status.phase.as_str(),
        "message": "Meeting started",
    })))
}

async fn end_meeting(State(state): State<MeetingApiState>) -> ApiResult<Json<Value>> {
    info!("Meeting end command received via API");

    dispatch(&state.tx, |respond| ApiCommand::End { respond }).await?;

    let status = state.status.get().await;
    Ok(Json(json!({
        "success": true,
        "meeting_id": status.meeting_id,
        "phase": status.phase.as_str(),
        "duration_seconds": status.duration_seconds(),
        "message": "Meeting ended",
    })))
}

async fn ask_assistant(
    State(state): State<MeetingApiState>,
    Json(request): Json<AskRequest>,
) -> ApiResult<Json<Value>> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("prompt must not be empty"));
    }

    dispatch(&state.tx, |respond| ApiCommand::Ask {
        prompt: request.prompt,
        respond,
    })
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Prompt submitted",
    })))
}

async fn meeting_status(State(state): State<MeetingApiState>) -> Json<Value> {
    let status = state.status.get().await;

    Json(json!({
        "phase": status.phase.as_str(),
        "meeting_id": status.meeting_id,
        "contact_id": status.contact_id,
        "plan": status.plan.map(|p| p.as_str()),
        "duration_seconds": status.duration_seconds(),
        "last_error": status.last_error,
    }))
}

async fn meeting_transcript(State(state): State<MeetingApiState>) -> Json<Value> {
    let transcript = state.transcript.snapshot().await;
    let suggestion = state.suggestions.text().await;

    Json(json!({
        "transcript": transcript,
        "suggestion": suggestion,
    }))
}
