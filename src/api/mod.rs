//! Loopback control API for meetpilot.
//!
//! Provides HTTP endpoints for:
//! - Meeting lifecycle control (start, end, status)
//! - One-shot assistant prompts
//! - Reading the reconciled transcript

pub mod error;
pub mod routes;

use crate::config::Config;
use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tracing::info;

pub use error::{ApiError, ApiResult};
pub use routes::meeting::{ApiCommand, AskRequest, MeetingApiState, StartMeetingRequest};

pub struct ApiServer {
    port: u16,
    meeting_state: MeetingApiState,
}

impl ApiServer {
    pub fn new(
        tx: tokio::sync::mpsc::Sender<ApiCommand>,
        status: crate::session::SessionStatusHandle,
        transcript: crate::transcript::TranscriptHandle,
        suggestions: crate::transcript::SuggestionHandle,
        config: &Config,
    ) -> Self {
        Self {
            port: config.api.port,
            meeting_state: MeetingApiState {
                tx,
                status,
                transcript,
                suggestions,
            },
        }
    }

    pub async fn start(self) -> Result<()> {
        let app = Router::new()
            .route("/", get(status))
            .route("/version", get(version))
            .merge(routes::meeting::router(self.meeting_state))
            .layer(ServiceBuilder::new());

        let listener = tokio::net::TcpListener::bind(&format!("127.0.0.1:{}", self.port)).await?;

        info!("API server listening on http://127.0.0.1:{}", self.port);
        info!("Endpoints:");
        info!("  GET  /                    - Service info");
        info!("  GET  /version             - Version info");
        info!("  POST /meeting/start       - Start a meeting (consent required)");
        info!("  POST /meeting/end         - End the live meeting");
        info!("  POST /meeting/ask         - Submit a one-shot assistant prompt");
        info!("  GET  /meeting/status      - Session status");
        info!("  GET  /meeting/transcript  - Reconciled transcript and suggestion");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn status() -> Json<Value> {
    Json(json!({
        "service": "meetpilot",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": "meetpilot"
    }))
}
