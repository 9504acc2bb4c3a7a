//! Service wiring: configuration, the control API, and the session
//! supervisor loop.
//!
//! The supervisor owns at most one `MeetingSession` at a time. Commands
//! arrive from the API over a channel and are processed sequentially, so
//! two sessions can never run concurrently in one service instance.

use crate::api::{ApiCommand, ApiServer};
use crate::audio::{CaptureAdapter, MicSource, SystemMonitorSource};
use crate::backend::{BackendClient, HttpBackendClient};
use crate::channel::PlanTier;
use crate::config::Config;
use crate::error::{MeetingError, MeetingResult};
use crate::session::{MeetingSession, SessionConfig, SessionStatusHandle, StartOptions};
use crate::transcript::{SuggestionHandle, TranscriptHandle};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn run_service() -> Result<()> {
    info!("Starting meetpilot service");

    let config = Config::load()?;

    let (tx, mut rx) = mpsc::channel::<ApiCommand>(10);
    let status = SessionStatusHandle::default();
    let transcript = TranscriptHandle::default();
    let suggestions = SuggestionHandle::default();

    let backend: Arc<dyn BackendClient> = Arc::new(HttpBackendClient::new(
        &config.backend.http_base,
        config.backend.auth_token.clone(),
    ));

    let api_server = ApiServer::new(
        tx,
        status.clone(),
        transcript.clone(),
        suggestions.clone(),
        &config,
    );
    tokio::spawn(async move {
        if let Err(e) = api_server.start().await {
            error!("API server failed: {}", e);
        }
    });

    info!("meetpilot is ready");
    info!(
        "Start a meeting with: curl -X POST http://127.0.0.1:{}/meeting/start \
         -H 'Content-Type: application/json' \
         -d '{{\"contact_id\":\"...\",\"consent\":true}}'",
        config.api.port
    );

    let mut session: Option<MeetingSession> = None;

    while let Some(command) = rx.recv().await {
        match command {
            ApiCommand::Start { options, respond } => {
                let result = start_session(
                    &mut session,
                    &config,
                    backend.clone(),
                    transcript.clone(),
                    suggestions.clone(),
                    status.clone(),
                    options,
                )
                .await;

                if let Err(e) = &result {
                    error!("Failed to start meeting: {}", e);
                    status.record_error(e.to_string()).await;
                }
                let _ = respond.send(result);
            }
            ApiCommand::End { respond } => {
                let result = match session.as_mut() {
                    Some(live) => live.end().await,
                    None => Err(MeetingError::NotLive),
                };

                if let Err(e) = &result {
                    error!("Failed to end meeting: {}", e);
                }
                let _ = respond.send(result);
            }
            ApiCommand::Ask { prompt, respond } => {
                let result = match session.as_mut() {
                    Some(live) => live.ask(&prompt).await,
                    None => Err(MeetingError::NotLive),
                };

                if let Err(e) = &result {
                    error!("Assistant prompt failed: {}", e);
                }
                let _ = respond.send(result);
            }
        }
    }

    Ok(())
}

/// Build and start a fresh session, replacing any ended one.
async fn start_session(
    slot: &mut Option<MeetingSession>,
    config: &Config,
    backend: Arc<dyn BackendClient>,
    transcript: TranscriptHandle,
    suggestions: SuggestionHandle,
    status: SessionStatusHandle,
    options: StartOptions,
) -> MeetingResult<()> {
    if slot.as_ref().is_some_and(|s| s.is_live()) {
        return Err(MeetingError::AlreadyLive);
    }

    let capture = CaptureAdapter::new(
        Box::new(MicSource::new(
            config.audio.sample_rate,
            config.audio.frame_samples,
        )),
        Box::new(SystemMonitorSource::new(
            config.audio.sample_rate,
            config.audio.frame_samples,
        )),
    );

    let advisor_id = if config.advisor.advisor_id.is_empty() {
        // The bootstrap contract needs an advisor identity; an unset config
        // gets a generated one so local setups still work.
        let generated = uuid::Uuid::new_v4().to_string();
        warn!("advisor_id is not configured, using generated id {}", generated);
        generated
    } else {
        config.advisor.advisor_id.clone()
    };

    let session_config = SessionConfig {
        advisor_id,
        plan: PlanTier::from_name(&config.advisor.plan),
        ws_base: config.backend.ws_base.clone(),
    };

    let mut fresh = MeetingSession::new(
        session_config,
        backend,
        capture,
        transcript,
        suggestions,
        status,
    );
    fresh.start(options).await?;

    *slot = Some(fresh);
    Ok(())
}
