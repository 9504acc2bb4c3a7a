//! HTTP client for the meeting backend.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::transcript::TranscriptEvent;

use super::{BackendClient, SessionIds};

/// Client for the meeting backend's HTTP surface.
pub struct HttpBackendClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

/// Response from starting a meeting.
#[derive(Debug, Deserialize)]
struct StartMeetingResponse {
    #[serde(rename = "meetingId")]
    meeting_id: String,
}

impl HttpBackendClient {
    /// Create a new client with the given base URL.
    pub fn new(base_url: &str, auth_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        }
    }
}

#[async_trait]
impl BackendClient for HttpBackendClient {
    async fn start_meeting(&self, advisor_id: &str, contact_id: &str) -> Result<String> {
        let url = format!("{}/meetings/start", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "advisorId": advisor_id,
                "contactId": contact_id,
            }))
            .send()
            .await
            .context("Failed to reach meeting bootstrap endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Meeting bootstrap failed ({}): {}", status, body);
        }

        let parsed: StartMeetingResponse = response
            .json()
            .await
            .context("Meeting bootstrap returned an unreadable body")?;

        info!("Meeting bootstrapped: {}", parsed.meeting_id);
        Ok(parsed.meeting_id)
    }

    async fn summarize(&self, ids: &SessionIds, transcript: &[TranscriptEvent]) -> Result<()> {
        let url = format!("{}/summarize?{}", self.base_url, ids.query_string());

        let messages: Vec<_> = transcript
            .iter()
            .map(|t| json!({ "speaker": t.speaker, "text": t.text }))
            .collect();

        let response = self
            .client
            .post(&url)
            .json(&json!({ "messages": messages }))
            .send()
            .await
            .context("Failed to reach summarization endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Summarization failed ({}): {}", status, body);
        }

        info!("Transcript summary requested ({} messages)", messages.len());
        Ok(())
    }

    async fn extract_insights(&self, ids: &SessionIds) -> Result<()> {
        let url = format!("{}/meetings/end?{}", self.base_url, ids.query_string());

        let mut request = self.client.post(&url).json(&json!({}));
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Failed to reach insight extraction endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Insight extraction failed ({}): {}", status, body);
        }

        info!("Insight extraction requested for session {}", ids.session_id);
        Ok(())
    }
}
