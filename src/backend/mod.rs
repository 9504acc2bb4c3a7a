//! Backend collaborator contracts.
//!
//! The transcription backend is a black box from the pipeline's point of
//! view: bootstrap a meeting, summarize a transcript, extract insights.
//! Only the boundary is specified here; the HTTP implementation lives in
//! `client` and tests substitute their own.

pub mod client;

use anyhow::Result;
use async_trait::async_trait;

use crate::transcript::TranscriptEvent;

pub use client::HttpBackendClient;

/// Identity triple correlating backend calls for one session.
#[derive(Debug, Clone)]
pub struct SessionIds {
    pub user_id: String,
    pub client_id: String,
    pub session_id: String,
}

impl SessionIds {
    /// The wire convention for in-meeting calls keys everything by the
    /// meeting id itself.
    pub fn for_meeting(meeting_id: &str) -> Self {
        Self {
            user_id: meeting_id.to_string(),
            client_id: meeting_id.to_string(),
            session_id: meeting_id.to_string(),
        }
    }

    /// Insight extraction is keyed by the advisor's account id instead.
    pub fn for_advisor(advisor_id: &str, meeting_id: &str) -> Self {
        Self {
            user_id: advisor_id.to_string(),
            client_id: meeting_id.to_string(),
            session_id: meeting_id.to_string(),
        }
    }

    pub fn query_string(&self) -> String {
        format!(
            "userId={}&clientId={}&sessionId={}",
            self.user_id, self.client_id, self.session_id
        )
    }
}

/// Boundary to the meeting backend.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Start a meeting for an advisor/contact pair; returns the opaque
    /// session identifier that correlates all subsequent calls.
    async fn start_meeting(&self, advisor_id: &str, contact_id: &str) -> Result<String>;

    /// Request a summary of the reconciled transcript. Ok/err only;
    /// the summary itself is delivered out of band.
    async fn summarize(&self, ids: &SessionIds, transcript: &[TranscriptEvent]) -> Result<()>;

    /// Request the end-of-meeting insight/extraction job. Ok/err only.
    async fn extract_insights(&self, ids: &SessionIds) -> Result<()>;
}
