//! Session status types and shared state handle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::channel::PlanTier;

/// Phase of the meeting session lifecycle.
///
/// Transitions are driven by explicit operator actions only: Idle -> Live
/// on a consented start, Live -> Ended on end. Ended is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Live,
    Ended,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Live => "live",
            Self::Ended => "ended",
        }
    }
}

/// Current session state, readable by API handlers.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub meeting_id: Option<String>,
    pub contact_id: Option<String>,
    pub plan: Option<PlanTier>,
    pub started_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            meeting_id: None,
            contact_id: None,
            plan: None,
            started_at: None,
            last_error: None,
        }
    }
}

impl SessionState {
    /// Duration since the meeting went live, in seconds.
    pub fn duration_seconds(&self) -> Option<u64> {
        self.started_at.map(|started| {
            let elapsed = Utc::now() - started;
            elapsed.num_seconds().max(0) as u64
        })
    }
}

/// Thread-safe handle for sharing session state between the session
/// controller and API handlers.
#[derive(Clone, Default)]
pub struct SessionStatusHandle {
    inner: Arc<Mutex<SessionState>>,
}

impl SessionStatusHandle {
    pub async fn get(&self) -> SessionState {
        self.inner.lock().await.clone()
    }

    pub async fn set_live(&self, meeting_id: String, contact_id: String, plan: PlanTier) {
        let mut state = self.inner.lock().await;
        state.phase = SessionPhase::Live;
        state.meeting_id = Some(meeting_id);
        state.contact_id = Some(contact_id);
        state.plan = Some(plan);
        state.started_at = Some(Utc::now());
        state.last_error = None;
    }

    pub async fn set_ended(&self) {
        let mut state = self.inner.lock().await;
        state.phase = SessionPhase::Ended;
    }

    /// Record an error without forging a phase change; the phase always
    /// reflects what the pipeline is actually doing.
    pub async fn record_error(&self, error: String) {
        let mut state = self.inner.lock().await;
        state.last_error = Some(error);
    }
}
