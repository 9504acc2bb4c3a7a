//! Append-only transcript log and AI suggestion buffer.
//!
//! Events from the two channels plus locally synthesized system notices are
//! merged in arrival order. The two channels are independent sockets with no
//! shared clock, so a true causal order across them cannot be reconstructed;
//! "mostly chronological, occasionally interleaved by network jitter" is the
//! accepted property. No reordering, no dedup, no mutation after append.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Who produced a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    Advisor,
    Customer,
    System,
}

/// One immutable transcript line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEvent {
    pub timestamp: String,
    pub speaker: Speaker,
    pub text: String,
}

impl TranscriptEvent {
    pub fn new(timestamp: String, speaker: Speaker, text: String) -> Self {
        Self {
            timestamp,
            speaker,
            text,
        }
    }

    /// A locally synthesized system notice, stamped with the current time.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            speaker: Speaker::System,
            text: text.into(),
        }
    }
}

/// The in-memory reconciled log for one session. Append-only.
#[derive(Debug, Default)]
pub struct TranscriptLog {
    entries: Vec<TranscriptEvent>,
}

impl TranscriptLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// O(1) append in arrival order.
    pub fn append(&mut self, event: TranscriptEvent) {
        self.entries.push(event);
    }

    pub fn entries(&self) -> &[TranscriptEvent] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Thread-safe handle sharing one session's log between the session tasks
/// and API handlers.
#[derive(Clone, Default)]
pub struct TranscriptHandle {
    inner: Arc<Mutex<TranscriptLog>>,
}

impl TranscriptHandle {
    pub async fn append(&self, event: TranscriptEvent) {
        self.inner.lock().await.append(event);
    }

    pub async fn append_system(&self, text: impl Into<String>) {
        self.append(TranscriptEvent::system(text)).await;
    }

    pub async fn snapshot(&self) -> Vec<TranscriptEvent> {
        self.inner.lock().await.entries().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Swap in a fresh log. The log's lifetime is exactly one meeting;
    /// this runs only when a new session begins.
    pub async fn reset(&self) {
        *self.inner.lock().await = TranscriptLog::new();
    }
}

/// Concatenated AI assistant deltas for the active prompt.
///
/// Deltas arrive in order on one channel and are appended as received; a new
/// user-initiated prompt resets the buffer before its first delta lands.
#[derive(Debug, Default)]
pub struct SuggestionBuffer {
    text: String,
}

impl SuggestionBuffer {
    pub fn push_delta(&mut self, delta: &str) {
        self.text.push_str(delta);
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Thread-safe handle to the suggestion buffer.
#[derive(Clone, Default)]
pub struct SuggestionHandle {
    inner: Arc<Mutex<SuggestionBuffer>>,
}

impl SuggestionHandle {
    pub async fn push_delta(&self, delta: &str) {
        self.inner.lock().await.push_delta(delta);
    }

    pub async fn reset(&self) {
        self.inner.lock().await.clear();
    }

    pub async fn text(&self) -> String {
        self.inner.lock().await.as_str().to_string()
    }
}
