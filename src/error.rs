//! Error taxonomy for the meeting pipeline.
//!
//! Capture-acquisition errors abort session start entirely. Mid-session
//! channel errors degrade the session until the operator ends it. Post-session
//! enrichment errors are recorded in the transcript and never propagate.

use thiserror::Error;

use crate::channel::ChannelKind;

#[derive(Debug, Error)]
pub enum MeetingError {
    /// The user or OS declined a capture grant.
    #[error("{device} capture permission denied: {reason}")]
    PermissionDenied { device: &'static str, reason: String },

    /// The system/display capture produced no usable audio track.
    #[error("no system audio track available: {0}")]
    DeviceUnavailable(String),

    /// A channel never reached the Open state.
    #[error("failed to open {kind} channel: {reason}")]
    ChannelOpenFailed { kind: ChannelKind, reason: String },

    /// A channel failed mid-session. Not retried; the session is degraded
    /// until the operator explicitly ends it.
    #[error("{kind} channel transport error: {reason}")]
    ChannelTransport { kind: ChannelKind, reason: String },

    /// The end-of-meeting summary request failed.
    #[error("transcript summarization failed: {0}")]
    SummarizationFailed(String),

    /// The end-of-meeting insight extraction request failed.
    #[error("insight extraction failed: {0}")]
    ExtractionFailed(String),

    /// The backend did not hand out a meeting session id.
    #[error("meeting bootstrap failed: {0}")]
    BootstrapFailed(String),

    /// Recording consent was not acknowledged before start.
    #[error("recording consent must be acknowledged before a meeting can start")]
    ConsentRequired,

    /// The assistant is not included in the active plan.
    #[error("AI assistant is not available on the {0} plan")]
    AssistantLocked(String),

    /// A second session was requested while one is live.
    #[error("a meeting is already live")]
    AlreadyLive,

    /// A live-only operation was requested outside a live session.
    #[error("no meeting is currently live")]
    NotLive,

    /// A session object was asked to start again after it ended.
    /// Sessions live for exactly one meeting; ended ones are replaced.
    #[error("this session has already ended")]
    SessionEnded,
}

pub type MeetingResult<T> = Result<T, MeetingError>;
