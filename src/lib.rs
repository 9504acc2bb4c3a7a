pub mod api;
pub mod app;
pub mod audio;
pub mod backend;
pub mod channel;
pub mod cli;
pub mod config;
pub mod error;
pub mod session;
pub mod transcript;

pub use audio::{
    AudioFrame, CaptureAdapter, CaptureSource, CaptureStreams, MicSource, SystemMonitorSource,
};
pub use backend::{BackendClient, HttpBackendClient, SessionIds};
pub use channel::{
    ChannelConfig, ChannelEvent, ChannelKind, ChannelPath, ChannelState, DuplexChannel, PlanTier,
};
pub use config::Config;
pub use error::{MeetingError, MeetingResult};
pub use session::{
    MeetingSession, SessionConfig, SessionPhase, SessionState, SessionStatusHandle, StartOptions,
};
pub use transcript::{
    Speaker, SuggestionHandle, TranscriptEvent, TranscriptHandle, TranscriptLog,
};
