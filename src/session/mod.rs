pub mod controller;
pub mod status;

pub use controller::{MeetingSession, SessionConfig, StartOptions};
pub use status::{SessionPhase, SessionState, SessionStatusHandle};
