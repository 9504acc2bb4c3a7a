pub mod capture;
pub mod mic_source;
pub mod pcm;
pub mod source;
pub mod system_source;

pub use capture::{CaptureAdapter, CaptureStreams};
pub use mic_source::MicSource;
pub use source::{AudioFrame, CaptureSource, FrameChunker};
pub use system_source::SystemMonitorSource;
