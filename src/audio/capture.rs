//! Paired acquisition and release of the two meeting capture sources.
//!
//! The adapter owns both sources for the lifetime of one session. Acquisition
//! is all-or-nothing: if the microphone grant fails after system audio was
//! already acquired, the system source is stopped before the error surfaces,
//! so no half-open capture session is ever left running.

use tokio::sync::mpsc;
use tracing::info;

use crate::error::MeetingResult;

use super::source::{AudioFrame, CaptureSource};

/// Live frame receivers for an acquired capture pair.
#[derive(Debug)]
pub struct CaptureStreams {
    pub mic: mpsc::Receiver<AudioFrame>,
    pub system: mpsc::Receiver<AudioFrame>,
}

pub struct CaptureAdapter {
    mic: Box<dyn CaptureSource>,
    system: Box<dyn CaptureSource>,
}

impl CaptureAdapter {
    pub fn new(mic: Box<dyn CaptureSource>, system: Box<dyn CaptureSource>) -> Self {
        Self { mic, system }
    }

    /// Acquire both sources, system audio first.
    ///
    /// System audio is the stricter grant (it may simply not exist on the
    /// host), so it is requested before the microphone. Fails with
    /// `DeviceUnavailable` when no system audio track can be produced and
    /// `PermissionDenied` when a grant is declined; on any failure every
    /// source acquired so far is released.
    pub fn acquire(&mut self) -> MeetingResult<CaptureStreams> {
        let system = self.system.start()?;

        let mic = match self.mic.start() {
            Ok(rx) => rx,
            Err(e) => {
                self.system.stop();
                return Err(e);
            }
        };

        info!(
            "Capture sources acquired (mic {}Hz, system {}Hz)",
            self.mic.sample_rate(),
            self.system.sample_rate()
        );

        Ok(CaptureStreams { mic, system })
    }

    /// Stop every track on both sources. Idempotent: safe to call once from
    /// an explicit end-meeting action and again during cleanup.
    pub fn release(&mut self) {
        self.mic.stop();
        self.system.stop();
    }

    pub fn is_active(&self) -> bool {
        self.mic.is_active() || self.system.is_active()
    }
}
