//! Capture source abstraction for the live meeting pipeline.

use tokio::sync::mpsc;

use crate::error::MeetingResult;

/// Frames buffered between the capture callback and the pump task.
/// Live audio is lossy; when the pump falls behind, frames are dropped.
pub const FRAME_CHANNEL_CAPACITY: usize = 16;

/// One fixed-size block of mono float samples produced by a capture tick.
///
/// Transient: produced inside the capture callback, consumed by the pump
/// task within one tick, never persisted.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub samples: Vec<f32>,
}

/// A stoppable, revocable audio capture source (microphone or system audio).
///
/// `start` hands back a frame receiver; frames keep arriving until `stop`.
/// `stop` is best-effort and idempotent. It must be safe to call from an
/// explicit end-meeting action and again during cleanup without panicking.
pub trait CaptureSource {
    fn start(&mut self) -> MeetingResult<mpsc::Receiver<AudioFrame>>;

    fn stop(&mut self);

    fn is_active(&self) -> bool;

    fn sample_rate(&self) -> u32;
}

/// Accumulates raw callback buffers into fixed-size frames.
///
/// cpal hands the callback whatever buffer size the device driver picked;
/// the wire protocol wants uniform blocks. Leftover samples stay buffered
/// for the next callback.
pub struct FrameChunker {
    frame_samples: usize,
    buf: Vec<f32>,
}

impl FrameChunker {
    pub fn new(frame_samples: usize) -> Self {
        Self {
            frame_samples,
            buf: Vec::with_capacity(frame_samples * 2),
        }
    }

    /// Feed raw samples, invoking `emit` once per completed frame.
    pub fn push(&mut self, data: &[f32], mut emit: impl FnMut(AudioFrame)) {
        self.buf.extend_from_slice(data);
        while self.buf.len() >= self.frame_samples {
            let rest = self.buf.split_off(self.frame_samples);
            let samples = std::mem::replace(&mut self.buf, rest);
            emit(AudioFrame { samples });
        }
    }
}
