//! Microphone audio capture via cpal.
//!
//! Streams fixed-size frames through a bounded channel as they are
//! produced, rather than accumulating until stop. The meeting pipeline
//! encodes and transmits each frame within its capture tick.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::{MeetingError, MeetingResult};

use super::source::{AudioFrame, CaptureSource, FrameChunker, FRAME_CHANNEL_CAPACITY};

pub struct MicSource {
    stream: Option<cpal::Stream>,
    active: bool,
    sample_rate: u32,
    frame_samples: usize,
}

impl MicSource {
    /// Create a mic source targeting the default input device.
    ///
    /// # Arguments
    /// * `sample_rate` - Capture rate in Hz (16000 for the wire protocol)
    /// * `frame_samples` - Samples per emitted frame
    pub fn new(sample_rate: u32, frame_samples: usize) -> Self {
        Self {
            stream: None,
            active: false,
            sample_rate,
            frame_samples,
        }
    }
}

impl CaptureSource for MicSource {
    fn start(&mut self) -> MeetingResult<mpsc::Receiver<AudioFrame>> {
        if self.active {
            return Err(MeetingError::PermissionDenied {
                device: "microphone",
                reason: "already capturing".to_string(),
            });
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| MeetingError::PermissionDenied {
                device: "microphone",
                reason: "no input device available".to_string(),
            })?;

        info!(
            "Meeting mic source using device: {}",
            device.name().unwrap_or_else(|_| "unknown".to_string())
        );

        let config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let chunker = Arc::new(Mutex::new(FrameChunker::new(self.frame_samples)));
        let err_fn = |err| error!("Meeting mic stream error: {}", err);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut chunker) = chunker.lock() {
                        chunker.push(data, |frame| {
                            // Drop the frame if the pump is behind; stale
                            // live audio has no replay value.
                            let _ = tx.try_send(frame);
                        });
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| MeetingError::PermissionDenied {
                device: "microphone",
                reason: e.to_string(),
            })?;

        stream.play().map_err(|e| MeetingError::PermissionDenied {
            device: "microphone",
            reason: e.to_string(),
        })?;

        self.stream = Some(stream);
        self.active = true;

        info!("Meeting mic capture started");
        Ok(rx)
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            debug!("Stopping meeting mic stream");
            drop(stream);
        }
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for MicSource {
    fn drop(&mut self) {
        if self.active {
            debug!("Dropping active MicSource, cleaning up");
            self.stop();
        }
    }
}
