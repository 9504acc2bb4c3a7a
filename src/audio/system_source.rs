//! System audio capture (what the customer says on Zoom/Meet/etc.).
//!
//! Captures audio from PipeWire/PulseAudio monitor sources, which represent
//! the system's audio output (speakers/headphones) as an input device.
//!
//! Unlike a personal dictation recorder, a one-sided meeting transcript is
//! worse than no transcript: the customer's half of the conversation would
//! silently vanish. When no monitor source exists this fails fast with
//! `DeviceUnavailable` instead of degrading to mic-only capture.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::{MeetingError, MeetingResult};

use super::source::{AudioFrame, CaptureSource, FrameChunker, FRAME_CHANNEL_CAPACITY};

pub struct SystemMonitorSource {
    stream: Option<cpal::Stream>,
    active: bool,
    sample_rate: u32,
    frame_samples: usize,
}

impl SystemMonitorSource {
    /// Create a system audio source.
    ///
    /// # Arguments
    /// * `sample_rate` - Capture rate in Hz
    /// * `frame_samples` - Samples per emitted frame
    pub fn new(sample_rate: u32, frame_samples: usize) -> Self {
        Self {
            stream: None,
            active: false,
            sample_rate,
            frame_samples,
        }
    }

    /// Find a PipeWire/PulseAudio monitor source via cpal.
    fn find_monitor_device() -> Option<cpal::Device> {
        let host = cpal::default_host();

        for device in host.input_devices().ok()? {
            if let Ok(name) = device.name() {
                if name.to_lowercase().contains("monitor") {
                    info!("Found system audio monitor: {}", name);
                    return Some(device);
                }
            }
        }

        None
    }
}

impl CaptureSource for SystemMonitorSource {
    fn start(&mut self) -> MeetingResult<mpsc::Receiver<AudioFrame>> {
        if self.active {
            return Err(MeetingError::DeviceUnavailable(
                "already capturing".to_string(),
            ));
        }

        let device = Self::find_monitor_device().ok_or_else(|| {
            MeetingError::DeviceUnavailable(
                "no monitor source found; ensure PipeWire is running and exposes \
                 an output monitor"
                    .to_string(),
            )
        })?;

        let config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let chunker = Arc::new(Mutex::new(FrameChunker::new(self.frame_samples)));
        let err_fn = |err| error!("System audio stream error: {}", err);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut chunker) = chunker.lock() {
                        chunker.push(data, |frame| {
                            let _ = tx.try_send(frame);
                        });
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| MeetingError::DeviceUnavailable(e.to_string()))?;

        stream
            .play()
            .map_err(|e| MeetingError::DeviceUnavailable(e.to_string()))?;

        self.stream = Some(stream);
        self.active = true;

        info!("System audio capture started via monitor source");
        Ok(rx)
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            debug!("Stopping system audio stream");
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

impl Drop for SystemMonitorSource {
    fn drop(&mut self) {
        if self.active {
            debug!("Dropping active SystemMonitorSource, cleaning up");
            self.stop();
        }
    }
}
