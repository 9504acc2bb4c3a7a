//! Meeting session lifecycle orchestrator.
//!
//! Owns the whole pipeline for exactly one meeting: capture sources,
//! encoder pumps, both duplex channels, the reconciled transcript and the
//! suggestion buffer. Idle -> Live on a consented start, Live -> Ended on
//! an explicit end; Ended is terminal and the object is replaced for the
//! next meeting. No state lives outside this object.
//!
//! All dependencies are injected via constructor, no concrete types
//! hardcoded.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::audio::{pcm, AudioFrame, CaptureAdapter};
use crate::backend::{BackendClient, SessionIds};
use crate::channel::{
    ChannelConfig, ChannelEvent, ChannelKind, DuplexChannel, PlanTier, TextPrompt,
};
use crate::error::{MeetingError, MeetingResult};
use crate::transcript::{Speaker, SuggestionHandle, TranscriptEvent, TranscriptHandle};

use super::status::SessionStatusHandle;

/// Static configuration for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub advisor_id: String,
    pub plan: PlanTier,
    pub ws_base: String,
}

/// Options for starting a meeting.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct StartOptions {
    pub contact_id: String,
    /// The operator must acknowledge the recording disclosure before any
    /// capture starts. Hard requirement: a live conversation is being
    /// recorded and transmitted.
    #[serde(default)]
    pub consent_acknowledged: bool,
}

/// Everything that only exists while the meeting is live.
struct LivePipeline {
    meeting_id: String,
    channel_config: ChannelConfig,
    mic_channel: DuplexChannel,
    speaker_channel: DuplexChannel,
    /// One-shot prompt channel; replaced on every new prompt.
    assistant_channel: Option<DuplexChannel>,
    events_tx: mpsc::Sender<ChannelEvent>,
    tasks: Vec<JoinHandle<()>>,
}

pub struct MeetingSession {
    config: SessionConfig,
    backend: Arc<dyn BackendClient>,
    capture: CaptureAdapter,
    transcript: TranscriptHandle,
    suggestions: SuggestionHandle,
    status: SessionStatusHandle,
    live: Option<LivePipeline>,
    ended: bool,
}

impl MeetingSession {
    pub fn new(
        config: SessionConfig,
        backend: Arc<dyn BackendClient>,
        capture: CaptureAdapter,
        transcript: TranscriptHandle,
        suggestions: SuggestionHandle,
        status: SessionStatusHandle,
    ) -> Self {
        Self {
            config,
            backend,
            capture,
            transcript,
            suggestions,
            status,
            live: None,
            ended: false,
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Start the meeting: bootstrap a session id, acquire both capture
    /// sources, open both channels, and wire the pumps.
    ///
    /// Any failure aborts the transition entirely; everything acquired so
    /// far is released and the session stays Idle. Nothing is retried.
    pub async fn start(&mut self, options: StartOptions) -> MeetingResult<()> {
        if self.live.is_some() {
            return Err(MeetingError::AlreadyLive);
        }
        if self.ended {
            return Err(MeetingError::SessionEnded);
        }
        if !options.consent_acknowledged {
            return Err(MeetingError::ConsentRequired);
        }

        let meeting_id = self
            .backend
            .start_meeting(&self.config.advisor_id, &options.contact_id)
            .await
            .map_err(|e| MeetingError::BootstrapFailed(e.to_string()))?;

        // Fresh log and suggestion buffer before anything can produce events.
        self.transcript.reset().await;
        self.suggestions.reset().await;

        let streams = self.capture.acquire()?;

        let channel_config = ChannelConfig {
            ws_base: self.config.ws_base.clone(),
            user_id: meeting_id.clone(),
            client_id: meeting_id.clone(),
            session_id: meeting_id.clone(),
        };

        let (events_tx, events_rx) = mpsc::channel(64);

        // Mic and speaker setup have no ordering dependency; open them
        // concurrently but only go live once both are up.
        let (mic_res, speaker_res) = tokio::join!(
            DuplexChannel::open(
                &channel_config,
                ChannelKind::Mic,
                self.config.plan.mic_path(),
                events_tx.clone(),
            ),
            DuplexChannel::open(
                &channel_config,
                ChannelKind::Speaker,
                self.config.plan.speaker_path(),
                events_tx.clone(),
            ),
        );

        let (mic_channel, speaker_channel) = match (mic_res, speaker_res) {
            (Ok(mic), Ok(speaker)) => (mic, speaker),
            (mic_res, speaker_res) => {
                let mut first_error = None;
                for result in [mic_res, speaker_res] {
                    match result {
                        Ok(channel) => channel.close().await,
                        Err(e) => {
                            if first_error.is_none() {
                                first_error = Some(e);
                            }
                        }
                    }
                }
                self.capture.release();
                return Err(first_error.unwrap_or(MeetingError::ChannelOpenFailed {
                    kind: ChannelKind::Mic,
                    reason: "channel setup failed".to_string(),
                }));
            }
        };

        let mut tasks = vec![tokio::spawn(reconcile_events(
            events_rx,
            self.transcript.clone(),
            self.suggestions.clone(),
            self.status.clone(),
        ))];

        // The start notice goes in before any audio is pumped, so it always
        // precedes the first transcription in the log.
        self.transcript.append_system("Meeting started").await;
        self.status
            .set_live(meeting_id.clone(), options.contact_id, self.config.plan)
            .await;

        tasks.push(tokio::spawn(pump_frames(streams.mic, mic_channel.clone())));
        tasks.push(tokio::spawn(pump_frames(
            streams.system,
            speaker_channel.clone(),
        )));

        info!("Meeting {} live", meeting_id);

        self.live = Some(LivePipeline {
            meeting_id,
            channel_config,
            mic_channel,
            speaker_channel,
            assistant_channel: None,
            events_tx,
            tasks,
        });

        Ok(())
    }

    /// End the meeting and fire the post-session enrichment calls.
    ///
    /// Teardown is total: every channel is closed and every capture source
    /// released, independently, even when some of them already failed.
    /// Summarization and insight extraction are independent best-effort
    /// side effects: each outcome is appended as its own system note and
    /// neither failure propagates to the caller.
    pub async fn end(&mut self) -> MeetingResult<()> {
        let pipeline = self.live.take().ok_or(MeetingError::NotLive)?;

        let LivePipeline {
            meeting_id,
            channel_config: _,
            mic_channel,
            speaker_channel,
            assistant_channel,
            events_tx,
            tasks,
        } = pipeline;

        info!("Ending meeting {}", meeting_id);

        mic_channel.close().await;
        speaker_channel.close().await;
        if let Some(assistant) = assistant_channel {
            assistant.close().await;
        }
        self.capture.release();

        // With the channels closed and the sources released, every producer
        // side is gone; dropping our sender lets the reconciler drain the
        // queue and finish.
        drop(events_tx);
        for task in tasks {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    error!("Session task panicked: {}", e);
                }
            }
        }

        self.ended = true;
        self.transcript.append_system("Meeting ended").await;
        self.status.set_ended().await;

        let snapshot = self.transcript.snapshot().await;
        let summary_ids = SessionIds::for_meeting(&meeting_id);
        match self.backend.summarize(&summary_ids, &snapshot).await {
            Ok(()) => {
                self.transcript
                    .append_system("Transcript summary successfully created.")
                    .await;
            }
            Err(e) => {
                warn!("{}", MeetingError::SummarizationFailed(e.to_string()));
                self.transcript
                    .append_system("Failed to create transcript summary.")
                    .await;
            }
        }

        let insight_ids = SessionIds::for_advisor(&self.config.advisor_id, &meeting_id);
        match self.backend.extract_insights(&insight_ids).await {
            Ok(()) => {
                self.transcript
                    .append_system("Insight summary successfully generated.")
                    .await;
            }
            Err(e) => {
                warn!("{}", MeetingError::ExtractionFailed(e.to_string()));
                self.transcript
                    .append_system("Insight summary generation failed.")
                    .await;
            }
        }

        info!("Meeting {} ended", meeting_id);
        Ok(())
    }

    /// Submit a one-shot assistant prompt over the combined channel.
    ///
    /// Resets the suggestion buffer first, so the display holds exactly the
    /// deltas of this prompt. Locked tiers get an explicit error rather
    /// than a silently suggestion-less socket.
    pub async fn ask(&mut self, prompt: &str) -> MeetingResult<()> {
        let path = self
            .config
            .plan
            .assistant_path()
            .ok_or_else(|| MeetingError::AssistantLocked(self.config.plan.as_str().to_string()))?;

        let pipeline = self.live.as_mut().ok_or(MeetingError::NotLive)?;

        // The previous prompt's channel (and its pending deltas) belongs to
        // a superseded invocation.
        if let Some(old) = pipeline.assistant_channel.take() {
            old.close().await;
        }
        self.suggestions.reset().await;

        let channel = DuplexChannel::open(
            &pipeline.channel_config,
            ChannelKind::Combined,
            path,
            pipeline.events_tx.clone(),
        )
        .await?;

        let payload = serde_json::to_string(&TextPrompt::new(prompt)).map_err(|e| {
            MeetingError::ChannelOpenFailed {
                kind: ChannelKind::Combined,
                reason: e.to_string(),
            }
        })?;
        channel.send_text(payload).await;

        debug!("Assistant prompt submitted for meeting {}", pipeline.meeting_id);
        pipeline.assistant_channel = Some(channel);
        Ok(())
    }
}

/// Encode and transmit capture frames as they arrive. Ends when the source
/// stops and its channel drains.
async fn pump_frames(mut frames: mpsc::Receiver<AudioFrame>, channel: DuplexChannel) {
    while let Some(frame) = frames.recv().await {
        channel.send_frame(pcm::encode(&frame.samples)).await;
    }
    debug!("{} frame pump finished", channel.kind());
}

/// Merge inbound events from every channel into the transcript, in arrival
/// order. Ends when all senders are gone.
async fn reconcile_events(
    mut events: mpsc::Receiver<ChannelEvent>,
    transcript: TranscriptHandle,
    suggestions: SuggestionHandle,
    status: SessionStatusHandle,
) {
    while let Some(event) = events.recv().await {
        match event {
            ChannelEvent::MicTranscript { timestamp, text } => {
                transcript
                    .append(TranscriptEvent::new(timestamp, Speaker::Advisor, text))
                    .await;
            }
            ChannelEvent::SpeakerTranscript { timestamp, text } => {
                transcript
                    .append(TranscriptEvent::new(timestamp, Speaker::Customer, text))
                    .await;
            }
            ChannelEvent::SuggestionDelta { text } => {
                suggestions.push_delta(&text).await;
            }
            ChannelEvent::TransportError { channel, reason } => {
                // No reconnect: the transcript is degraded until the
                // operator explicitly ends the meeting.
                let err = MeetingError::ChannelTransport {
                    kind: channel,
                    reason,
                };
                warn!("{}", err);
                status.record_error(err.to_string()).await;
                transcript
                    .append_system(format!(
                        "{} audio connection lost, transcript may be incomplete",
                        side_label(channel)
                    ))
                    .await;
            }
            ChannelEvent::Closed { channel } => {
                debug!("{} channel closed", channel);
            }
        }
    }
    debug!("Event reconciler finished");
}

fn side_label(kind: ChannelKind) -> &'static str {
    match kind {
        ChannelKind::Mic => "Advisor",
        ChannelKind::Speaker => "Customer",
        ChannelKind::Combined => "Assistant",
    }
}
