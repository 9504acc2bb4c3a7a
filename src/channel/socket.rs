//! Duplex WebSocket channel: PCM frames out, transcript events in.
//!
//! Each channel is one connection dedicated to a single audio side of the
//! meeting. There is no reconnect: a dropped channel stays dropped, because
//! retransmitting stale live audio has no value and a half-transcribed
//! session must surface to the controller rather than limp along quietly.

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex as TokioMutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::error::{MeetingError, MeetingResult};

use super::messages::InboundMessage;
use super::plan::ChannelPath;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Which audio side a channel carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Mic,
    Speaker,
    /// Combined mic+speaker path, used for one-shot assistant prompts.
    Combined,
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Mic => "mic",
            Self::Speaker => "speaker",
            Self::Combined => "combined",
        })
    }
}

/// Connection state of one channel.
///
/// `Connecting -> Open -> Closed` on the graceful path; `Open -> Errored`
/// on transport failure. Terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
    Errored,
}

impl ChannelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Errored => "errored",
        }
    }
}

/// Decoded inbound traffic, merged across channels by the session.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    MicTranscript { timestamp: String, text: String },
    SpeakerTranscript { timestamp: String, text: String },
    SuggestionDelta { text: String },
    Closed { channel: ChannelKind },
    TransportError { channel: ChannelKind, reason: String },
}

/// Connection parameters shared by every channel of one session.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub ws_base: String,
    pub user_id: String,
    pub client_id: String,
    pub session_id: String,
}

impl ChannelConfig {
    pub fn url(&self, path: ChannelPath) -> String {
        format!(
            "{}{}?userId={}&clientId={}&sessionId={}",
            self.ws_base.trim_end_matches('/'),
            path.as_str(),
            self.user_id,
            self.client_id,
            self.session_id
        )
    }
}

struct ChannelInner {
    kind: ChannelKind,
    state: StdMutex<ChannelState>,
    sink: TokioMutex<Option<SplitSink<WsStream, Message>>>,
    reader: StdMutex<Option<JoinHandle<()>>>,
}

impl ChannelInner {
    fn state(&self) -> ChannelState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, next: ChannelState) {
        *self.state.lock().unwrap() = next;
    }

    /// Transition only if the channel is still Open; terminal states stick.
    fn degrade(&self, next: ChannelState) -> bool {
        let mut state = self.state.lock().unwrap();
        if *state == ChannelState::Open {
            *state = next;
            true
        } else {
            false
        }
    }
}

/// A live duplex channel handle. Cheap to clone; all clones share one
/// connection and one state machine.
#[derive(Clone)]
pub struct DuplexChannel {
    inner: Arc<ChannelInner>,
}

impl DuplexChannel {
    /// Connect and resolve once the WebSocket handshake completes.
    ///
    /// Decoded inbound events are pushed to `events` until the connection
    /// ends. The path is chosen by the caller from the plan policy.
    pub async fn open(
        config: &ChannelConfig,
        kind: ChannelKind,
        path: ChannelPath,
        events: mpsc::Sender<ChannelEvent>,
    ) -> MeetingResult<Self> {
        let inner = Arc::new(ChannelInner {
            kind,
            state: StdMutex::new(ChannelState::Connecting),
            sink: TokioMutex::new(None),
            reader: StdMutex::new(None),
        });

        let url = config.url(path);
        debug!("Opening {} channel: {}", kind, url);

        let (ws, _response) =
            connect_async(url.as_str())
                .await
                .map_err(|e| MeetingError::ChannelOpenFailed {
                    kind,
                    reason: e.to_string(),
                })?;

        let (sink, stream) = ws.split();
        *inner.sink.lock().await = Some(sink);
        inner.set_state(ChannelState::Open);

        let reader = tokio::spawn(read_loop(inner.clone(), stream, events));
        *inner.reader.lock().unwrap() = Some(reader);

        debug!("{} channel open", kind);
        Ok(Self { inner })
    }

    pub fn kind(&self) -> ChannelKind {
        self.inner.kind
    }

    pub fn state(&self) -> ChannelState {
        self.inner.state()
    }

    /// Transmit one encoded PCM frame.
    ///
    /// Frames sent while the channel is not Open are dropped silently.
    /// There is no buffering or retry queue; live audio is inherently lossy
    /// under transient disconnection.
    pub async fn send_frame(&self, frame: Vec<u8>) {
        if self.inner.state() != ChannelState::Open {
            return;
        }

        let mut guard = self.inner.sink.lock().await;
        if let Some(sink) = guard.as_mut() {
            if let Err(e) = sink.send(Message::Binary(frame)).await {
                if self.inner.degrade(ChannelState::Errored) {
                    warn!("{} channel send failed: {}", self.inner.kind, e);
                }
            }
        }
    }

    /// Transmit a JSON text payload (one-shot assistant prompts).
    pub async fn send_text(&self, payload: String) {
        if self.inner.state() != ChannelState::Open {
            return;
        }

        let mut guard = self.inner.sink.lock().await;
        if let Some(sink) = guard.as_mut() {
            if let Err(e) = sink.send(Message::Text(payload)).await {
                if self.inner.degrade(ChannelState::Errored) {
                    warn!("{} channel send failed: {}", self.inner.kind, e);
                }
            }
        }
    }

    /// Close gracefully. Safe to call on an already-closed or errored
    /// handle; repeated calls are no-ops.
    pub async fn close(&self) {
        let was_live = {
            let mut state = self.inner.state.lock().unwrap();
            match *state {
                ChannelState::Open | ChannelState::Connecting => {
                    *state = ChannelState::Closed;
                    true
                }
                _ => false,
            }
        };

        if was_live {
            let mut guard = self.inner.sink.lock().await;
            if let Some(sink) = guard.as_mut() {
                if let Err(e) = sink.send(Message::Close(None)).await {
                    debug!("{} channel close frame not delivered: {}", self.inner.kind, e);
                }
                let _ = sink.close().await;
            }
            debug!("{} channel closed", self.inner.kind);
        }

        let reader = self.inner.reader.lock().unwrap().take();
        if let Some(handle) = reader {
            handle.abort();
        }
    }
}

/// Decode inbound frames until the connection ends, forwarding events.
async fn read_loop(
    inner: Arc<ChannelInner>,
    mut stream: SplitStream<WsStream>,
    events: mpsc::Sender<ChannelEvent>,
) {
    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<InboundMessage>(&text) {
                Ok(InboundMessage::MicTranscription { timestamp, content }) => {
                    let _ = events
                        .send(ChannelEvent::MicTranscript {
                            timestamp,
                            text: content,
                        })
                        .await;
                }
                Ok(InboundMessage::SpeakerTranscription { timestamp, content }) => {
                    let _ = events
                        .send(ChannelEvent::SpeakerTranscript {
                            timestamp,
                            text: content,
                        })
                        .await;
                }
                Ok(InboundMessage::AssistantDelta { content, .. }) => {
                    let _ = events
                        .send(ChannelEvent::SuggestionDelta { text: content })
                        .await;
                }
                Ok(InboundMessage::Unknown) => {
                    debug!("{} channel: ignoring unknown message kind", inner.kind);
                }
                Err(e) => {
                    warn!("{} channel: undecodable message: {}", inner.kind, e);
                }
            },
            Ok(Message::Close(_)) => {
                if inner.degrade(ChannelState::Closed) {
                    debug!("{} channel closed by remote", inner.kind);
                    let _ = events
                        .send(ChannelEvent::Closed {
                            channel: inner.kind,
                        })
                        .await;
                }
                break;
            }
            Ok(_) => {
                // Binary, ping and pong frames are not part of the inbound
                // contract; the transport handles keepalive itself.
            }
            Err(e) => {
                if inner.degrade(ChannelState::Errored) {
                    warn!("{} channel transport error: {}", inner.kind, e);
                    let _ = events
                        .send(ChannelEvent::TransportError {
                            channel: inner.kind,
                            reason: e.to_string(),
                        })
                        .await;
                }
                break;
            }
        }
    }

    // Stream ended without a close frame: treat as a remote close.
    if inner.degrade(ChannelState::Closed) {
        debug!("{} channel stream ended", inner.kind);
        let _ = events
            .send(ChannelEvent::Closed {
                channel: inner.kind,
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_url_includes_identity() {
        let config = ChannelConfig {
            ws_base: "ws://127.0.0.1:9000".to_string(),
            user_id: "u-1".to_string(),
            client_id: "c-1".to_string(),
            session_id: "s-1".to_string(),
        };

        assert_eq!(
            config.url(ChannelPath::Mic),
            "ws://127.0.0.1:9000/mic?userId=u-1&clientId=c-1&sessionId=s-1"
        );
    }

    #[test]
    fn test_channel_url_trims_trailing_slash() {
        let config = ChannelConfig {
            ws_base: "ws://host/".to_string(),
            user_id: "m".to_string(),
            client_id: "m".to_string(),
            session_id: "m".to_string(),
        };

        assert!(config
            .url(ChannelPath::SpeakerNoAi)
            .starts_with("ws://host/speaker_noai?"));
    }

    #[test]
    fn test_state_strings() {
        assert_eq!(ChannelState::Connecting.as_str(), "connecting");
        assert_eq!(ChannelState::Open.as_str(), "open");
        assert_eq!(ChannelState::Closed.as_str(), "closed");
        assert_eq!(ChannelState::Errored.as_str(), "errored");
    }
}
