//! Shared test support: scripted capture sources, a trait-level backend
//! double, and an in-process mock of the transcription backend's WebSocket
//! and HTTP surface.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use meetpilot::audio::{AudioFrame, CaptureSource};
use meetpilot::backend::{BackendClient, SessionIds};
use meetpilot::error::{MeetingError, MeetingResult};
use meetpilot::transcript::TranscriptEvent;

/// A capture source that plays back pre-scripted frames, then idles until
/// stopped. Records start/stop calls for cleanup assertions.
pub struct ScriptedSource {
    frames: Vec<AudioFrame>,
    unavailable: bool,
    tx: Option<mpsc::Sender<AudioFrame>>,
    pub starts: Arc<AtomicUsize>,
    pub stops: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn with_frames(frames: Vec<AudioFrame>) -> Self {
        Self {
            frames,
            unavailable: false,
            tx: None,
            starts: Arc::new(AtomicUsize::new(0)),
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn one_frame() -> Self {
        Self::with_frames(vec![AudioFrame {
            samples: vec![0.25; 4096],
        }])
    }

    /// A source whose acquisition fails the way a window-share without
    /// system audio does.
    pub fn unavailable() -> Self {
        let mut source = Self::with_frames(Vec::new());
        source.unavailable = true;
        source
    }

    pub fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (self.starts.clone(), self.stops.clone())
    }
}

impl CaptureSource for ScriptedSource {
    fn start(&mut self) -> MeetingResult<mpsc::Receiver<AudioFrame>> {
        if self.unavailable {
            return Err(MeetingError::DeviceUnavailable(
                "no audio track produced".to_string(),
            ));
        }

        self.starts.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(self.frames.len().max(1));
        for frame in &self.frames {
            let _ = tx.try_send(frame.clone());
        }
        // Keep the sender so the receiver stays open until stop().
        self.tx = Some(tx);
        Ok(rx)
    }

    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.tx = None;
    }

    fn is_active(&self) -> bool {
        self.tx.is_some()
    }

    fn sample_rate(&self) -> u32 {
        16000
    }
}

/// Trait-level backend double recording calls.
pub struct MockBackend {
    pub fail_summarize: bool,
    pub fail_insights: bool,
    pub summarize_calls: AtomicUsize,
    pub insight_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fail_summarize: false,
            fail_insights: false,
            summarize_calls: AtomicUsize::new(0),
            insight_calls: AtomicUsize::new(0),
        })
    }

    pub fn failing_summarize() -> Arc<Self> {
        Arc::new(Self {
            fail_summarize: true,
            fail_insights: false,
            summarize_calls: AtomicUsize::new(0),
            insight_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl BackendClient for MockBackend {
    async fn start_meeting(&self, _advisor_id: &str, _contact_id: &str) -> Result<String> {
        Ok("m-test".to_string())
    }

    async fn summarize(&self, _ids: &SessionIds, _transcript: &[TranscriptEvent]) -> Result<()> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_summarize {
            anyhow::bail!("summarization backend returned 500");
        }
        Ok(())
    }

    async fn extract_insights(&self, _ids: &SessionIds) -> Result<()> {
        self.insight_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_insights {
            anyhow::bail!("insight backend returned 500");
        }
        Ok(())
    }
}

/// Shared state of the mock transcription backend.
#[derive(Default)]
pub struct MockWireState {
    pub fail_summarize: AtomicBool,
    pub summarize_calls: AtomicUsize,
    pub insight_calls: AtomicUsize,
    pub mic_connects: AtomicUsize,
    pub speaker_connects: AtomicUsize,
    pub speaker_noai_connects: AtomicUsize,
    pub combined_connects: AtomicUsize,
    /// Send this message verbatim before the normal reply, once per
    /// connection (used to exercise unknown-kind tolerance).
    pub preface_message: std::sync::Mutex<Option<String>>,
    /// Signals every open connection handler to hang up.
    pub shutdown: tokio::sync::Notify,
}

/// Handle to the in-process backend mock.
pub struct MockWireServer {
    pub addr: SocketAddr,
    pub state: Arc<MockWireState>,
    pub handle: JoinHandle<()>,
}

impl MockWireServer {
    pub fn ws_base(&self) -> String {
        format!("ws://{}", self.addr)
    }

    pub fn http_base(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Drop every connection and stop listening, simulating a backend
    /// outage mid-session.
    pub fn kill(&self) {
        // Aborting the accept loop alone leaves already-spawned connection
        // tasks running; the notify tears those down too.
        self.state.shutdown.notify_waiters();
        self.handle.abort();
    }
}

/// Spawn the mock backend: WebSocket audio channels plus the HTTP
/// bootstrap/summarize/insight endpoints.
pub async fn spawn_mock_wire() -> MockWireServer {
    let state = Arc::new(MockWireState::default());

    let app = Router::new()
        .route("/mic", get(mic_ws))
        .route("/speaker", get(speaker_ws))
        .route("/speaker_noai", get(speaker_noai_ws))
        .route("/mic_and_speaker", get(combined_ws))
        .route("/meetings/start", post(http_start_meeting))
        .route("/summarize", post(http_summarize))
        .route("/meetings/end", post(http_end_meeting))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("mock backend addr");

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockWireServer {
        addr,
        state,
        handle,
    }
}

async fn mic_ws(
    State(state): State<Arc<MockWireState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    state.mic_connects.fetch_add(1, Ordering::SeqCst);
    ws.on_upgrade(move |socket| transcribe_loop(socket, state, "mic_transcription"))
}

async fn speaker_ws(
    State(state): State<Arc<MockWireState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    state.speaker_connects.fetch_add(1, Ordering::SeqCst);
    ws.on_upgrade(move |socket| transcribe_loop(socket, state, "speaker_transcription"))
}

async fn speaker_noai_ws(
    State(state): State<Arc<MockWireState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    state.speaker_noai_connects.fetch_add(1, Ordering::SeqCst);
    ws.on_upgrade(move |socket| transcribe_loop(socket, state, "speaker_transcription"))
}

async fn combined_ws(
    State(state): State<Arc<MockWireState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    state.combined_connects.fetch_add(1, Ordering::SeqCst);
    ws.on_upgrade(move |socket| assistant_loop(socket, state))
}

/// Reply to every PCM frame with one transcription message.
async fn transcribe_loop(mut socket: WebSocket, state: Arc<MockWireState>, kind: &'static str) {
    let preface = state.preface_message.lock().unwrap().clone();
    let mut prefaced = false;

    loop {
        let message = tokio::select! {
            received = socket.recv() => match received {
                Some(Ok(message)) => message,
                _ => break,
            },
            _ = state.shutdown.notified() => break,
        };

        match message {
            Message::Binary(pcm) => {
                if !prefaced {
                    if let Some(text) = &preface {
                        let _ = socket.send(Message::Text(text.clone())).await;
                    }
                    prefaced = true;
                }

                let reply = json!({
                    "type": kind,
                    "timestamp": Utc::now().to_rfc3339(),
                    "content": format!("heard {} bytes", pcm.len()),
                });
                let _ = socket.send(Message::Text(reply.to_string())).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

/// Reply to a text prompt with a fixed run of assistant deltas.
async fn assistant_loop(mut socket: WebSocket, state: Arc<MockWireState>) {
    loop {
        let message = tokio::select! {
            received = socket.recv() => match received {
                Some(Ok(message)) => message,
                _ => break,
            },
            _ = state.shutdown.notified() => break,
        };

        match message {
            Message::Text(_prompt) => {
                for delta in ["Consider ", "tax-loss ", "harvesting"] {
                    let reply = json!({
                        "type": "openai_assistant_delta",
                        "timestamp": Utc::now().to_rfc3339(),
                        "content": delta,
                    });
                    let _ = socket.send(Message::Text(reply.to_string())).await;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

async fn http_start_meeting() -> Json<serde_json::Value> {
    Json(json!({ "meetingId": "m-wire" }))
}

async fn http_summarize(
    State(state): State<Arc<MockWireState>>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    state.summarize_calls.fetch_add(1, Ordering::SeqCst);
    if state.fail_summarize.load(Ordering::SeqCst) {
        return Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(json!({ "success": true })))
}

async fn http_end_meeting(
    State(state): State<Arc<MockWireState>>,
) -> Json<serde_json::Value> {
    state.insight_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "success": true }))
}

/// Poll until `check` passes or a few seconds elapse.
pub async fn wait_until<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}
