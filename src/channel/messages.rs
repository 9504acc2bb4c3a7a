//! JSON wire messages exchanged with the transcription backend.

use serde::{Deserialize, Serialize};

/// Inbound messages decoded from a channel.
///
/// The `Unknown` variant swallows message kinds this client does not know
/// about, so the backend can add kinds without breaking older clients.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum InboundMessage {
    /// Transcription of the advisor's microphone audio.
    #[serde(rename = "mic_transcription")]
    MicTranscription { timestamp: String, content: String },

    /// Transcription of the customer's (system) audio.
    #[serde(rename = "speaker_transcription")]
    SpeakerTranscription { timestamp: String, content: String },

    /// Incremental AI assistant output.
    #[serde(rename = "openai_assistant_delta")]
    AssistantDelta {
        #[serde(default)]
        timestamp: Option<String>,
        content: String,
    },

    #[serde(other)]
    Unknown,
}

/// Outbound one-shot assistant prompt.
#[derive(Debug, Serialize)]
pub struct TextPrompt<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    content: &'a str,
}

impl<'a> TextPrompt<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            kind: "text_input",
            content,
        }
    }
}
