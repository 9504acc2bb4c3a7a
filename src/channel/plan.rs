//! Subscription-plan routing policy for the audio channels.
//!
//! One lookup table instead of conditionals scattered across the pipeline:
//! a tier decides which backend path each channel kind connects to and
//! whether the AI assistant is available at all.

use serde::{Deserialize, Serialize};

/// Named backend endpoint paths for the duplex channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPath {
    Mic,
    Speaker,
    SpeakerNoAi,
    MicAndSpeaker,
}

impl ChannelPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mic => "/mic",
            Self::Speaker => "/speaker",
            Self::SpeakerNoAi => "/speaker_noai",
            Self::MicAndSpeaker => "/mic_and_speaker",
        }
    }
}

/// Subscription tier of the advisor's active plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Basic,
    Pro,
}

impl PlanTier {
    /// Parse a plan name as stored on the subscription record.
    /// Unknown names get the full feature set; downgrades are explicit.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "basic" => Self::Basic,
            _ => Self::Pro,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Pro => "pro",
        }
    }

    /// The microphone channel path. Same for every tier.
    pub fn mic_path(&self) -> ChannelPath {
        ChannelPath::Mic
    }

    /// The speaker channel path. The basic tier routes through the variant
    /// that transcribes without generating AI suggestions.
    pub fn speaker_path(&self) -> ChannelPath {
        match self {
            Self::Basic => ChannelPath::SpeakerNoAi,
            Self::Pro => ChannelPath::Speaker,
        }
    }

    /// The combined path used for one-shot text-prompt assistant queries,
    /// or `None` when the tier has no assistant access.
    pub fn assistant_path(&self) -> Option<ChannelPath> {
        match self {
            Self::Basic => None,
            Self::Pro => Some(ChannelPath::MicAndSpeaker),
        }
    }

    pub fn ai_enabled(&self) -> bool {
        self.assistant_path().is_some()
    }
}
