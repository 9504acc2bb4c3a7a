pub mod messages;
pub mod plan;
pub mod socket;

pub use messages::{InboundMessage, TextPrompt};
pub use plan::{ChannelPath, PlanTier};
pub use socket::{ChannelConfig, ChannelEvent, ChannelKind, ChannelState, DuplexChannel};
