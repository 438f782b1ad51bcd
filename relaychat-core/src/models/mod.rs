mod message;
mod payload;

pub use message::{ChatMessage, MessageKind, SenderLabels};
pub use payload::{ChatMessagePayload, ConnectErrorPayload, UserMessagePayload};
