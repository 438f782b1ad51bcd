//! Event payloads exchanged with the relay.

use serde::{Deserialize, Serialize};

/// Body of the outbound `user_message` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessagePayload {
    pub text: String,
}

/// Body of the inbound `chat_message` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessagePayload {
    pub user: String,
    pub text: String,
}

/// Body of a namespace connect error (`44{...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectErrorPayload {
    pub message: String,
}
