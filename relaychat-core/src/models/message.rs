use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Presentation category of a transcript entry, derived from the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    User,
    Ai,
    System,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::User => write!(f, "user"),
            MessageKind::Ai => write!(f, "ai"),
            MessageKind::System => write!(f, "system"),
        }
    }
}

/// One entry of the transcript. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub text: String,
    pub kind: MessageKind,
    pub received_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            kind,
            received_at: Utc::now(),
        }
    }

    /// A client-generated notice, shown under the reserved system label.
    pub fn system(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(label, text, MessageKind::System)
    }

    pub fn is_system(&self) -> bool {
        self.kind == MessageKind::System
    }
}

/// The two reserved sender labels the relay uses.
///
/// Matching is exact and case-sensitive: the server sends the local user's
/// label already localized, so a server-side wording change turns the
/// user's own lines into `Ai` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderLabels {
    #[serde(default = "default_you_label")]
    pub you: String,

    #[serde(default = "default_system_label")]
    pub system: String,
}

fn default_you_label() -> String {
    "Вы".to_string()
}

fn default_system_label() -> String {
    "System".to_string()
}

impl Default for SenderLabels {
    fn default() -> Self {
        Self {
            you: default_you_label(),
            system: default_system_label(),
        }
    }
}

impl SenderLabels {
    pub fn new(you: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            you: you.into(),
            system: system.into(),
        }
    }

    pub fn classify(&self, sender: &str) -> MessageKind {
        if sender == self.you {
            MessageKind::User
        } else if sender == self.system {
            MessageKind::System
        } else {
            MessageKind::Ai
        }
    }
}
