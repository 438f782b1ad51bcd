//! Engine.IO v4 packets, the outer framing of every websocket text frame.

use serde::{Deserialize, Serialize};

use super::ProtocolError;

/// Handshake body sent by the server in the `0` packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPayload {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default = "default_max_payload")]
    pub max_payload: u64,
}

fn default_max_payload() -> u64 {
    1_000_000
}

impl OpenPayload {
    /// How long to wait for the next server ping before giving up on the link.
    pub fn heartbeat_deadline_ms(&self) -> u64 {
        self.ping_interval.saturating_add(self.ping_timeout)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(OpenPayload),
    Close,
    Ping(Option<String>),
    Pong(Option<String>),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn type_char(&self) -> char {
        match self {
            EnginePacket::Open(_) => '0',
            EnginePacket::Close => '1',
            EnginePacket::Ping(_) => '2',
            EnginePacket::Pong(_) => '3',
            EnginePacket::Message(_) => '4',
            EnginePacket::Upgrade => '5',
            EnginePacket::Noop => '6',
        }
    }

    pub fn encode(&self) -> String {
        let mut out = String::new();
        out.push(self.type_char());
        match self {
            EnginePacket::Open(payload) => {
                // OpenPayload only holds strings and integers
                out.push_str(&serde_json::to_string(payload).unwrap_or_default());
            }
            EnginePacket::Ping(Some(data)) | EnginePacket::Pong(Some(data)) => {
                out.push_str(data);
            }
            EnginePacket::Message(data) => out.push_str(data),
            _ => {}
        }
        out
    }

    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(ProtocolError::EmptyFrame)?;
        let rest = chars.as_str();
        let data = (!rest.is_empty()).then(|| rest.to_string());

        match kind {
            '0' => {
                let payload: OpenPayload =
                    serde_json::from_str(rest).map_err(|e| ProtocolError::InvalidJson {
                        frame: frame.to_string(),
                        message: e.to_string(),
                    })?;
                Ok(EnginePacket::Open(payload))
            }
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(data)),
            '3' => Ok(EnginePacket::Pong(data)),
            '4' => Ok(EnginePacket::Message(rest.to_string())),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            other => Err(ProtocolError::UnknownPacketType {
                kind: other,
                frame: frame.to_string(),
            }),
        }
    }
}
