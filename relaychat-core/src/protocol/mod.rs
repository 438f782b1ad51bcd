//! Text framing spoken by the relay: Socket.IO packets inside Engine.IO
//! packets inside websocket text frames.

mod engine;
mod socket;

pub use engine::{EnginePacket, OpenPayload};
pub use socket::{SocketPacket, DEFAULT_NAMESPACE};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("empty frame")]
    EmptyFrame,

    #[error("unknown packet type '{kind}' in frame {frame:?}")]
    UnknownPacketType { kind: char, frame: String },

    #[error("invalid JSON in frame {frame:?}: {message}")]
    InvalidJson { frame: String, message: String },

    #[error("malformed packet {0:?}")]
    Malformed(String),

    #[error("binary packets are not supported: {0:?}")]
    BinaryUnsupported(String),

    #[error("expected an event packet, got {0:?}")]
    NotAnEvent(String),
}

/// Wraps a Socket.IO packet into the text frame that goes on the wire.
pub fn encode_frame(packet: &SocketPacket) -> String {
    EnginePacket::Message(packet.encode()).encode()
}
