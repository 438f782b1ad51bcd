use std::time::Duration;

use serde_json::Value;

/// Everything the transport reports to the controller, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Namespace handshake finished; `session_id` is the server-assigned sid.
    Connected { session_id: String },
    /// An established session ended.
    Disconnected { reason: String },
    /// A connection attempt failed before the session was established.
    ConnectError { message: String },
    /// A new attempt is scheduled after `delay`. `attempt` starts at 1.
    Reconnecting { attempt: u32, delay: Duration },
    /// A server event on our namespace.
    Event { name: String, payload: Value },
}

/// Disconnect reasons, worded the way Socket.IO clients report them.
pub mod reason {
    pub const SERVER_DISCONNECT: &str = "io server disconnect";
    pub const CLIENT_DISCONNECT: &str = "io client disconnect";
    pub const TRANSPORT_CLOSE: &str = "transport close";
    pub const TRANSPORT_ERROR: &str = "transport error";
    pub const PING_TIMEOUT: &str = "ping timeout";
}

impl TransportEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TransportEvent::Connected { .. } => "connect",
            TransportEvent::Disconnected { .. } => "disconnect",
            TransportEvent::ConnectError { .. } => "connect_error",
            TransportEvent::Reconnecting { .. } => "reconnect_attempt",
            TransportEvent::Event { .. } => "event",
        }
    }
}
