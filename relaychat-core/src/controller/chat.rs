use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::{ChatConfig, NoticeConfig};
use crate::error::ChatResult;
use crate::models::{ChatMessage, ChatMessagePayload, MessageKind, SenderLabels, UserMessagePayload};
use crate::transport::TransportEvent;

use super::{InputField, Outbound, RenderSink};

pub const USER_MESSAGE_EVENT: &str = "user_message";
pub const CHAT_MESSAGE_EVENT: &str = "chat_message";

/// What the controller believes about the link, as last reported by the
/// transport. Only used for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected { session_id: String },
    Reconnecting { attempt: u32 },
    Disconnected { reason: String },
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected { .. })
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            ConnectionStatus::Connected { session_id } => Some(session_id),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected { .. } => write!(f, "connected"),
            ConnectionStatus::Reconnecting { attempt } => {
                write!(f, "reconnecting (attempt {})", attempt)
            }
            ConnectionStatus::Disconnected { .. } => write!(f, "disconnected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// One `user_message` went out and the input was cleared.
    Sent,
    /// Input was blank; nothing emitted, input untouched.
    Empty,
    /// The transport refused the event. Input was still cleared.
    Failed,
}

/// Wires user input and connection events to a [`RenderSink`].
///
/// Owns the outbound handle for the lifetime of the session. Every method
/// runs to completion on the caller's task, so handlers never interleave.
pub struct ChatController<S, O> {
    sink: S,
    outbound: O,
    labels: SenderLabels,
    notices: NoticeConfig,
    status: ConnectionStatus,
}

impl<S: RenderSink, O: Outbound> ChatController<S, O> {
    pub fn new(sink: S, outbound: O, labels: SenderLabels, notices: NoticeConfig) -> Self {
        Self {
            sink,
            outbound,
            labels,
            notices,
            status: ConnectionStatus::Connecting,
        }
    }

    pub fn from_config(sink: S, outbound: O, config: &ChatConfig) -> Self {
        Self::new(
            sink,
            outbound,
            config.labels.clone(),
            config.notices.clone(),
        )
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn outbound(&self) -> &O {
        &self.outbound
    }

    pub fn labels(&self) -> &SenderLabels {
        &self.labels
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn send_message(&self, input: &mut impl InputField) -> SendOutcome {
        let text = input.value().trim();
        if text.is_empty() {
            debug!("Cannot send empty message");
            return SendOutcome::Empty;
        }

        debug!(text = %text, "Sending message");
        let outcome = match self.emit_user_message(text) {
            Ok(()) => SendOutcome::Sent,
            Err(e) => {
                e.log();
                SendOutcome::Failed
            }
        };

        input.clear();
        outcome
    }

    fn emit_user_message(&self, text: &str) -> ChatResult<()> {
        let payload = serde_json::to_value(UserMessagePayload {
            text: text.to_string(),
        })?;
        self.outbound.emit(USER_MESSAGE_EVENT, payload)
    }

    pub fn add_message(&mut self, sender: &str, text: &str, kind: MessageKind) {
        let entry = ChatMessage::new(sender, text, kind);
        self.sink.append_entry(&entry);
        self.sink.scroll_to_end();
    }

    fn add_system_notice(&mut self, text: &str) {
        let label = self.labels.system.clone();
        self.add_message(&label, text, MessageKind::System);
    }

    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected { session_id } => self.on_connect(session_id),
            TransportEvent::Disconnected { reason } => self.on_disconnect(reason),
            TransportEvent::ConnectError { message } => self.on_connect_error(&message),
            TransportEvent::Reconnecting { attempt, delay } => {
                info!(attempt, delay_ms = delay.as_millis() as u64, "Reconnecting");
                self.status = ConnectionStatus::Reconnecting { attempt };
            }
            TransportEvent::Event { name, payload } => self.on_server_event(&name, payload),
        }
    }

    fn on_server_event(&mut self, name: &str, payload: Value) {
        if name != CHAT_MESSAGE_EVENT {
            debug!(event = %name, "Ignoring unhandled server event");
            return;
        }

        match serde_json::from_value::<ChatMessagePayload>(payload) {
            Ok(message) => self.on_chat_message(message),
            Err(e) => warn!(error = %e, "Dropping malformed chat_message payload"),
        }
    }

    fn on_chat_message(&mut self, message: ChatMessagePayload) {
        debug!(user = %message.user, text = %message.text, "Received message");
        let kind = self.labels.classify(&message.user);
        self.add_message(&message.user, &message.text, kind);
    }

    fn on_connect(&mut self, session_id: String) {
        info!(sid = %session_id, "Connected to server");
        self.status = ConnectionStatus::Connected { session_id };
    }

    fn on_disconnect(&mut self, reason: String) {
        info!(reason = %reason, "Disconnected from server");
        self.status = ConnectionStatus::Disconnected { reason };
        let notice = self.notices.disconnected.clone();
        self.add_system_notice(&notice);
    }

    fn on_connect_error(&mut self, message: &str) {
        error!(error = %message, "Connection error");
        self.status = ConnectionStatus::Disconnected {
            reason: message.to_string(),
        };
        let notice = self.notices.connect_error_text(message);
        self.add_system_notice(&notice);
    }
}
