//! Error types for the relaychat core library.
//!
//! Every failure the client can run into is folded into [`ChatError`]. None
//! of them is fatal to a running session: the controller turns transport
//! failures into system notices and the transport retries on its own.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Config | Environment, config file, and validation errors |
//! | E2001-E2099 | Connection | Websocket handshake, transport and send errors |
//! | E3001-E3099 | Protocol | Engine.IO / Socket.IO framing errors |
//! | E9001-E9099 | General | IO and serialization errors |

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;
use tracing::{error, warn};

use crate::protocol::ProtocolError;

/// Backoff settings used between reconnection attempts.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, `None` for unlimited
    pub max_attempts: Option<u32>,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound on a single delay
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (e.g., 2.0 for doubling)
    pub backoff_multiplier: f64,
    /// Whether to spread retries with a little jitter
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: Some(3),
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Reconnection defaults: start at one second, cap at five, never give up.
    pub fn for_reconnection() -> Self {
        Self {
            max_attempts: None,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Returns true once `attempt` (0-indexed) is past the configured cap.
    pub fn is_exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempt >= max)
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay.as_millis() as f64);

        let final_delay = if self.jitter {
            // up to 25% extra
            let jitter_factor = 1.0 + (rand_jitter() * 0.25);
            capped_delay * jitter_factor
        } else {
            capped_delay
        };

        Duration::from_millis(final_delay as u64)
    }
}

/// Cheap jitter source based on the current timestamp, in `0.0..1.0`.
fn rand_jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (nanos % 1000) as f64 / 1000.0
}

/// The main error type for the relaychat core library.
#[derive(Debug, Error)]
pub enum ChatError {
    // ========================================================================
    // Configuration Errors (E1001-E1099)
    // ========================================================================
    /// Configuration file parse error
    #[error("[E1001] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// Invalid configuration value
    #[error("[E1002] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    /// Server URL could not be turned into a websocket endpoint
    #[error("[E1003] Invalid server URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    // ========================================================================
    // Connection Errors (E2001-E2099)
    // ========================================================================
    /// Websocket connection could not be established
    #[error("[E2001] Connection to {url} failed: {message}")]
    ConnectionFailed { url: String, message: String },

    /// Server answered the websocket upgrade with a non-101 status
    #[error("[E2002] Server rejected the websocket handshake with status {status}")]
    HandshakeRejected { status: u16 },

    /// Server refused the namespace connection
    #[error("[E2003] Server refused the connection: {0}")]
    ConnectionRefused(String),

    /// Websocket closed underneath us
    #[error("[E2004] Connection closed: {0}")]
    ConnectionClosed(String),

    /// No heartbeat from the server within the agreed window
    #[error("[E2005] No ping from server within {0} ms")]
    PingTimeout(u64),

    /// Handle used after the transport task went away
    #[error("[E2006] Transport is not running")]
    TransportStopped,

    // ========================================================================
    // Protocol Errors (E3001-E3099)
    // ========================================================================
    /// Frame could not be decoded
    #[error("[E3001] Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Server sent something out of order during the handshake
    #[error("[E3002] Unexpected packet during handshake: {0}")]
    UnexpectedPacket(String),

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// IO error
    #[error("[E9001] IO error: {0}")]
    IoError(String),

    /// Serialization/deserialization error
    #[error("[E9002] Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias for relaychat operations.
pub type ChatResult<T> = Result<T, ChatError>;

// ============================================================================
// From trait implementations for seamless error propagation
// ============================================================================

impl From<tungstenite::Error> for ChatError {
    fn from(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                ChatError::ConnectionClosed("websocket closed".to_string())
            }
            tungstenite::Error::Http(response) => ChatError::HandshakeRejected {
                status: response.status().as_u16(),
            },
            tungstenite::Error::Io(e) => ChatError::IoError(e.to_string()),
            other => ChatError::ConnectionClosed(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        ChatError::IoError(err.to_string())
    }
}

impl From<config::ConfigError> for ChatError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => ChatError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            config::ConfigError::FileParse { uri, cause } => ChatError::ConfigParseError(
                format!("Failed to parse {}: {}", uri.unwrap_or_default(), cause),
            ),
            config::ConfigError::Type {
                origin,
                unexpected,
                expected,
                key,
            } => ChatError::InvalidConfigValue {
                key: key.unwrap_or_else(|| origin.map(|o| o.to_string()).unwrap_or_default()),
                message: format!("Expected {}, got {}", expected, unexpected),
            },
            _ => ChatError::ConfigParseError(err.to_string()),
        }
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl ChatError {
    /// Returns true if a reconnect attempt might get past this error.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ChatError::ConnectionFailed { .. }
                | ChatError::ConnectionClosed(_)
                | ChatError::PingTimeout(_)
                | ChatError::IoError(_)
                | ChatError::HandshakeRejected { status: 500..=599 }
        )
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            ChatError::ConfigParseError(_) => "E1001",
            ChatError::InvalidConfigValue { .. } => "E1002",
            ChatError::InvalidUrl { .. } => "E1003",
            ChatError::ConnectionFailed { .. } => "E2001",
            ChatError::HandshakeRejected { .. } => "E2002",
            ChatError::ConnectionRefused(_) => "E2003",
            ChatError::ConnectionClosed(_) => "E2004",
            ChatError::PingTimeout(_) => "E2005",
            ChatError::TransportStopped => "E2006",
            ChatError::Protocol(_) => "E3001",
            ChatError::UnexpectedPacket(_) => "E3002",
            ChatError::IoError(_) => "E9001",
            ChatError::SerializationError(_) => "E9002",
        }
    }

    /// Returns a user-friendly suggestion for how to resolve this error.
    pub fn user_suggestion(&self) -> Option<&'static str> {
        match self {
            ChatError::InvalidUrl { .. } => {
                Some("Use an http://, https://, ws:// or wss:// URL, e.g. http://localhost:5000")
            }
            ChatError::ConnectionFailed { .. } => {
                Some("Check that the chat server is running and RELAYCHAT_URL is correct")
            }
            ChatError::HandshakeRejected { status: 404 } => {
                Some("The server has no Socket.IO endpoint at this path; check server.path")
            }
            ChatError::ConfigParseError(_) => Some("Fix the syntax of relaychat.toml"),
            _ => None,
        }
    }

    /// Short text shown to the user next to a connection error notice.
    ///
    /// The bracketed code is noise in a chat transcript, so this strips it.
    pub fn notice_text(&self) -> String {
        let full = self.to_string();
        match full.split_once("] ") {
            Some((_, rest)) => rest.to_string(),
            None => full,
        }
    }

    /// Log this error with appropriate severity level.
    pub fn log(&self) {
        let code = self.error_code();
        let suggestion = self.user_suggestion();

        if self.is_transient() {
            warn!(
                error_code = %code,
                suggestion = suggestion,
                "Transient error occurred: {}",
                self
            );
        } else {
            error!(
                error_code = %code,
                suggestion = suggestion,
                "Error occurred: {}",
                self
            );
        }
    }
}

// ============================================================================
// User-friendly error formatting for CLI
// ============================================================================

/// Format an error for terminal display with its suggestion.
pub struct CliErrorDisplay<'a> {
    error: &'a ChatError,
}

impl<'a> CliErrorDisplay<'a> {
    pub fn new(error: &'a ChatError) -> Self {
        Self { error }
    }
}

impl<'a> fmt::Display for CliErrorDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.error)?;

        if let Some(suggestion) = self.error.user_suggestion() {
            writeln!(f)?;
            writeln!(f, "  Suggestion: {}", suggestion)?;
        }

        Ok(())
    }
}
