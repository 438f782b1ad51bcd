pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod models;
pub mod protocol;
pub mod transport;

pub use config::{
    get_config_dir, get_data_dir, get_log_dir, ChatConfig, ConfigLoadError, LoggingConfig,
    NoticeConfig, ReconnectConfig, ServerConfig, TuiConfig,
};
pub use controller::{
    ChatController, ConnectionStatus, InputField, Outbound, RenderSink, SendOutcome, Transcript,
    CHAT_MESSAGE_EVENT, USER_MESSAGE_EVENT,
};
pub use error::{ChatError, ChatResult, CliErrorDisplay, RetryConfig};
pub use logging::{init_logging, LogTarget};
pub use models::{
    ChatMessage, ChatMessagePayload, ConnectErrorPayload, MessageKind, SenderLabels,
    UserMessagePayload,
};
pub use protocol::{EnginePacket, ProtocolError, SocketPacket};
pub use transport::{ClientConfig, SocketClient, SocketHandle, TransportEvent};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
