use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::error::RetryConfig;
use crate::models::SenderLabels;

const ENV_PREFIX: &str = "RELAYCHAT";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChatConfig {
    pub server: ServerConfig,
    pub labels: SenderLabels,
    pub notices: NoticeConfig,
    pub reconnect: ReconnectConfig,
    pub logging: LoggingConfig,
    pub tui: TuiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_url")]
    pub url: String,

    #[serde(default = "default_socket_path")]
    pub path: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Texts of the notices the client itself adds to the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeConfig {
    #[serde(default = "default_disconnected_notice")]
    pub disconnected: String,

    /// Must contain `{message}`, replaced by the error description.
    #[serde(default = "default_connect_error_notice")]
    pub connect_error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 0 means keep trying forever.
    #[serde(default)]
    pub max_attempts: u32,

    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    #[serde(default = "default_true")]
    pub jitter: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,

    /// Empty means the front-end picks its own destination.
    #[serde(default)]
    pub file_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(default = "default_true")]
    pub mouse_enabled: bool,

    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,

    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_server_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_socket_path() -> String {
    "/socket.io".to_string()
}

fn default_namespace() -> String {
    "/".to_string()
}

fn default_connect_timeout() -> u64 {
    20
}

fn default_disconnected_notice() -> String {
    "Потеряно соединение с сервером.".to_string()
}

fn default_connect_error_notice() -> String {
    "Ошибка подключения: {message}".to_string()
}

fn default_true() -> bool {
    true
}

fn default_initial_delay() -> u64 {
    1000
}

fn default_max_delay() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_theme() -> String {
    "Tokyo Night".to_string()
}

fn default_tick_rate() -> u64 {
    250
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            path: default_socket_path(),
            namespace: default_namespace(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            disconnected: default_disconnected_notice(),
            connect_error: default_connect_error_notice(),
        }
    }
}

impl NoticeConfig {
    pub fn connect_error_text(&self, message: &str) -> String {
        self.connect_error.replace("{message}", message)
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 0,
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            jitter: true,
        }
    }
}

impl ReconnectConfig {
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: (self.max_attempts > 0).then_some(self.max_attempts),
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            jitter: self.jitter,
            ..RetryConfig::for_reconnection()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: String::new(),
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            mouse_enabled: true,
            tick_rate_ms: default_tick_rate(),
            show_timestamps: true,
        }
    }
}

impl ChatConfig {
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from_paths(get_config_paths())
    }

    /// Standard search paths plus one file that must exist.
    pub fn load_with_file(path: &Path) -> Result<Self, ConfigLoadError> {
        if !path.exists() {
            return Err(ConfigLoadError::MissingRequired(format!(
                "config file {}",
                path.display()
            )));
        }
        let mut paths = get_config_paths();
        paths.push(path.to_path_buf());
        Self::load_from_paths(paths)
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> Result<Self, ConfigLoadError> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut chat_config: ChatConfig = config.try_deserialize()?;

        if let Ok(url) = std::env::var("RELAYCHAT_URL") {
            chat_config.server.url = url;
        }

        if let Ok(level) = std::env::var("RELAYCHAT_LOG_LEVEL") {
            chat_config.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            chat_config.logging.level = level;
        }

        chat_config.validate()?;

        Ok(chat_config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.server.url.trim().is_empty() {
            return Err(ConfigLoadError::MissingRequired("server.url".to_string()));
        }

        let schemes = ["http://", "https://", "ws://", "wss://"];
        if !schemes.iter().any(|s| self.server.url.starts_with(s)) {
            return Err(ConfigLoadError::InvalidValue {
                key: "server.url".to_string(),
                message: format!("Must start with one of {:?}", schemes),
            });
        }

        if !self.server.path.starts_with('/') {
            return Err(ConfigLoadError::InvalidValue {
                key: "server.path".to_string(),
                message: "Must start with '/'".to_string(),
            });
        }

        if !self.server.namespace.starts_with('/') {
            return Err(ConfigLoadError::InvalidValue {
                key: "server.namespace".to_string(),
                message: "Must start with '/'".to_string(),
            });
        }

        if self.labels.you.is_empty() {
            return Err(ConfigLoadError::MissingRequired("labels.you".to_string()));
        }

        if self.labels.system.is_empty() {
            return Err(ConfigLoadError::MissingRequired("labels.system".to_string()));
        }

        if self.labels.you == self.labels.system {
            return Err(ConfigLoadError::InvalidValue {
                key: "labels.you".to_string(),
                message: "Cannot be the same as labels.system".to_string(),
            });
        }

        if !self.notices.connect_error.contains("{message}") {
            return Err(ConfigLoadError::InvalidValue {
                key: "notices.connect_error".to_string(),
                message: "Must contain the {message} placeholder".to_string(),
            });
        }

        if self.reconnect.initial_delay_ms == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "reconnect.initial_delay_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.reconnect.initial_delay_ms > self.reconnect.max_delay_ms {
            return Err(ConfigLoadError::InvalidValue {
                key: "reconnect.initial_delay_ms".to_string(),
                message: "Cannot be greater than max_delay_ms".to_string(),
            });
        }

        if self.tui.tick_rate_ms == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "tui.tick_rate_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        // same parser the subscriber uses, so RUST_LOG values like `off` pass
        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            return Err(ConfigLoadError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!("Invalid log filter '{}': {}", self.logging.level, e),
            });
        }

        Ok(())
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("default.toml"));
        paths.push(cwd.join("config").join("local.toml"));
        paths.push(cwd.join("relaychat.toml"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join("config.toml"));
    }

    paths
}

fn load_dotenv_files() {
    let env_paths = get_dotenv_paths();

    for path in env_paths {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

fn get_dotenv_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
        paths.push(cwd.join(".env.local"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join(".env"));
    }

    paths
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("relaychat"))
}

pub fn get_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("relaychat"))
}

pub fn get_log_dir() -> Option<PathBuf> {
    get_data_dir().map(|d| d.join("logs"))
}
