//! Shared tracing setup for the front-ends.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Where log lines end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// `logging.file_path` if set, otherwise `fallback`.
    pub fn resolve(config: &LoggingConfig, fallback: LogTarget) -> LogTarget {
        if config.file_path.trim().is_empty() {
            fallback
        } else {
            LogTarget::File(PathBuf::from(&config.file_path))
        }
    }
}

/// Builds the filter: `RUST_LOG` wins, then the configured level, then `default_filter`.
pub fn build_filter(config: &LoggingConfig, default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new(default_filter))
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber. Returns an error only if the log file
/// cannot be opened; a second call is a no-op.
pub fn init_logging(
    config: &LoggingConfig,
    target: LogTarget,
    default_filter: &str,
) -> std::io::Result<()> {
    let filter = build_filter(config, default_filter);

    let layer = match target {
        LogTarget::Stderr => {
            let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
            if config.json_format {
                layer.json().boxed()
            } else {
                layer.boxed()
            }
        }
        LogTarget::File(path) => {
            let file = open_log_file(&path)?;
            let layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            if config.json_format {
                layer.json().boxed()
            } else {
                layer.boxed()
            }
        }
    };

    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init();

    Ok(())
}
