use std::path::PathBuf;

use anyhow::{Context, Result};
use relaychat_core::ChatConfig;

/// Settings given on the command line; they win over files and env vars.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub url: Option<String>,
    pub you_label: Option<String>,
    pub verbose: bool,
}

pub fn load_config(overrides: &CliOverrides) -> Result<ChatConfig> {
    let config = match &overrides.config_file {
        Some(path) => ChatConfig::load_with_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ChatConfig::load().context("Failed to load configuration")?,
    };

    apply_overrides(config, overrides)
}

pub fn apply_overrides(mut config: ChatConfig, overrides: &CliOverrides) -> Result<ChatConfig> {
    if let Some(url) = &overrides.url {
        config.server.url = url.clone();
    }
    if let Some(label) = &overrides.you_label {
        config.labels.you = label.clone();
    }
    if overrides.verbose {
        config.logging.level = "debug".to_string();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
