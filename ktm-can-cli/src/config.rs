//! Configuration loading and parsing

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use ktm_can_decoder::{DecoderConfig, SignalName};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Only decode these identifiers (all when unset)
    pub identifiers: Option<Vec<u32>>,
    /// Signals never printed
    #[serde(default)]
    pub skip_signals: Vec<SignalName>,
}

impl FilterConfig {
    /// Check if a frame identifier should be decoded
    pub fn should_process_frame(&self, identifier: u32) -> bool {
        match &self.identifiers {
            Some(identifiers) => identifiers.contains(&identifier),
            None => true,
        }
    }

    /// Check if a signal should be printed
    pub fn should_emit(&self, name: SignalName) -> bool {
        !self.skip_signals.contains(&name)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Only print values that differ from the previous one
    #[serde(default = "default_true")]
    pub changes_only: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            changes_only: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    if let Some(identifiers) = &config.filter.identifiers {
        for id in identifiers {
            if !ktm_can_decoder::Decoder::is_known(*id) {
                log::warn!(
                    "Filter lists identifier 0x{:03X}, which has no known layout",
                    id
                );
            }
        }
    }

    Ok(config)
}
