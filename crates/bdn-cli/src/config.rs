//! `bdn.toml` configuration.
//!
//! ```toml
//! [parse]
//! queue_capacity = 256
//! token_timeout_ms = 5000
//!
//! [format]
//! indent = 4
//! ```
//!
//! Every key is optional and falls back to the library default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use bdn_syntax::{FormatConfig, ParseConfig};

/// Name of the configuration file picked up from the working directory.
pub const CONFIG_FILE: &str = "bdn.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub parse: ParseSection,
    pub format: FormatSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseSection {
    pub queue_capacity: usize,
    pub token_timeout_ms: u64,
}

impl Default for ParseSection {
    fn default() -> Self {
        let defaults = ParseConfig::default();
        Self {
            queue_capacity: defaults.queue_capacity,
            token_timeout_ms: u64::try_from(defaults.token_timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatSection {
    /// Spaces per indentation level.
    pub indent: usize,
}

impl Default for FormatSection {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

impl Config {
    /// Load the explicit config file, or `./bdn.toml` when it exists, or the
    /// defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let local = PathBuf::from(CONFIG_FILE);
                if !local.is_file() {
                    tracing::debug!("no {CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                local
            }
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if config.parse.queue_capacity == 0 {
            anyhow::bail!("parse.queue_capacity must be at least 1");
        }
        Ok(config)
    }

    pub fn parse_config(&self) -> ParseConfig {
        ParseConfig {
            queue_capacity: self.parse.queue_capacity,
            token_timeout: Duration::from_millis(self.parse.token_timeout_ms),
        }
    }

    pub fn format_config(&self) -> FormatConfig {
        FormatConfig::with_width(self.format.indent)
    }
}
