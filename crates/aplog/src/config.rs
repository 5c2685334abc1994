//! Project configuration file support for aplog.
//!
//! Loads configuration from `aplog.toml` in the working directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Project-level configuration loaded from `aplog.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Report path used when `--output` is not given
    pub output: Option<PathBuf>,
    /// Whether config/skip/other lines are captured (default true)
    pub include_system_events: Option<bool>,
    /// Year assumed for the year-less log timestamps
    pub year: Option<i32>,
    /// Progress log format: pretty, json or compact
    pub log_format: Option<String>,
    /// Tracing level filter, e.g. "info" or "aplog_sessions=debug"
    pub log_level: Option<String>,
    /// Append JSON progress events to this file
    pub log_file: Option<PathBuf>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "aplog.toml";

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }
}
