//! Panel configuration.
//!
//! Stored as TOML at `$XDG_CONFIG_HOME/metacard-panel/panel.toml` (or the
//! platform config dir). A missing file means defaults.
//!
//! ```toml
//! throttle_ms = 60
//! layout_config_name = "goldenLayoutMetacard"
//! region = "details-tabular"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_THROTTLE_MS: u64 = 60;
pub const DEFAULT_LAYOUT_CONFIG_NAME: &str = "goldenLayoutMetacard";
pub const DEFAULT_REGION: &str = "details-tabular";

pub const THROTTLE_ENV: &str = "METACARD_THROTTLE_MS";
pub const LAYOUT_CONFIG_ENV: &str = "METACARD_LAYOUT_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read panel config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid panel config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("No config directory for metacard-panel on this platform")]
    NoConfigDir,

    #[error("Invalid panel config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Window for coalescing result lifecycle bursts, in milliseconds.
    pub throttle_ms: u64,
    /// Preset name handed to the nested detail layout.
    pub layout_config_name: String,
    /// Region the detail layout is mounted into.
    pub region: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            throttle_ms: DEFAULT_THROTTLE_MS,
            layout_config_name: DEFAULT_LAYOUT_CONFIG_NAME.to_string(),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

impl PanelConfig {
    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_overrides(&Self::config_path()?)
    }

    /// Load from `path`, then apply `METACARD_*` environment overrides.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from `path`. Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration file path.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return Ok(PathBuf::from(xdg_config)
                .join("metacard-panel")
                .join("panel.toml"));
        }

        directories::ProjectDirs::from("org", "codice", "metacard-panel")
            .map(|dirs| dirs.config_dir().join("panel.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Apply `METACARD_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(THROTTLE_ENV) {
            self.throttle_ms = raw.trim().parse().map_err(|_| {
                ConfigError::Validation(format!("{THROTTLE_ENV} must be an integer, got {raw:?}"))
            })?;
        }
        if let Some(name) = lookup(LAYOUT_CONFIG_ENV) {
            self.layout_config_name = name;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.throttle_ms == 0 {
            return Err(ConfigError::Validation(
                "throttle_ms must be greater than zero".into(),
            ));
        }
        if self.layout_config_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "layout_config_name cannot be empty".into(),
            ));
        }
        if self.region.trim().is_empty() {
            return Err(ConfigError::Validation("region cannot be empty".into()));
        }
        Ok(())
    }

    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}
