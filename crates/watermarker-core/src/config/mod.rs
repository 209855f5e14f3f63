//! Configuration management for the watermarker.
//!
//! Configuration is loaded from `config.toml` in the platform config directory,
//! or from an explicit path. Missing sections fall back to their defaults.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Watermark placement
    pub watermark: WatermarkConfig,

    /// External programs
    pub engine: EngineConfig,

    /// Timeouts
    pub limits: LimitsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and range-check configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.watermarker.watermarker/config.toml
    /// - Linux: ~/.config/watermarker/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\watermarker\config\config.toml
    ///
    /// Falls back to ~/.watermarker/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "watermarker", "watermarker")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".watermarker").join("config.toml")
            })
    }

    /// Compositing program path (with ~ expansion).
    pub fn ffmpeg_path(&self) -> PathBuf {
        expand(&self.engine.ffmpeg)
    }

    /// Probe program path (with ~ expansion).
    pub fn ffprobe_path(&self) -> PathBuf {
        expand(&self.engine.ffprobe)
    }

    /// Persistent log file path (with ~ expansion).
    pub fn log_file(&self) -> PathBuf {
        expand(&self.logging.file)
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
