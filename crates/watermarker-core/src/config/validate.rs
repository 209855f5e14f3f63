//! Configuration validation with range checks.
//!
//! Watermark placement is validated separately by `Placement::from_config`.

use crate::error::ConfigError;

use super::Config;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

impl Config {
    /// Validate non-placement values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.probe_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.probe_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.engine_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.engine_timeout_ms must be > 0".into(),
            ));
        }
        if self.engine.ffmpeg.is_empty() || self.engine.ffprobe.is_empty() {
            return Err(ConfigError::ValidationError(
                "engine.ffmpeg and engine.ffprobe must not be empty".into(),
            ));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {LOG_LEVELS:?}"
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be one of {LOG_FORMATS:?}"
            )));
        }
        if self.logging.file.is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.file must not be empty".into(),
            ));
        }
        Ok(())
    }
}
