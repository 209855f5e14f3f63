//! Sub-configuration structs with their defaults.

use serde::Deserialize;

/// Watermark placement settings, kept as written in the file.
///
/// Validation into typed values happens in [`crate::geometry::Placement`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Anchor code: NE, NC, NW, CE, C, CW, SE, SC, SW
    pub position: String,

    /// Offsets from the anchor's edges
    pub margins: MarginsConfig,

    /// Watermark size relative to the host media
    pub relative_size: RelativeSizeConfig,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            position: "SE".to_string(),
            margins: MarginsConfig::default(),
            relative_size: RelativeSizeConfig::default(),
        }
    }
}

/// The four margins, each `<int>%` or `<int>px`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarginsConfig {
    pub nord: String,
    pub south: String,
    pub east: String,
    pub west: String,
}

impl Default for MarginsConfig {
    fn default() -> Self {
        Self {
            nord: "2%".to_string(),
            south: "2%".to_string(),
            east: "2%".to_string(),
            west: "2%".to_string(),
        }
    }
}

/// Relative size ratios, each `<int>%` from 0 to 100.
///
/// 0% is accepted but leaves the watermark at its original size, since the
/// engine reads a zero scale target as "keep this dimension".
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelativeSizeConfig {
    /// Watermark height as a share of a landscape file's height
    pub height_ratio: String,

    /// Watermark width as a share of a portrait file's width
    pub width_ratio: String,
}

impl Default for RelativeSizeConfig {
    fn default() -> Self {
        Self {
            height_ratio: "5%".to_string(),
            width_ratio: "20%".to_string(),
        }
    }
}

/// External programs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Compositing program
    pub ffmpeg: String,

    /// Metadata probe program
    pub ffprobe: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

/// Timeouts around external programs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Probe timeout in milliseconds
    pub probe_timeout_ms: u64,

    /// Compositing timeout in milliseconds, per file
    pub engine_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 10_000,
            engine_timeout_ms: 600_000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,

    /// Persistent log file, always written at debug level
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: "watermarker.log".to_string(),
        }
    }
}
