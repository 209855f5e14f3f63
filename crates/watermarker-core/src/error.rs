//! Error types for the watermarking pipeline.
//!
//! Errors are split by how far they propagate. Configuration and validation
//! errors abort the whole batch, per-file errors skip one file, traversal
//! errors lose one subtree. The orchestrator decides on the variant alone.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for watermarker operations.
#[derive(Error, Debug)]
pub enum WatermarkError {
    /// Watermark placement, margin, ratio or engine configuration is unusable
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Command-line input is unusable
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A single file could not be watermarked
    #[error("{0}")]
    File(#[from] FileError),

    /// A subtree could not be enumerated
    #[error("Traversal error: {0}")]
    Traversal(#[from] TraversalError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatermarkError {
    /// Whether this error must abort the whole batch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Validation(_))
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Position is not one of the nine anchor codes
    #[error("Invalid watermark position [{0}]. Expected one of NE, NC, NW, CE, C, CW, SE, SC, SW")]
    InvalidPosition(String),

    /// Margin is neither `<int>%` (0-100) nor `<int>px`
    #[error("Invalid {side} margin [{value}]. Expected <int>% (0-100) or <int>px")]
    InvalidMargin { side: &'static str, value: String },

    /// Relative size ratio is not `<int>%` (0-100)
    #[error("Invalid relative size {key} [{value}]. Expected <int>% (0-100)")]
    InvalidRatio { key: &'static str, value: String },

    /// The compositing program cannot be started at all
    #[error("Compositing engine {program:?} is unavailable: {message}")]
    EngineUnavailable { program: PathBuf, message: String },
}

/// Errors in the user-supplied run inputs.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("No input paths specified")]
    NoInputs,

    #[error("Input path doesn't exist: {0:?}")]
    InputNotFound(PathBuf),

    #[error("Watermark file doesn't exist: {0:?}")]
    WatermarkNotFound(PathBuf),

    #[error("Watermark file is not an image: {path:?} (detected: {detected})")]
    WatermarkNotImage { path: PathBuf, detected: String },

    #[error("Cannot read watermark dimensions for {path:?}: {message}")]
    WatermarkUnreadable { path: PathBuf, message: String },

    #[error("Prefix must have at least one character")]
    EmptyPrefix,

    #[error("Prefix [{0}] contains invalid characters. Allowed: letters, digits, '_', '-', '.'")]
    InvalidPrefix(String),

    #[error("Output path exists and is not a directory: {0:?}")]
    OutputNotDirectory(PathBuf),

    #[error("Failed to create output directory {path:?}: {source}")]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Program {0:?} not found. Install it or set its path in the [engine] config section")]
    ProgramNotFound(PathBuf),
}

/// Per-file processing errors. The file is skipped, the batch continues.
#[derive(Error, Debug)]
pub enum FileError {
    /// Content signature maps to neither image nor video
    #[error("Unrecognized media type for {path:?}")]
    Unrecognized { path: PathBuf },

    /// File could not be read
    #[error("Cannot read {path:?}: {message}")]
    Read { path: PathBuf, message: String },

    /// Width/height metadata is missing or unreadable
    #[error("Cannot determine dimensions of {path:?}: {message}")]
    Dimensions { path: PathBuf, message: String },

    /// The probe program failed
    #[error("Probe failed for {path:?}: {message}")]
    Probe { path: PathBuf, message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path:?} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: &'static str,
        timeout_ms: u64,
    },

    /// Mirrored output directory could not be created
    #[error("Cannot create output directory {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compositing engine exited with a failure status
    #[error("Compositing failed for {path:?} ({status}): {stderr}")]
    Engine {
        path: PathBuf,
        status: String,
        stderr: String,
    },
}

/// Filesystem enumeration failure for a subtree.
#[derive(Error, Debug)]
#[error("Failed to enumerate {}: {message}", path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<unknown>".to_string()))]
pub struct TraversalError {
    pub path: Option<PathBuf>,
    pub message: String,
}

impl TraversalError {
    pub fn new(path: Option<&std::path::Path>, message: impl Into<String>) -> Self {
        Self {
            path: path.map(std::path::Path::to_path_buf),
            message: message.into(),
        }
    }
}

/// Convenience type alias for watermarker results.
pub type Result<T> = std::result::Result<T, WatermarkError>;

/// Convenience type alias for per-file results.
pub type FileResult<T> = std::result::Result<T, FileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_and_validation_are_fatal() {
        let err = WatermarkError::from(ConfigError::InvalidPosition("ZZ".into()));
        assert!(err.is_fatal());
        let err = WatermarkError::from(ValidationError::NoInputs);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_file_and_traversal_are_not_fatal() {
        let err = WatermarkError::from(FileError::Unrecognized {
            path: PathBuf::from("a.txt"),
        });
        assert!(!err.is_fatal());
        let err = WatermarkError::from(TraversalError {
            path: None,
            message: "denied".into(),
        });
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_margin_error_names_side() {
        let err = ConfigError::InvalidMargin {
            side: "east",
            value: "10".into(),
        };
        assert!(err.to_string().contains("east"));
        assert!(err.to_string().contains("[10]"));
    }

    #[test]
    fn test_traversal_error_without_path() {
        let err = TraversalError {
            path: None,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "Failed to enumerate <unknown>: boom");
    }
}
