//! Validation of run inputs, done once before any file is touched.

use std::path::{Path, PathBuf};

use crate::error::ValidationError;
use crate::pipeline::metadata::MetadataExtractor;
use crate::pipeline::sniff::sniff_file;
use crate::types::{Dimensions, MediaType};

/// Characters allowed in an output prefix besides ASCII letters and digits.
const PREFIX_EXTRA_CHARS: [char; 3] = ['_', '-', '.'];

/// A watermark image that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkImage {
    pub path: PathBuf,
    pub dimensions: Dimensions,
}

impl WatermarkImage {
    /// Width / height, used to derive the scaled watermark's second side.
    pub fn aspect_ratio(&self) -> f64 {
        self.dimensions.aspect_ratio()
    }
}

/// At least one input path, and every input path exists.
pub fn validate_inputs(paths: &[PathBuf]) -> Result<(), ValidationError> {
    if paths.is_empty() {
        return Err(ValidationError::NoInputs);
    }
    match paths.iter().find(|p| !p.exists()) {
        Some(missing) => Err(ValidationError::InputNotFound(missing.clone())),
        None => Ok(()),
    }
}

/// The watermark exists, sniffs as an image and has readable dimensions.
pub fn validate_watermark(path: &Path) -> Result<WatermarkImage, ValidationError> {
    if !path.exists() {
        return Err(ValidationError::WatermarkNotFound(path.to_path_buf()));
    }

    let detected = sniff_file(path).map_err(|e| ValidationError::WatermarkUnreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if detected != MediaType::Image {
        return Err(ValidationError::WatermarkNotImage {
            path: path.to_path_buf(),
            detected: detected.to_string(),
        });
    }

    let dimensions =
        MetadataExtractor::dimensions(path).map_err(|e| ValidationError::WatermarkUnreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    tracing::debug!("Watermark {:?} is {}", path, dimensions);

    Ok(WatermarkImage {
        path: path.to_path_buf(),
        dimensions,
    })
}

/// Non-empty, letters, digits, `_`, `-` and `.` only.
pub fn validate_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix.is_empty() {
        return Err(ValidationError::EmptyPrefix);
    }
    let valid = prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PREFIX_EXTRA_CHARS.contains(&c));
    if !valid {
        return Err(ValidationError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// The output path is a directory, creating it when it does not exist.
pub fn prepare_output_dir(path: &Path) -> Result<(), ValidationError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(ValidationError::OutputNotDirectory(path.to_path_buf()));
        }
        return Ok(());
    }

    tracing::info!("Output directory {:?} doesn't exist. Creating it.", path);
    std::fs::create_dir_all(path).map_err(|source| ValidationError::OutputCreate {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve an external program on `PATH` (or check an explicit path).
pub fn resolve_program(program: &Path) -> Result<PathBuf, ValidationError> {
    which::which(program).map_err(|e| {
        tracing::debug!("Cannot resolve {:?}: {}", program, e);
        ValidationError::ProgramNotFound(program.to_path_buf())
    })
}
