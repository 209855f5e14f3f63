//! Media probing: image metadata and ffprobe video stream information.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::metadata::{ImageMetadata, MetadataExtractor};
use crate::error::FileError;
use crate::types::Dimensions;

/// Capability to read the metadata classification needs.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Dimensions and EXIF orientation of an image.
    async fn image_metadata(&self, path: &Path) -> Result<ImageMetadata, FileError>;

    /// First video stream of a container, or `None` when there is none.
    async fn video_stream(&self, path: &Path) -> Result<Option<VideoStream>, FileError>;
}

/// Video stream fields relevant to orientation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoStream {
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub side_data_list: Vec<SideData>,
}

/// One entry of a stream's side data.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SideData {
    pub rotation: Option<f64>,
}

impl VideoStream {
    /// Coded dimensions, when both are present and non-zero.
    pub fn dimensions(&self) -> Option<Dimensions> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(Dimensions::new(w, h)),
            _ => None,
        }
    }

    /// Raw `rotate` container tag.
    pub fn rotate_tag(&self) -> Option<&str> {
        self.tags.get("rotate").map(String::as_str)
    }

    /// First side-data rotation, in degrees.
    pub fn side_data_rotation(&self) -> Option<f64> {
        self.side_data_list.iter().find_map(|sd| sd.rotation)
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<VideoStream>,
}

/// Probe backed by the `image`/EXIF readers and the ffprobe program.
pub struct SystemProbe {
    ffprobe: PathBuf,
    timeout: Duration,
}

impl SystemProbe {
    pub fn new(ffprobe: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            timeout,
        }
    }

    async fn run_ffprobe(&self, path: &Path) -> Result<Option<VideoStream>, FileError> {
        let probe_failed = |message: String| FileError::Probe {
            path: path.to_path_buf(),
            message,
        };

        let child = Command::new(&self.ffprobe)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| FileError::Timeout {
                path: path.to_path_buf(),
                stage: "probe",
                timeout_ms: self.timeout.as_millis() as u64,
            })?
            .map_err(|e| probe_failed(format!("cannot run {:?}: {}", self.ffprobe, e)))?;

        if !output.status.success() {
            return Err(probe_failed(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_ffprobe(&output.stdout).map_err(|e| probe_failed(e.to_string()))
    }
}

#[async_trait]
impl MediaProbe for SystemProbe {
    async fn image_metadata(&self, path: &Path) -> Result<ImageMetadata, FileError> {
        let owned = path.to_path_buf();
        let extracted = tokio::task::spawn_blocking(move || MetadataExtractor::extract(&owned))
            .await
            .map_err(|e| FileError::Read {
                path: path.to_path_buf(),
                message: format!("metadata task failed: {e}"),
            })?;

        match extracted {
            Ok(meta) => Ok(meta),
            Err(err) => {
                // Formats the image crate cannot decode (HEIC, ...) still probe fine
                tracing::debug!("Image reader failed ({err}), probing {:?} instead", path);
                let dimensions = self
                    .run_ffprobe(path)
                    .await?
                    .and_then(|stream| stream.dimensions())
                    .ok_or(err)?;
                Ok(ImageMetadata {
                    dimensions,
                    exif_orientation: MetadataExtractor::exif_orientation(path),
                })
            }
        }
    }

    async fn video_stream(&self, path: &Path) -> Result<Option<VideoStream>, FileError> {
        self.run_ffprobe(path).await
    }
}

/// Parse ffprobe JSON, returning the first (video) stream.
pub fn parse_ffprobe(json: &[u8]) -> Result<Option<VideoStream>, serde_json::Error> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;
    Ok(probe.streams.into_iter().next())
}
