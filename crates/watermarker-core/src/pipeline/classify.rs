//! Media classification: type, orientation and frame dimensions.
//!
//! Results are pure functions of file content and are memoized per path for
//! the lifetime of the classifier.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

use super::metadata::ImageMetadata;
use super::probe::{MediaProbe, VideoStream};
use super::sniff::sniff_file;
use crate::error::FileError;
use crate::types::{Dimensions, MediaProfile, MediaType, Orientation, Transpose};

/// Classifies files and caches the results per path.
pub struct MediaClassifier {
    probe: Arc<dyn MediaProbe>,
    types: Mutex<HashMap<PathBuf, MediaType>>,
    profiles: Mutex<HashMap<PathBuf, Arc<OnceCell<MediaProfile>>>>,
}

impl MediaClassifier {
    pub fn new(probe: Arc<dyn MediaProbe>) -> Self {
        Self {
            probe,
            types: Mutex::new(HashMap::new()),
            profiles: Mutex::new(HashMap::new()),
        }
    }

    /// Detect the media type from the content signature.
    ///
    /// Fails with [`FileError::Unrecognized`] when the signature is neither
    /// image nor video.
    pub fn classify(&self, path: &Path) -> Result<MediaType, FileError> {
        let cached = self
            .types
            .lock()
            .ok()
            .and_then(|types| types.get(path).copied());

        let media_type = match cached {
            Some(media_type) => media_type,
            None => {
                let media_type = sniff_file(path)?;
                if let Ok(mut types) = self.types.lock() {
                    types.insert(path.to_path_buf(), media_type);
                }
                media_type
            }
        };

        match media_type {
            MediaType::Unrecognized => Err(FileError::Unrecognized {
                path: path.to_path_buf(),
            }),
            known => Ok(known),
        }
    }

    /// Full profile of a file: type, orientation, frame dimensions, transpose.
    ///
    /// Computed at most once per path, even under concurrent callers.
    pub async fn profile(&self, path: &Path) -> Result<MediaProfile, FileError> {
        let cell = {
            let mut profiles = self
                .profiles
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            profiles.entry(path.to_path_buf()).or_default().clone()
        };

        cell.get_or_try_init(|| self.compute_profile(path))
            .await
            .copied()
    }

    async fn compute_profile(&self, path: &Path) -> Result<MediaProfile, FileError> {
        let media_type = self.classify(path)?;
        let profile = match media_type {
            MediaType::Image => {
                let meta = self.probe.image_metadata(path).await?;
                image_profile(&meta)
            }
            MediaType::Video => {
                let stream = self.probe.video_stream(path).await?;
                video_profile(path, stream.as_ref())?
            }
            MediaType::Unrecognized => {
                return Err(FileError::Unrecognized {
                    path: path.to_path_buf(),
                })
            }
        };

        tracing::debug!(
            "Classified {:?}: {} {} {}",
            path,
            profile.media_type,
            profile.orientation,
            profile.dimensions
        );
        Ok(profile)
    }
}

/// Orientation of an image from its EXIF tag, falling back to its dimensions.
///
/// Tags 5-8 (quarter turns) are portrait, any other present tag is landscape.
pub fn image_orientation(meta: &ImageMetadata) -> Orientation {
    match meta.exif_orientation {
        Some(5..=8) => {
            tracing::debug!("Found [exif:274] based orientation");
            Orientation::Portrait
        }
        Some(_) => {
            tracing::debug!("Found [exif:274] based orientation");
            Orientation::Landscape
        }
        None => {
            tracing::debug!("Found [width:height] based orientation");
            Orientation::from_dimensions(meta.dimensions)
        }
    }
}

fn image_profile(meta: &ImageMetadata) -> MediaProfile {
    let transpose = meta.exif_orientation.and_then(Transpose::from_exif);
    let dimensions = match transpose {
        Some(_) => meta.dimensions.transposed(),
        None => meta.dimensions,
    };
    MediaProfile {
        media_type: MediaType::Image,
        orientation: image_orientation(meta),
        dimensions,
        transpose,
    }
}

/// Rotation found in a video stream's metadata, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rotation {
    /// `rotate` container tag
    Tag(f64),
    /// Display-matrix side data
    SideData(f64),
}

impl Rotation {
    /// Whether the rotation swaps the frame's axes.
    ///
    /// Side data counts only an exact quarter turn either way (`|r| / 90 == 1`).
    /// A tag is normalized to `[0, 360)` first, so 90 and 270 both count.
    pub fn is_quarter_turn(self) -> bool {
        match self {
            Rotation::Tag(degrees) => {
                let normalized = degrees.rem_euclid(360.0);
                normalized == 90.0 || normalized == 270.0
            }
            Rotation::SideData(degrees) => degrees.abs() == 90.0,
        }
    }
}

/// Rotation applied to a video stream.
///
/// The `rotate` container tag wins over display-matrix side data; a tag that
/// does not parse as a number is ignored.
pub fn video_rotation(stream: &VideoStream) -> Option<Rotation> {
    if let Some(tag) = stream.rotate_tag() {
        match tag.trim().parse::<f64>() {
            Ok(degrees) => {
                tracing::debug!("Found [stream:tags:rotate] rotation {degrees}");
                return Some(Rotation::Tag(degrees));
            }
            Err(_) => tracing::warn!("Ignoring unparsable rotate tag [{tag}]"),
        }
    }

    let degrees = stream.side_data_rotation()?;
    tracing::debug!("Found [stream:side_data_list:rotation] rotation {degrees}");
    Some(Rotation::SideData(degrees))
}

/// Orientation of a video.
///
/// A stream with a rotation is portrait exactly when the rotation is a quarter
/// turn. Without rotation the coded dimensions decide. A file without any
/// video stream is landscape.
pub fn video_orientation(path: &Path, stream: Option<&VideoStream>) -> Result<Orientation, FileError> {
    let rotation = stream.and_then(video_rotation);
    rotated_orientation(path, stream, rotation)
}

fn rotated_orientation(
    path: &Path,
    stream: Option<&VideoStream>,
    rotation: Option<Rotation>,
) -> Result<Orientation, FileError> {
    let Some(stream) = stream else {
        tracing::debug!("No video stream found in {:?}, assuming landscape", path);
        return Ok(Orientation::Landscape);
    };

    if let Some(rotation) = rotation {
        return Ok(if rotation.is_quarter_turn() {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        });
    }

    let dims = stream.dimensions().ok_or_else(|| FileError::Dimensions {
        path: path.to_path_buf(),
        message: "video stream has no width/height".to_string(),
    })?;
    tracing::debug!("Found [width:height] based orientation");
    Ok(Orientation::from_dimensions(dims))
}

fn video_profile(path: &Path, stream: Option<&VideoStream>) -> Result<MediaProfile, FileError> {
    let rotation = stream.and_then(video_rotation);
    let orientation = rotated_orientation(path, stream, rotation)?;

    let stream = stream.ok_or_else(|| FileError::Dimensions {
        path: path.to_path_buf(),
        message: "no decodable video stream".to_string(),
    })?;
    let coded = stream.dimensions().ok_or_else(|| FileError::Dimensions {
        path: path.to_path_buf(),
        message: "video stream has no width/height".to_string(),
    })?;

    // The engine auto-rotates video, so overlay geometry sees the display frame
    let dimensions = match rotation {
        Some(rotation) if rotation.is_quarter_turn() => coded.transposed(),
        _ => coded,
    };

    Ok(MediaProfile {
        media_type: MediaType::Video,
        orientation,
        dimensions,
        transpose: None,
    })
}
