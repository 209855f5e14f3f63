//! Core value types shared across the watermarking pipeline.

use std::fmt;
use std::path::PathBuf;

/// Media type as determined by content sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Image,
    Video,
    Unrecognized,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Image => write!(f, "image"),
            MediaType::Video => write!(f, "video"),
            MediaType::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

/// Geometric orientation of a media frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Orientation from plain width/height: ties are landscape.
    pub fn from_dimensions(dims: Dimensions) -> Self {
        if dims.width >= dims.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Landscape => write!(f, "landscape"),
            Orientation::Portrait => write!(f, "portrait"),
        }
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Swap width and height (quarter-turn rotation).
    pub fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Width divided by height.
    pub fn aspect_ratio(self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Rotation applied to an image before the overlay, from its EXIF orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transpose {
    /// EXIF 5: mirror along the main diagonal
    CounterClockwiseFlip,
    /// EXIF 6
    Clockwise,
    /// EXIF 7: mirror along the anti-diagonal
    ClockwiseFlip,
    /// EXIF 8
    CounterClockwise,
}

impl Transpose {
    /// Map an EXIF orientation tag to the rotation that makes it upright.
    ///
    /// Returns `None` for tags that keep the frame's axes (1-4) or are unknown.
    pub fn from_exif(tag: u32) -> Option<Self> {
        match tag {
            5 => Some(Transpose::CounterClockwiseFlip),
            6 => Some(Transpose::Clockwise),
            7 => Some(Transpose::ClockwiseFlip),
            8 => Some(Transpose::CounterClockwise),
            _ => None,
        }
    }

    /// Value of the engine's `transpose` filter option.
    pub fn filter_value(self) -> u8 {
        match self {
            Transpose::CounterClockwiseFlip => 0,
            Transpose::Clockwise => 1,
            Transpose::CounterClockwise => 2,
            Transpose::ClockwiseFlip => 3,
        }
    }
}

/// A candidate file found by the path walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Path to the input file
    pub path: PathBuf,
    /// Subdirectory under the output root (empty unless the tree is mirrored)
    pub output_subdir: PathBuf,
}

impl DiscoveredFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            output_subdir: PathBuf::new(),
        }
    }
}

/// Classification result for one file, memoized per path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaProfile {
    pub media_type: MediaType,
    pub orientation: Orientation,
    /// Dimensions of the frame the watermark is composited onto
    pub dimensions: Dimensions,
    /// Pre-rotation for images carrying a quarter-turn EXIF orientation
    pub transpose: Option<Transpose>,
}

/// A discovered file together with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub output_subdir: PathBuf,
    pub media_type: MediaType,
    pub orientation: Orientation,
    pub dimensions: Dimensions,
    pub transpose: Option<Transpose>,
}

impl MediaFile {
    pub fn new(file: &DiscoveredFile, profile: MediaProfile) -> Self {
        Self {
            path: file.path.clone(),
            output_subdir: file.output_subdir.clone(),
            media_type: profile.media_type,
            orientation: profile.orientation,
            dimensions: profile.dimensions,
            transpose: profile.transpose,
        }
    }
}

/// Final state of one file in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Output was written
    Succeeded { output: PathBuf },
    /// Output already existed and overwrite was not requested
    Skipped { output: PathBuf },
    /// Processing failed; the message is what was logged
    Failed { message: String },
}

/// Counts reported at the end of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Succeeded { .. } => self.succeeded += 1,
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.succeeded + self.skipped + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_dimensions() {
        assert_eq!(
            Orientation::from_dimensions(Dimensions::new(800, 600)),
            Orientation::Landscape
        );
        assert_eq!(
            Orientation::from_dimensions(Dimensions::new(600, 800)),
            Orientation::Portrait
        );
        assert_eq!(
            Orientation::from_dimensions(Dimensions::new(500, 500)),
            Orientation::Landscape
        );
    }

    #[test]
    fn test_transpose_from_exif() {
        assert_eq!(Transpose::from_exif(1), None);
        assert_eq!(Transpose::from_exif(3), None);
        assert_eq!(Transpose::from_exif(6).map(Transpose::filter_value), Some(1));
        assert_eq!(Transpose::from_exif(8).map(Transpose::filter_value), Some(2));
        assert_eq!(Transpose::from_exif(5).map(Transpose::filter_value), Some(0));
        assert_eq!(Transpose::from_exif(7).map(Transpose::filter_value), Some(3));
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = BatchSummary::default();
        summary.record(&FileOutcome::Succeeded {
            output: PathBuf::from("a"),
        });
        summary.record(&FileOutcome::Skipped {
            output: PathBuf::from("b"),
        });
        summary.record(&FileOutcome::Failed {
            message: "x".into(),
        });
        summary.record(&FileOutcome::Failed {
            message: "y".into(),
        });
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.total(), 4);
    }
}
