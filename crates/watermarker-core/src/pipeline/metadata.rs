//! Image metadata: pixel dimensions and EXIF orientation.

use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::FileError;
use crate::types::Dimensions;

/// Metadata needed to place a watermark on an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMetadata {
    /// Coded (stored) dimensions
    pub dimensions: Dimensions,
    /// EXIF orientation tag (274), if present
    pub exif_orientation: Option<u32>,
}

/// Reads image metadata from disk.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Read dimensions and EXIF orientation.
    pub fn extract(path: &Path) -> Result<ImageMetadata, FileError> {
        Ok(ImageMetadata {
            dimensions: Self::dimensions(path)?,
            exif_orientation: Self::exif_orientation(path),
        })
    }

    /// Read the image header for its dimensions, guessing the format from content.
    pub fn dimensions(path: &Path) -> Result<Dimensions, FileError> {
        let unreadable = |message: String| FileError::Dimensions {
            path: path.to_path_buf(),
            message,
        };

        let (width, height) = image::ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| unreadable(e.to_string()))?
            .into_dimensions()
            .map_err(|e| unreadable(e.to_string()))?;

        if width == 0 || height == 0 {
            return Err(unreadable(format!("zero-sized image ({width}x{height})")));
        }
        Ok(Dimensions::new(width, height))
    }

    /// EXIF orientation tag, or `None` when the file has no readable EXIF.
    pub fn exif_orientation(path: &Path) -> Option<u32> {
        let file = File::open(path).ok()?;
        let mut reader = BufReader::new(file);
        let exif = Reader::new().read_from_container(&mut reader).ok()?;

        exif.get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|f| match &f.value {
                Value::Short(v) => v.first().map(|&x| x as u32),
                Value::Long(v) => v.first().copied(),
                _ => None,
            })
    }
}
