//! Watermark target size from relative-size ratios.

use std::fmt;

use crate::geometry::RelativeSize;
use crate::types::{Dimensions, Orientation};

/// Target watermark size in pixels, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    pub width: f64,
    pub height: f64,
}

impl Scaling {
    /// Compute the watermark size for a host frame.
    ///
    /// Landscape frames size the watermark by height, portrait frames by width;
    /// the other side follows the watermark's own aspect ratio (width / height).
    pub fn compute(
        orientation: Orientation,
        frame: Dimensions,
        watermark_aspect_ratio: f64,
        relative_size: &RelativeSize,
    ) -> Self {
        let (width, height) = match orientation {
            Orientation::Landscape => {
                let height = frame.height as f64 * relative_size.height_ratio.percent() as f64 / 100.0;
                (watermark_aspect_ratio * height, height)
            }
            Orientation::Portrait => {
                let width = frame.width as f64 * relative_size.width_ratio.percent() as f64 / 100.0;
                (width, width / watermark_aspect_ratio)
            }
        };

        Self {
            width: round2(width),
            height: round2(height),
        }
    }
}

impl fmt::Display for Scaling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}:{:.2}", self.width, self.height)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Ratio;

    fn relative(height: u8, width: u8) -> RelativeSize {
        RelativeSize {
            height_ratio: Ratio::new(height).unwrap(),
            width_ratio: Ratio::new(width).unwrap(),
        }
    }

    #[test]
    fn test_landscape_scales_by_height() {
        let scaling = Scaling::compute(
            Orientation::Landscape,
            Dimensions::new(1500, 1000),
            2.0,
            &relative(10, 20),
        );
        assert_eq!(scaling.height, 100.0);
        assert_eq!(scaling.width, 200.0);
        assert_eq!(scaling.to_string(), "200.00:100.00");
    }

    #[test]
    fn test_portrait_scales_by_width() {
        let scaling = Scaling::compute(
            Orientation::Portrait,
            Dimensions::new(1080, 1920),
            4.0,
            &relative(5, 20),
        );
        assert_eq!(scaling.width, 216.0);
        assert_eq!(scaling.height, 54.0);
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        let scaling = Scaling::compute(
            Orientation::Landscape,
            Dimensions::new(1000, 333),
            1.0 / 3.0,
            &relative(10, 20),
        );
        assert_eq!(scaling.height, 33.3);
        assert_eq!(scaling.width, 11.1);
        assert_eq!(scaling.to_string(), "11.10:33.30");
    }
}
