//! Watermark placement geometry.
//!
//! Turns the declarative `[watermark]` configuration into a validated
//! [`Placement`], resolves margins to pixels for a given frame, and renders the
//! overlay coordinate expression the compositing engine evaluates.
//!
//! In expressions `W`/`H` are the host frame's width/height and `w`/`h` the
//! scaled watermark's width/height.

mod cache;

pub use cache::MarginCache;

use std::fmt;
use std::str::FromStr;

use crate::config::WatermarkConfig;
use crate::error::ConfigError;
use crate::types::Dimensions;

/// One of the nine anchor points of the host frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    NorthEast,
    NorthCenter,
    NorthWest,
    CenterEast,
    Center,
    CenterWest,
    SouthEast,
    SouthCenter,
    SouthWest,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::NorthEast,
        Anchor::NorthCenter,
        Anchor::NorthWest,
        Anchor::CenterEast,
        Anchor::Center,
        Anchor::CenterWest,
        Anchor::SouthEast,
        Anchor::SouthCenter,
        Anchor::SouthWest,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Anchor::NorthEast => "NE",
            Anchor::NorthCenter => "NC",
            Anchor::NorthWest => "NW",
            Anchor::CenterEast => "CE",
            Anchor::Center => "C",
            Anchor::CenterWest => "CW",
            Anchor::SouthEast => "SE",
            Anchor::SouthCenter => "SC",
            Anchor::SouthWest => "SW",
        }
    }

    /// Margins that actually move the watermark at this anchor.
    pub fn relevant_sides(self) -> &'static [Side] {
        match self {
            Anchor::NorthEast => &[Side::East, Side::Nord],
            Anchor::NorthCenter => &[Side::Nord],
            Anchor::NorthWest => &[Side::West, Side::Nord],
            Anchor::CenterEast => &[Side::East],
            Anchor::Center => &[],
            Anchor::CenterWest => &[Side::West],
            Anchor::SouthEast => &[Side::East, Side::South],
            Anchor::SouthCenter => &[Side::South],
            Anchor::SouthWest => &[Side::West, Side::South],
        }
    }
}

impl FromStr for Anchor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Anchor::ALL
            .into_iter()
            .find(|anchor| anchor.code() == s)
            .ok_or_else(|| ConfigError::InvalidPosition(s.to_string()))
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Named edge of the host frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Nord,
    South,
    East,
    West,
}

impl Side {
    pub fn name(self) -> &'static str {
        match self {
            Side::Nord => "nord",
            Side::South => "south",
            Side::East => "east",
            Side::West => "west",
        }
    }

    /// Frame dimension the margin is measured against.
    pub fn basis(self, dims: Dimensions) -> u32 {
        match self {
            Side::Nord | Side::South => dims.height,
            Side::East | Side::West => dims.width,
        }
    }
}

/// A margin as configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Margin {
    /// Share of the axis-relevant dimension, 0-100
    Percent(u8),
    /// Absolute pixels
    Pixels(u32),
}

impl Margin {
    /// Parse `<int>%` or `<int>px`; anything else is a configuration error.
    pub fn parse(side: Side, value: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidMargin {
            side: side.name(),
            value: value.to_string(),
        };

        if let Some(digits) = value.strip_suffix('%') {
            let percent = parse_unsigned(digits).ok_or_else(invalid)?;
            if percent > 100 {
                return Err(invalid());
            }
            Ok(Margin::Percent(percent as u8))
        } else if let Some(digits) = value.strip_suffix("px") {
            let pixels = parse_unsigned(digits).ok_or_else(invalid)?;
            u32::try_from(pixels).map(Margin::Pixels).map_err(|_| invalid())
        } else {
            Err(invalid())
        }
    }

    /// Resolve to pixels against the given basis, rounding half up.
    pub fn to_pixels(self, basis: u32) -> u32 {
        match self {
            Margin::Percent(p) => ((basis as u64 * p as u64 + 50) / 100) as u32,
            Margin::Pixels(px) => px,
        }
    }
}

/// The four configured margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Margins {
    pub nord: Margin,
    pub south: Margin,
    pub east: Margin,
    pub west: Margin,
}

impl Margins {
    /// Resolve every margin against its own axis: nord/south use the height,
    /// east/west the width.
    pub fn in_pixels(&self, dims: Dimensions) -> MarginsPx {
        MarginsPx {
            nord: self.nord.to_pixels(Side::Nord.basis(dims)),
            south: self.south.to_pixels(Side::South.basis(dims)),
            east: self.east.to_pixels(Side::East.basis(dims)),
            west: self.west.to_pixels(Side::West.basis(dims)),
        }
    }
}

/// Margins resolved for one frame size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MarginsPx {
    pub nord: u32,
    pub south: u32,
    pub east: u32,
    pub west: u32,
}

impl MarginsPx {
    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Nord => self.nord,
            Side::South => self.south,
            Side::East => self.east,
            Side::West => self.west,
        }
    }
}

/// A relative size percentage, 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ratio(u8);

impl Ratio {
    pub fn new(percent: u8) -> Option<Self> {
        (percent <= 100).then_some(Self(percent))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    fn parse(key: &'static str, value: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidRatio {
            key,
            value: value.to_string(),
        };
        let digits = value.strip_suffix('%').ok_or_else(invalid)?;
        let percent = parse_unsigned(digits).ok_or_else(invalid)?;
        u8::try_from(percent)
            .ok()
            .and_then(Ratio::new)
            .ok_or_else(invalid)
    }
}

/// Watermark size relative to the host frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelativeSize {
    /// Used for landscape frames, against their height
    pub height_ratio: Ratio,
    /// Used for portrait frames, against their width
    pub width_ratio: Ratio,
}

impl RelativeSize {
    /// Keys of ratios set to 0%.
    ///
    /// A zero scale target makes the engine keep the watermark's native size,
    /// not hide it.
    pub fn zero_ratios(&self) -> Vec<&'static str> {
        [
            ("height_ratio", self.height_ratio),
            ("width_ratio", self.width_ratio),
        ]
        .into_iter()
        .filter(|(_, ratio)| ratio.percent() == 0)
        .map(|(key, _)| key)
        .collect()
    }
}

/// Validated watermark placement. Built once at startup, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub anchor: Anchor,
    pub margins: Margins,
    pub relative_size: RelativeSize,
}

impl Placement {
    /// Validate the raw watermark section. Never coerces bad values.
    pub fn from_config(config: &WatermarkConfig) -> Result<Self, ConfigError> {
        let margins = &config.margins;
        let placement = Self {
            anchor: config.position.parse()?,
            margins: Margins {
                nord: Margin::parse(Side::Nord, &margins.nord)?,
                south: Margin::parse(Side::South, &margins.south)?,
                east: Margin::parse(Side::East, &margins.east)?,
                west: Margin::parse(Side::West, &margins.west)?,
            },
            relative_size: RelativeSize {
                height_ratio: Ratio::parse("height_ratio", &config.relative_size.height_ratio)?,
                width_ratio: Ratio::parse("width_ratio", &config.relative_size.width_ratio)?,
            },
        };

        for key in placement.relative_size.zero_ratios() {
            tracing::warn!(
                "relative_size.{key} is 0%: the watermark will keep its original size on matching files"
            );
        }
        Ok(placement)
    }

    /// Sides whose resolved margin exceeds the frame, among those the anchor uses.
    ///
    /// A non-empty result means the watermark will be visibly cropped.
    pub fn cropped_sides(&self, margins: &MarginsPx, dims: Dimensions) -> Vec<Side> {
        self.anchor
            .relevant_sides()
            .iter()
            .copied()
            .filter(|side| margins.get(*side) > side.basis(dims))
            .collect()
    }
}

/// Overlay coordinate expression, rendered as `x:y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay(String);

impl Overlay {
    pub fn new(anchor: Anchor, m: &MarginsPx) -> Self {
        let expr = match anchor {
            Anchor::NorthEast => format!("W-w-{}:{}", m.east, m.nord),
            Anchor::NorthCenter => format!("W/2-w/2:{}", m.nord),
            Anchor::NorthWest => format!("{}:{}", m.west, m.nord),
            Anchor::CenterEast => format!("W-w-{}:H/2-h/2", m.east),
            Anchor::Center => "W/2-w/2:H/2-h/2".to_string(),
            Anchor::CenterWest => format!("{}:H/2-h/2", m.west),
            Anchor::SouthEast => format!("W-w-{}:H-h-{}", m.east, m.south),
            Anchor::SouthCenter => format!("W/2-w/2:H-h-{}", m.south),
            Anchor::SouthWest => format!("{}:H-h-{}", m.west, m.south),
        };
        Self(expr)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-negative decimal integer with no sign, spaces or fraction.
fn parse_unsigned(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
