//! Watermarker Core - batch watermark placement and compositing orchestration.
//!
//! The library classifies media files, turns a declarative watermark
//! placement into per-file overlay and scaling geometry, and drives an
//! external compositing engine over a batch with per-file failure isolation.
//!
//! # Architecture
//!
//! ```text
//! Walk → Classify → Margins + Overlay + Scaling → Command → Engine → Output
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use watermarker_core::{Config, FileDiscovery, JobOptions, OutputLayout, Watermarker};
//!
//! #[tokio::main]
//! async fn main() -> watermarker_core::Result<()> {
//!     let config = Config::load()?;
//!     let watermark = watermarker_core::inputs::validate_watermark("logo.png".as_ref())?;
//!     let options = JobOptions {
//!         watermark: watermark.path.clone(),
//!         watermark_aspect_ratio: watermark.aspect_ratio(),
//!         layout: OutputLayout::new(Some("out".into()), "wm_", false),
//!         overwrite: false,
//!     };
//!     let watermarker = Watermarker::new(&config, options)?;
//!
//!     let walk = FileDiscovery::new(false).walk(&["photos".into()]);
//!     let summary = watermarker.run(&walk.files).await?;
//!     println!("{} watermarked", summary.succeeded);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod inputs;
pub mod output;
pub mod pipeline;
pub mod scaling;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{
    ConfigError, FileError, FileResult, Result, TraversalError, ValidationError, WatermarkError,
};
pub use geometry::{Anchor, MarginCache, Overlay, Placement};
pub use inputs::WatermarkImage;
pub use output::OutputLayout;
pub use pipeline::{FileDiscovery, JobOptions, Walk, Watermarker};
pub use scaling::Scaling;
pub use types::{
    BatchSummary, Dimensions, DiscoveredFile, FileOutcome, MediaFile, MediaType, Orientation,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
