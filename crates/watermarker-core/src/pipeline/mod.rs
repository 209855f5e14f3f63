//! Watermarking pipeline components.
//!
//! - **sniff**: Media type from content signatures
//! - **metadata**: Image dimensions and EXIF orientation
//! - **probe**: Metadata capability, backed by the image readers and ffprobe
//! - **classify**: Type, orientation and frame dimensions per file, memoized
//! - **discovery**: Find candidate files under input roots
//! - **command**: Assemble the compositing invocation
//! - **engine**: Run the compositing program
//! - **processor**: Orchestrates the per-file pipeline

pub mod classify;
pub mod command;
pub mod discovery;
pub mod engine;
pub mod metadata;
pub mod probe;
pub mod processor;
pub mod sniff;

// Re-exports for convenient access
pub use classify::MediaClassifier;
pub use command::{CommandBuilder, EngineCommand};
pub use discovery::{FileDiscovery, Walk};
pub use engine::{CompositingEngine, FfmpegEngine};
pub use metadata::{ImageMetadata, MetadataExtractor};
pub use probe::{MediaProbe, SystemProbe, VideoStream};
pub use processor::{JobOptions, Watermarker};
