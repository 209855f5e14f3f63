//! Run setup: config loading, input validation, walker and watermarker creation.

use std::path::Path;

use watermarker_core::inputs::{
    prepare_output_dir, resolve_program, validate_inputs, validate_prefix, validate_watermark,
};
use watermarker_core::{
    Config, ConfigError, FileDiscovery, JobOptions, OutputLayout, Walk, Watermarker,
};

use super::RunArgs;

/// Everything a batch needs, assembled before any file is touched.
pub(crate) struct RunContext {
    pub watermarker: Watermarker,
    pub walk: Walk,
}

/// Load configuration from an explicit file, or from the default location.
///
/// An explicit file must exist; a missing default file means defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Validate inputs and placement, then discover files.
///
/// Every check here is fatal and runs before traversal starts. Nothing is
/// created on disk until all of them pass.
pub(crate) fn setup_run(args: &RunArgs, config: &Config) -> watermarker_core::Result<RunContext> {
    validate_inputs(&args.input)?;
    let watermark = validate_watermark(&args.watermark)?;
    validate_prefix(&args.prefix)?;

    let options = JobOptions {
        watermark: watermark.path.clone(),
        watermark_aspect_ratio: watermark.aspect_ratio(),
        layout: OutputLayout::new(args.output.clone(), &args.prefix, args.keep_output_tree),
        overwrite: args.overwrite,
    };
    let watermarker = Watermarker::new(config, options)?;

    let ffmpeg = resolve_program(&config.ffmpeg_path())?;
    let ffprobe = resolve_program(&config.ffprobe_path())?;
    tracing::debug!("Using {:?} and {:?}", ffmpeg, ffprobe);

    let mut discovery =
        FileDiscovery::new(args.keep_output_tree).with_classifier(watermarker.classifier());
    if let Some(output) = &args.output {
        prepare_output_dir(output)?;
        discovery = discovery.with_exclude(output);
    }
    let walk = discovery.walk(&args.input);

    Ok(RunContext { watermarker, walk })
}
