//! Pipeline orchestration - drives each file from discovery to composited output.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{FileError, Result};
use crate::geometry::{MarginCache, Overlay, Placement};
use crate::output::OutputLayout;
use crate::scaling::Scaling;
use crate::types::{BatchSummary, DiscoveredFile, FileOutcome, MediaFile, MediaType};

use super::classify::MediaClassifier;
use super::command::CommandBuilder;
use super::engine::{CompositingEngine, FfmpegEngine};
use super::probe::{MediaProbe, SystemProbe};

/// Options for one watermarking batch.
#[derive(Debug, Clone)]
pub struct JobOptions {
    /// Watermark image composited onto every file
    pub watermark: PathBuf,
    /// Width / height of the watermark image
    pub watermark_aspect_ratio: f64,
    /// Output naming and placement
    pub layout: OutputLayout,
    /// Replace outputs that already exist
    pub overwrite: bool,
}

/// Applies one watermark to a batch of files.
pub struct Watermarker {
    placement: Placement,
    margins: MarginCache,
    classifier: Arc<MediaClassifier>,
    commands: CommandBuilder,
    engine: Arc<dyn CompositingEngine>,
    options: JobOptions,
}

impl Watermarker {
    /// Create a watermarker using the configured probe and compositing programs.
    pub fn new(config: &Config, options: JobOptions) -> Result<Self> {
        let probe = Arc::new(SystemProbe::new(
            config.ffprobe_path(),
            Duration::from_millis(config.limits.probe_timeout_ms),
        ));
        let engine = Arc::new(FfmpegEngine::new(Duration::from_millis(
            config.limits.engine_timeout_ms,
        )));
        Self::with_backends(config, options, probe, engine)
    }

    /// Create a watermarker with explicit probe and engine implementations.
    ///
    /// Validates the watermark placement; an invalid position, margin or ratio
    /// fails here, before any file is looked at.
    pub fn with_backends(
        config: &Config,
        options: JobOptions,
        probe: Arc<dyn MediaProbe>,
        engine: Arc<dyn CompositingEngine>,
    ) -> Result<Self> {
        let placement = Placement::from_config(&config.watermark)?;
        tracing::debug!(
            "Placement: anchor {}, relative size {}%/{}%",
            placement.anchor,
            placement.relative_size.height_ratio.percent(),
            placement.relative_size.width_ratio.percent()
        );

        Ok(Self {
            margins: MarginCache::new(placement.margins),
            placement,
            classifier: Arc::new(MediaClassifier::new(probe)),
            commands: CommandBuilder::new(config.ffmpeg_path(), &options.watermark),
            engine,
            options,
        })
    }

    /// The validated placement in use.
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// The classifier whose cache this watermarker reads from.
    ///
    /// Share it with [`FileDiscovery`](super::FileDiscovery) so files are
    /// sniffed once.
    pub fn classifier(&self) -> Arc<MediaClassifier> {
        Arc::clone(&self.classifier)
    }

    /// Process every file in order.
    ///
    /// See [`Watermarker::run_with`].
    pub async fn run(&self, files: &[DiscoveredFile]) -> Result<BatchSummary> {
        self.run_with(files, |_, _| {}).await
    }

    /// Process every file in order, reporting each outcome to `observer`.
    ///
    /// A fatal error aborts the batch and is returned. Any other error is
    /// logged, counted as a failure, and the batch moves on.
    pub async fn run_with<F>(&self, files: &[DiscoveredFile], mut observer: F) -> Result<BatchSummary>
    where
        F: FnMut(&DiscoveredFile, &FileOutcome),
    {
        let mut summary = BatchSummary::default();

        for file in files {
            let outcome = match self.process_file(file).await {
                Ok(outcome) => outcome,
                Err(e) if e.is_fatal() => {
                    tracing::error!("Aborting batch at {:?}: {}", file.path, e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", file.path, e);
                    FileOutcome::Failed {
                        message: e.to_string(),
                    }
                }
            };
            summary.record(&outcome);
            observer(file, &outcome);
        }

        tracing::info!(
            "Batch finished: {} succeeded, {} skipped, {} failed",
            summary.succeeded,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    /// Watermark a single file.
    pub async fn process_file(&self, file: &DiscoveredFile) -> Result<FileOutcome> {
        let start = std::time::Instant::now();
        let output = self.options.layout.output_path(file);

        if !self.options.overwrite && output.exists() {
            tracing::info!("Skipping {:?}: output {:?} already exists", file.path, output);
            return Ok(FileOutcome::Skipped { output });
        }

        let profile = self.classifier.profile(&file.path).await?;
        let media = MediaFile::new(file, profile);
        tracing::debug!(
            "Processing {:?}: {} {} {}",
            media.path,
            media.media_type,
            media.orientation,
            media.dimensions
        );

        let margins = self.margins.resolve(media.dimensions);
        for side in self.placement.cropped_sides(&margins, media.dimensions) {
            tracing::warn!(
                "{} margin of {}px exceeds {:?} ({}), the watermark will be cropped",
                side.name(),
                margins.get(side),
                media.path,
                media.dimensions
            );
        }

        let overlay = Overlay::new(self.placement.anchor, &margins);
        let scaling = Scaling::compute(
            media.orientation,
            media.dimensions,
            self.options.watermark_aspect_ratio,
            &self.placement.relative_size,
        );
        let transpose = match media.media_type {
            MediaType::Image => media.transpose,
            _ => None,
        };
        let command = self
            .commands
            .build(&media.path, &output, &overlay, &scaling, transpose);

        if self.options.layout.keep_tree {
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| FileError::OutputDir {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        self.engine.run(&command, &media.path).await?;

        tracing::debug!("Watermarked {:?} -> {:?} in {:?}", media.path, output, start.elapsed());
        Ok(FileOutcome::Succeeded { output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, WatermarkError};
    use crate::pipeline::command::EngineCommand;
    use crate::pipeline::metadata::ImageMetadata;
    use crate::pipeline::probe::VideoStream;
    use crate::types::Dimensions;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    const JPEG: [u8; 6] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    /// Every image is 1000x500 except files named `broken*`.
    struct FakeProbe;

    #[async_trait]
    impl MediaProbe for FakeProbe {
        async fn image_metadata(&self, path: &Path) -> std::result::Result<ImageMetadata, FileError> {
            let name = path.file_name().unwrap().to_string_lossy();
            if name.starts_with("broken") {
                return Err(FileError::Dimensions {
                    path: path.to_path_buf(),
                    message: "no size".into(),
                });
            }
            Ok(ImageMetadata {
                dimensions: Dimensions::new(1000, 500),
                exif_orientation: None,
            })
        }

        async fn video_stream(&self, _path: &Path) -> std::result::Result<Option<VideoStream>, FileError> {
            Ok(None)
        }
    }

    /// Records commands and writes the output file named by the last argument.
    #[derive(Default)]
    struct FakeEngine {
        commands: Mutex<Vec<EngineCommand>>,
        unavailable: bool,
    }

    impl FakeEngine {
        fn calls(&self) -> usize {
            self.commands.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompositingEngine for FakeEngine {
        async fn run(&self, command: &EngineCommand, _input: &Path) -> Result<()> {
            if self.unavailable {
                return Err(ConfigError::EngineUnavailable {
                    program: command.program.clone(),
                    message: "gone".into(),
                }
                .into());
            }
            self.commands.lock().unwrap().push(command.clone());
            let output = command.args.last().unwrap();
            std::fs::write(output, b"watermarked").unwrap();
            Ok(())
        }
    }

    fn image(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, JPEG).unwrap();
    }

    fn options(out: &Path, keep_tree: bool) -> JobOptions {
        JobOptions {
            watermark: PathBuf::from("logo.png"),
            watermark_aspect_ratio: 2.0,
            layout: OutputLayout::new(Some(out.to_path_buf()), "wm_", keep_tree),
            overwrite: false,
        }
    }

    fn watermarker(config: &Config, options: JobOptions, engine: Arc<FakeEngine>) -> Result<Watermarker> {
        Watermarker::with_backends(config, options, Arc::new(FakeProbe), engine)
    }

    #[tokio::test]
    async fn test_second_run_skips_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.jpg");
        image(&input);
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let files = vec![DiscoveredFile::new(&input)];

        let engine = Arc::new(FakeEngine::default());
        let wm = watermarker(&Config::default(), options(&out, false), engine.clone()).unwrap();

        let first = wm.run(&files).await.unwrap();
        assert_eq!(first.succeeded, 1);
        std::fs::write(out.join("wm_a.jpg"), b"first run").unwrap();

        let second = wm.run(&files).await.unwrap();
        assert_eq!(second.skipped, 1);
        assert_eq!(engine.calls(), 1);
        assert_eq!(std::fs::read(out.join("wm_a.jpg")).unwrap(), b"first run");
    }

    #[tokio::test]
    async fn test_overwrite_reprocesses() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.jpg");
        image(&input);
        std::fs::write(dir.path().join("wm_a.jpg"), b"old").unwrap();

        let engine = Arc::new(FakeEngine::default());
        let mut opts = options(dir.path(), false);
        opts.overwrite = true;
        let wm = watermarker(&Config::default(), opts, engine.clone()).unwrap();

        let summary = wm.run(&[DiscoveredFile::new(&input)]).await.unwrap();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(engine.calls(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_file_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let names = ["a.jpg", "broken.jpg", "c.jpg"];
        let files: Vec<_> = names
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                image(&path);
                DiscoveredFile::new(path)
            })
            .collect();

        let engine = Arc::new(FakeEngine::default());
        let wm = watermarker(&Config::default(), options(&out, false), engine.clone()).unwrap();

        let mut seen = Vec::new();
        let summary = wm
            .run_with(&files, |file, outcome| {
                seen.push((file.path.clone(), matches!(outcome, FileOutcome::Failed { .. })))
            })
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(seen.len(), 3);
        assert!(seen[1].1);
        assert!(out.join("wm_a.jpg").exists());
        assert!(out.join("wm_c.jpg").exists());
        assert!(!out.join("wm_broken.jpg").exists());
    }

    #[tokio::test]
    async fn test_invalid_position_fails_before_processing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.jpg");
        image(&input);

        let mut config = Config::default();
        config.watermark.position = "ZZ".to_string();
        let engine = Arc::new(FakeEngine::default());

        let err = watermarker(&config, options(dir.path(), false), engine.clone())
            .err()
            .unwrap();
        assert!(err.is_fatal());
        assert!(matches!(err, WatermarkError::Config(ConfigError::InvalidPosition(_))));
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_engine_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<_> = ["a.jpg", "b.jpg"]
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                image(&path);
                DiscoveredFile::new(path)
            })
            .collect();

        let engine = Arc::new(FakeEngine {
            unavailable: true,
            ..Default::default()
        });
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let wm = watermarker(&Config::default(), options(&out, false), engine).unwrap();

        let mut observed = 0;
        let err = wm.run_with(&files, |_, _| observed += 1).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(observed, 0);
    }

    #[tokio::test]
    async fn test_keep_tree_creates_mirrored_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in/sub/a.jpg");
        image(&input);
        let out = dir.path().join("out");
        let file = DiscoveredFile {
            path: input,
            output_subdir: PathBuf::from("in/sub"),
        };

        let engine = Arc::new(FakeEngine::default());
        let wm = watermarker(&Config::default(), options(&out, true), engine.clone()).unwrap();

        let outcome = wm.process_file(&file).await.unwrap();
        assert_eq!(
            outcome,
            FileOutcome::Succeeded {
                output: out.join("in/sub/wm_a.jpg")
            }
        );
        assert!(out.join("in/sub/wm_a.jpg").exists());
    }

    #[tokio::test]
    async fn test_command_carries_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.jpg");
        image(&input);

        let mut config = Config::default();
        config.watermark.margins.east = "10%".to_string();
        config.watermark.margins.south = "25px".to_string();
        config.watermark.relative_size.height_ratio = "10%".to_string();
        let engine = Arc::new(FakeEngine::default());
        let wm = watermarker(&config, options(dir.path(), false), engine.clone()).unwrap();

        wm.process_file(&DiscoveredFile::new(&input)).await.unwrap();

        let commands = engine.commands.lock().unwrap();
        let graph = commands[0].args[6].to_str().unwrap().to_string();
        // 1000x500 landscape: height 10% = 50, width 2.0 * 50 = 100, east 10% of 1000
        assert_eq!(
            graph,
            "[1:v]scale=100.00:50.00[wtrmrk];[0:v][wtrmrk]overlay=W-w-100:H-h-25"
        );
    }

    #[tokio::test]
    async fn test_unrecognized_file_fails_alone() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("notes.txt");
        std::fs::write(&text, "hello").unwrap();

        let engine = Arc::new(FakeEngine::default());
        let wm = watermarker(&Config::default(), options(dir.path(), false), engine.clone()).unwrap();

        let summary = wm.run(&[DiscoveredFile::new(&text)]).await.unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn test_discovery_shares_type_cache() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("in");
        let input = root.join("a.jpg");
        image(&input);

        let engine = Arc::new(FakeEngine::default());
        let wm = watermarker(&Config::default(), options(dir.path(), false), engine.clone()).unwrap();
        let walk = crate::pipeline::FileDiscovery::new(false)
            .with_classifier(wm.classifier())
            .walk(&[root]);
        assert_eq!(walk.files.len(), 1);

        // The type sniffed during discovery is reused, not read again
        std::fs::write(&input, "no longer a jpeg").unwrap();
        let summary = wm.run(&walk.files).await.unwrap();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(engine.calls(), 1);
    }
}
