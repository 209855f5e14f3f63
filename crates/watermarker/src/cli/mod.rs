//! The watermarking run: arguments, setup and batch execution.

mod batch;
mod setup;

use clap::Args;
use std::path::PathBuf;
use watermarker_core::Config;

use batch::run_batch;
use setup::setup_run;

pub use setup::load_config;

/// Arguments for a watermarking run.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Image/video files or directories to watermark
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Watermark image
    #[arg(short, long)]
    pub watermark: PathBuf,

    /// Output filename prefix (letters, digits, '_', '-', '.')
    #[arg(short, long)]
    pub prefix: String,

    /// Output directory, created if absent (defaults to next to each input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Verbosity: 1 = debug logging, 2 = debug plus compositing engine output
    #[arg(
        short,
        long,
        env = "WATERMARKER_VERBOSE",
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..=2)
    )]
    pub verbose: u8,

    /// Mirror input subdirectories under the output directory
    #[arg(short, long)]
    pub keep_output_tree: bool,

    /// Replace outputs that already exist
    #[arg(long)]
    pub overwrite: bool,

    /// Configuration file (defaults to the platform config location)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output logs in JSON format
    #[arg(long)]
    pub json_logs: bool,
}

/// Execute a watermarking run.
pub async fn execute(args: RunArgs, config: Config) -> anyhow::Result<()> {
    let ctx = setup_run(&args, &config)?;

    if ctx.walk.files.is_empty() {
        tracing::warn!("No image or video files found under {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} file(s) to watermark", ctx.walk.files.len());

    run_batch(ctx, args.verbose).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        args: RunArgs,
    }

    fn parse(argv: &[&str]) -> Result<RunArgs, clap::Error> {
        TestCli::try_parse_from(std::iter::once("watermarker").chain(argv.iter().copied()))
            .map(|cli| cli.args)
    }

    #[test]
    fn run_args_multiple_inputs() {
        let args = parse(&["-i", "a", "b", "-w", "logo.png", "-p", "wm_"]).unwrap();
        assert_eq!(args.input, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(args.prefix, "wm_");
        assert!(args.output.is_none());
        assert!(!args.keep_output_tree);
        assert!(!args.overwrite);
    }

    #[test]
    fn run_args_input_is_required() {
        assert!(parse(&["-w", "logo.png", "-p", "wm_"]).is_err());
    }

    #[test]
    fn run_args_verbose_range() {
        let args = parse(&["-i", "a", "-w", "l", "-p", "x", "-v", "2"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert!(parse(&["-i", "a", "-w", "l", "-p", "x", "-v", "3"]).is_err());
    }

    #[test]
    fn run_args_flags() {
        let args = parse(&[
            "--input",
            "in",
            "--watermark",
            "logo.png",
            "--prefix",
            "wm_",
            "--output",
            "out",
            "--keep-output-tree",
            "--overwrite",
            "--json-logs",
        ])
        .unwrap();
        assert_eq!(args.output, Some(PathBuf::from("out")));
        assert!(args.keep_output_tree);
        assert!(args.overwrite);
        assert!(args.json_logs);
    }
}
