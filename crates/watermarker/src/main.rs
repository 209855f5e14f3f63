//! Watermarker CLI - batch-apply a watermark image onto images and videos.
//!
//! Files are discovered under the input paths, classified by content, and
//! composited with the watermark by an external engine (ffmpeg). Placement,
//! margins and relative size come from the configuration file.
//!
//! # Usage
//!
//! ```bash
//! # Watermark a directory into ./out, keeping its structure
//! watermarker --input ./photos --watermark logo.png --prefix wm_ \
//!     --output ./out --keep-output-tree
//!
//! # Watermark single files next to themselves, with engine output on the console
//! watermarker -i a.jpg b.mp4 -w logo.png -p wm_ -v 2
//! ```

use clap::Parser;
use std::process::ExitCode;
use watermarker_core::{ConfigError, ValidationError, WatermarkError};

mod cli;
mod logging;

/// Data or validation error (`EX_DATAERR`).
const EXIT_DATA_ERROR: u8 = 65;

/// Unexpected internal error (`EX_SOFTWARE`).
const EXIT_SOFTWARE_ERROR: u8 = 70;

/// Watermarker - batch-apply a watermark image onto images and videos.
#[derive(Parser, Debug)]
#[command(name = "watermarker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    args: cli::RunArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so report config failures with eprintln
    let config = match cli::load_config(cli.args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(EXIT_DATA_ERROR);
        }
    };
    logging::init(&config, cli.args.verbose, cli.args.json_logs);

    tracing::debug!("Watermarker v{}", watermarker_core::VERSION);

    match cli::execute(cli.args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Map a run failure to a process exit status.
fn exit_code(error: &anyhow::Error) -> u8 {
    let data_error = match error.downcast_ref::<WatermarkError>() {
        Some(e) => e.is_fatal(),
        None => error.is::<ValidationError>() || error.is::<ConfigError>(),
    };
    if data_error {
        EXIT_DATA_ERROR
    } else {
        EXIT_SOFTWARE_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watermarker_core::FileError;

    #[test]
    fn exit_codes() {
        let validation = anyhow::Error::from(WatermarkError::from(ValidationError::EmptyPrefix));
        assert_eq!(exit_code(&validation), EXIT_DATA_ERROR);

        let config = anyhow::Error::from(WatermarkError::from(ConfigError::InvalidPosition(
            "ZZ".into(),
        )));
        assert_eq!(exit_code(&config), EXIT_DATA_ERROR);

        let bare = anyhow::Error::from(ValidationError::NoInputs);
        assert_eq!(exit_code(&bare), EXIT_DATA_ERROR);

        let io = anyhow::Error::from(WatermarkError::from(std::io::Error::other("disk")));
        assert_eq!(exit_code(&io), EXIT_SOFTWARE_ERROR);

        let file = anyhow::Error::from(WatermarkError::from(FileError::Unrecognized {
            path: "a".into(),
        }));
        assert_eq!(exit_code(&file), EXIT_SOFTWARE_ERROR);

        assert_eq!(exit_code(&anyhow::anyhow!("boom")), EXIT_SOFTWARE_ERROR);
    }

    #[test]
    fn cli_parses_flattened_args() {
        let cli = Cli::try_parse_from(["watermarker", "-i", "in", "-w", "logo.png", "-p", "wm_"])
            .unwrap();
        assert_eq!(cli.args.prefix, "wm_");
    }
}
