//! Logging initialization and configuration.
//!
//! Two `tracing` layers share one registry: the console on stderr, filtered by
//! verbosity, and a persistent log file that always records debug output,
//! including the compositing engine's own output.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};
use watermarker_core::Config;

/// Target under which compositing engine output is logged.
const ENGINE_OUTPUT_TARGET: &str = "engine_output";

/// Console filter directive for a verbosity level.
///
/// 0 uses the configured level, 1 is debug, 2 is debug plus engine output.
pub fn console_directive(verbose: u8, configured_level: &str) -> String {
    match verbose {
        0 => format!("{configured_level},{ENGINE_OUTPUT_TARGET}=off"),
        1 => format!("debug,{ENGINE_OUTPUT_TARGET}=off"),
        _ => "debug".to_string(),
    }
}

/// Initialize the logging subsystem.
///
/// # Notes
///
/// - Console output goes to stderr
/// - The RUST_LOG environment variable overrides the console filter
/// - A log file that cannot be opened disables file logging with a warning
pub fn init(config: &Config, verbose: u8, json_logs: bool) {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_directive(verbose, &config.logging.level)));
    let json_format = json_logs || config.logging.format == "json";

    let console = if json_format {
        // JSON format for machine parsing
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        // Pretty format for humans
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .boxed()
    }
    .with_filter(console_filter);

    let log_path = config.log_file();
    let file = match open_log_file(&log_path) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(EnvFilter::new("debug")),
        ),
        Err(e) => {
            eprintln!("Warning: cannot open log file {:?}: {e}. Logging to console only.", log_path);
            None
        }
    };

    tracing_subscriber::registry().with(console).with(file).init();
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_directive_levels() {
        assert_eq!(console_directive(0, "info"), "info,engine_output=off");
        assert_eq!(console_directive(0, "warn"), "warn,engine_output=off");
        assert_eq!(console_directive(1, "info"), "debug,engine_output=off");
        assert_eq!(console_directive(2, "info"), "debug");
    }

    #[test]
    fn log_file_parent_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/watermarker.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
