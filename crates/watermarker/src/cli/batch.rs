//! Batch execution with progress tracking and a final summary.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use watermarker_core::{BatchSummary, FileOutcome};

use super::setup::RunContext;

/// Watermark every discovered file, showing progress unless verbose logging is on.
pub(crate) async fn run_batch(ctx: RunContext, verbose: u8) -> anyhow::Result<()> {
    let RunContext { watermarker, walk } = ctx;

    let progress = if verbose == 0 {
        create_progress_bar(walk.files.len() as u64)
    } else {
        ProgressBar::hidden()
    };

    let start_time = Instant::now();
    let result = watermarker
        .run_with(&walk.files, |file, outcome| {
            progress.inc(1);
            let name = file
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match outcome {
                FileOutcome::Failed { .. } => progress.set_message(format!("failed: {name}")),
                _ => progress.set_message(name),
            }
        })
        .await;
    progress.finish_and_clear();

    let summary = result?;
    print_summary(&summary, walk.errors.len(), start_time.elapsed());
    Ok(())
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after a batch.
fn print_summary(summary: &BatchSummary, traversal_errors: usize, elapsed: Duration) {
    let rate = if elapsed.as_secs_f64() > 0.0 {
        summary.total() as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", summary.succeeded);
    eprintln!("    Skipped:      {:>8}", summary.skipped);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    if traversal_errors > 0 {
        eprintln!("    Unreadable:   {:>8}", traversal_errors);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.total());
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} files/sec", rate);
    eprintln!("  ====================================");
}
