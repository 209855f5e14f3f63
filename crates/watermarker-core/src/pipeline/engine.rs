//! External compositing engine.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::command::EngineCommand;
use crate::error::{ConfigError, FileError, WatermarkError};

/// Lines of engine stderr kept in a failure message.
const STDERR_TAIL_LINES: usize = 5;

/// Runs a compositing command to completion.
///
/// Errors are [`WatermarkError`] because an engine that cannot be started at
/// all is a configuration failure, while a failed run only affects its file.
#[async_trait]
pub trait CompositingEngine: Send + Sync {
    async fn run(&self, command: &EngineCommand, input: &Path) -> Result<(), WatermarkError>;
}

/// Engine backed by a child process with a per-run timeout.
pub struct FfmpegEngine {
    timeout: Duration,
}

impl FfmpegEngine {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CompositingEngine for FfmpegEngine {
    async fn run(&self, command: &EngineCommand, input: &Path) -> Result<(), WatermarkError> {
        tracing::debug!("Running: {}", command);

        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Err(_) => {
                return Err(FileError::Timeout {
                    path: input.to_path_buf(),
                    stage: "compositing",
                    timeout_ms: self.timeout.as_millis() as u64,
                }
                .into())
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::EngineUnavailable {
                    program: command.program.clone(),
                    message: e.to_string(),
                }
                .into())
            }
            Ok(Err(e)) => {
                return Err(FileError::Engine {
                    path: input.to_path_buf(),
                    status: "not started".to_string(),
                    stderr: e.to_string(),
                }
                .into())
            }
            Ok(Ok(output)) => output,
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stdout.lines().chain(stderr.lines()) {
            tracing::debug!(target: "engine_output", "{}", line);
        }

        if !output.status.success() {
            return Err(FileError::Engine {
                path: input.to_path_buf(),
                status: output.status.to_string(),
                stderr: stderr_tail(&stderr),
            }
            .into());
        }
        Ok(())
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join(" | ")
}
