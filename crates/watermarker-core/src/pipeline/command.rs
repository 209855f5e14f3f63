//! Compositing engine invocation assembly.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::geometry::Overlay;
use crate::scaling::Scaling;
use crate::types::Transpose;

/// Label of the scaled watermark stream inside the filter graph.
const WATERMARK_LABEL: &str = "wtrmrk";

/// Label of the pre-rotated host frame inside the filter graph.
const BASE_LABEL: &str = "base";

/// Program and argument list for one compositing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Builds engine invocations for one configured program and watermark.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: PathBuf,
    watermark: PathBuf,
}

impl CommandBuilder {
    pub fn new(program: impl Into<PathBuf>, watermark: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            watermark: watermark.into(),
        }
    }

    /// Full invocation compositing the watermark onto `input`, written to `output`.
    pub fn build(
        &self,
        input: &Path,
        output: &Path,
        overlay: &Overlay,
        scaling: &Scaling,
        transpose: Option<Transpose>,
    ) -> EngineCommand {
        let mut args: Vec<OsString> = vec!["-y".into()];
        if transpose.is_some() {
            // The graph already rotates the frame
            args.push("-noautorotate".into());
        }
        args.extend([
            "-i".into(),
            input.as_os_str().to_owned(),
            "-i".into(),
            self.watermark.as_os_str().to_owned(),
            "-filter_complex".into(),
            filter_graph(overlay, scaling, transpose).into(),
            output.as_os_str().to_owned(),
        ]);

        EngineCommand {
            program: self.program.clone(),
            args,
        }
    }
}

/// Filter graph `{transpose}{scaling}{overlay}`.
pub fn filter_graph(overlay: &Overlay, scaling: &Scaling, transpose: Option<Transpose>) -> String {
    let (transpose_clause, base) = match transpose {
        Some(t) => (
            format!("[0:v]transpose={}[{BASE_LABEL}];", t.filter_value()),
            BASE_LABEL,
        ),
        None => (String::new(), "0:v"),
    };
    format!("{transpose_clause}[1:v]scale={scaling}[{WATERMARK_LABEL}];[{base}][{WATERMARK_LABEL}]overlay={overlay}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Anchor, MarginsPx};

    fn overlay() -> Overlay {
        Overlay::new(
            Anchor::SouthEast,
            &MarginsPx {
                nord: 0,
                south: 20,
                east: 30,
                west: 0,
            },
        )
    }

    fn scaling() -> Scaling {
        Scaling {
            width: 200.0,
            height: 100.0,
        }
    }

    #[test]
    fn test_filter_graph_without_transpose() {
        assert_eq!(
            filter_graph(&overlay(), &scaling(), None),
            "[1:v]scale=200.00:100.00[wtrmrk];[0:v][wtrmrk]overlay=W-w-30:H-h-20"
        );
    }

    #[test]
    fn test_filter_graph_with_transpose() {
        assert_eq!(
            filter_graph(&overlay(), &scaling(), Some(Transpose::Clockwise)),
            "[0:v]transpose=1[base];[1:v]scale=200.00:100.00[wtrmrk];[base][wtrmrk]overlay=W-w-30:H-h-20"
        );
    }

    #[test]
    fn test_build_argument_order() {
        let builder = CommandBuilder::new("ffmpeg", "logo.png");
        let cmd = builder.build(
            Path::new("in/a.jpg"),
            Path::new("out/wm_a.jpg"),
            &overlay(),
            &scaling(),
            None,
        );
        assert_eq!(cmd.program, PathBuf::from("ffmpeg"));
        let args: Vec<_> = cmd.args.iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "in/a.jpg",
                "-i",
                "logo.png",
                "-filter_complex",
                "[1:v]scale=200.00:100.00[wtrmrk];[0:v][wtrmrk]overlay=W-w-30:H-h-20",
                "out/wm_a.jpg",
            ]
        );
    }

    #[test]
    fn test_build_disables_autorotate_when_transposing() {
        let builder = CommandBuilder::new("ffmpeg", "logo.png");
        let cmd = builder.build(
            Path::new("a.jpg"),
            Path::new("wm_a.jpg"),
            &overlay(),
            &scaling(),
            Some(Transpose::CounterClockwise),
        );
        assert_eq!(cmd.args[1], OsString::from("-noautorotate"));
        assert_eq!(cmd.args[2], OsString::from("-i"));
        assert!(cmd.to_string().contains("transpose=2[base]"));
    }
}
