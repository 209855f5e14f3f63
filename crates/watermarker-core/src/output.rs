//! Output path policy.

use std::path::{Path, PathBuf};

use crate::types::DiscoveredFile;

/// Where watermarked files are written and how they are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Output root; `None` writes each output next to its input
    pub root: Option<PathBuf>,
    /// Prepended to the input's file name
    pub prefix: String,
    /// Place outputs under the file's mirrored subdirectory
    pub keep_tree: bool,
}

impl OutputLayout {
    pub fn new(root: Option<PathBuf>, prefix: impl Into<String>, keep_tree: bool) -> Self {
        Self {
            root,
            prefix: prefix.into(),
            keep_tree,
        }
    }

    /// Output path of a discovered file. Pure function of the input path,
    /// its mirrored subdirectory and this layout.
    pub fn output_path(&self, file: &DiscoveredFile) -> PathBuf {
        let mut name = std::ffi::OsString::from(&self.prefix);
        if let Some(base) = file.path.file_name() {
            name.push(base);
        }

        let dir = match &self.root {
            Some(root) if self.keep_tree => root.join(&file.output_subdir),
            Some(root) => root.clone(),
            None => file
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        dir.join(name)
    }
}
