//! File discovery for finding media under input roots.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::{DirEntry, WalkDir};

use super::classify::MediaClassifier;
use super::sniff::sniff_file;
use crate::error::{FileError, TraversalError};
use crate::types::{DiscoveredFile, MediaType};

/// Discovers image and video files under input roots.
#[derive(Clone, Default)]
pub struct FileDiscovery {
    keep_tree: bool,
    exclude: Option<PathBuf>,
    classifier: Option<Arc<MediaClassifier>>,
}

/// Result of walking a set of roots: what was found and what could not be read.
#[derive(Debug, Default)]
pub struct Walk {
    pub files: Vec<DiscoveredFile>,
    pub errors: Vec<TraversalError>,
}

impl FileDiscovery {
    /// Create a walker. With `keep_tree`, each file records the subdirectory
    /// mirroring its location under the root it was found in.
    pub fn new(keep_tree: bool) -> Self {
        Self {
            keep_tree,
            exclude: None,
            classifier: None,
        }
    }

    /// Detect media types through `classifier`, so later stages reuse the
    /// cached result instead of reading the file again.
    pub fn with_classifier(mut self, classifier: Arc<MediaClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Never descend into `dir` (typically the output root).
    pub fn with_exclude(mut self, dir: impl AsRef<Path>) -> Self {
        self.exclude = dir.as_ref().canonicalize().ok();
        self
    }

    /// Walk every root in order.
    ///
    /// Never fails: unreadable entries are logged, collected in
    /// [`Walk::errors`] and skipped.
    pub fn walk(&self, roots: &[PathBuf]) -> Walk {
        let mut walk = Walk::default();
        for root in roots {
            self.discover(root, &mut walk);
        }
        tracing::debug!(
            "Discovered {} files ({} traversal errors)",
            walk.files.len(),
            walk.errors.len()
        );
        walk
    }

    /// Discover candidates under a single root.
    ///
    /// A root that is a file is emitted as is, with an empty output
    /// subdirectory. Files inside directories are kept only when their content
    /// sniffs as image or video.
    pub fn discover(&self, root: &Path, walk: &mut Walk) {
        match std::fs::metadata(root) {
            Ok(meta) if meta.is_file() => {
                walk.files.push(DiscoveredFile::new(root));
                return;
            }
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                tracing::warn!("Skipping {:?}: not a file or directory", root);
                return;
            }
            Err(e) => {
                record(walk, TraversalError::new(Some(root), e.to_string()));
                return;
            }
        }

        let root_name = root_name(root);
        let entries = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry));

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf);
                    let message = match e.loop_ancestor() {
                        Some(ancestor) => format!("filesystem loop back to {:?}", ancestor),
                        None => e.to_string(),
                    };
                    record(walk, TraversalError { path, message });
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }
            if !file_type.is_file() {
                tracing::debug!("Skipping {:?}: not a regular file", entry.path());
                continue;
            }

            match self.media_type(entry.path()) {
                Ok(MediaType::Image | MediaType::Video) => {
                    let output_subdir = if self.keep_tree {
                        mirrored_subdir(&root_name, root, entry.path())
                    } else {
                        PathBuf::new()
                    };
                    walk.files.push(DiscoveredFile {
                        path: entry.into_path(),
                        output_subdir,
                    });
                }
                Ok(MediaType::Unrecognized) => {
                    tracing::debug!("Skipping {:?}: not an image or video", entry.path());
                }
                Err(e) => record(walk, TraversalError::new(Some(entry.path()), e.to_string())),
            }
        }
    }

    fn media_type(&self, path: &Path) -> Result<MediaType, FileError> {
        let Some(classifier) = &self.classifier else {
            return sniff_file(path);
        };
        match classifier.classify(path) {
            Err(FileError::Unrecognized { .. }) => Ok(MediaType::Unrecognized),
            other => other,
        }
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        let Some(exclude) = &self.exclude else {
            return false;
        };
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let excluded = entry
            .path()
            .canonicalize()
            .map(|p| &p == exclude)
            .unwrap_or(false);
        if excluded {
            tracing::debug!("Not descending into output directory {:?}", entry.path());
        }
        excluded
    }
}

fn record(walk: &mut Walk, error: TraversalError) {
    tracing::warn!("{}", error);
    walk.errors.push(error);
}

/// Last component of a root, resolving `.` and `..` through the filesystem.
fn root_name(root: &Path) -> PathBuf {
    root.file_name()
        .map(PathBuf::from)
        .or_else(|| {
            root.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(PathBuf::from))
        })
        .unwrap_or_default()
}

/// Output subdirectory for `file` found under `root`: the root's name followed
/// by the file's parent directories relative to the root.
fn mirrored_subdir(root_name: &Path, root: &Path, file: &Path) -> PathBuf {
    let relative_parent = file
        .parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .unwrap_or_else(|| Path::new(""));
    root_name.join(relative_parent)
}
