//! Tracking and removal of the intermediate PDFs a run writes.

use std::path::{Path, PathBuf};

use crate::config::temp_pdf_name;
use crate::scan::CandidateFile;

/// Temp PDFs created by one run.
///
/// Every path is deleted by [`TempRegistry::cleanup`], which also runs on
/// drop, so an early return or a panic unwinding through the run still
/// removes them.
#[derive(Debug, Default)]
pub struct TempRegistry {
    paths: Vec<PathBuf>,
}

impl TempRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the temp path for `file` inside `folder` and register it.
    ///
    /// The name is `__temp_<stem>.pdf`. When another file of this run
    /// already claimed that name (`a.png` next to `a.docx`), the full file
    /// name is tried next (`__temp_a.docx.pdf`), then numbered variants of
    /// it (`__temp_a.docx_1.pdf`) until one is free.
    pub fn allocate(&mut self, folder: &Path, file: &CandidateFile) -> PathBuf {
        let name = file.name();
        let mut path = folder.join(temp_pdf_name(&file.stem()));
        if self.contains(&path) {
            path = folder.join(temp_pdf_name(&name));
        }
        let mut n = 1;
        while self.contains(&path) {
            path = folder.join(temp_pdf_name(&format!("{name}_{n}")));
            n += 1;
        }
        self.register(path.clone());
        path
    }

    /// Register a path for deletion.
    pub fn register(&mut self, path: PathBuf) {
        if !self.contains(&path) {
            self.paths.push(path);
        }
    }

    /// Whether `path` is registered.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Registered paths, in registration order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Number of registered paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Delete every registered path that still exists.
    ///
    /// Returns the number of files removed. Failures are logged and do not
    /// stop the remaining deletions. The registry is empty afterwards.
    pub fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for path in self.paths.drain(..) {
            if !path.exists() {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove temp file")
                }
            }
        }
        removed
    }
}

impl Drop for TempRegistry {
    fn drop(&mut self) {
        self.cleanup();
    }
}
