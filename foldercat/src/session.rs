//! The user-ordered working list.
//!
//! Starts as the folder's candidates in natural order. The user then moves
//! and removes entries; the final order is the order of the merged output.
//! Removing an entry only drops it from the list, never from disk.

use globset::GlobSet;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::pipeline::MergeRequest;
use crate::scan::{CandidateFile, list_candidates};

/// Reorderable list of files to merge, with a single selected entry.
#[derive(Debug, Clone)]
pub struct WorkingList {
    folder: PathBuf,
    exclude: Option<GlobSet>,
    files: Vec<CandidateFile>,
    selected: Option<usize>,
}

impl WorkingList {
    /// Enumerate `folder` into a fresh list.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be listed.
    pub fn load(folder: impl Into<PathBuf>, exclude: Option<GlobSet>) -> Result<Self> {
        let folder = folder.into();
        let files = list_candidates(&folder, exclude.as_ref())?;
        Ok(Self {
            folder,
            exclude,
            files,
            selected: None,
        })
    }

    /// A list over already-known files, kept in the given order.
    pub fn from_files(folder: impl Into<PathBuf>, files: Vec<CandidateFile>) -> Self {
        Self {
            folder: folder.into(),
            exclude: None,
            files,
            selected: None,
        }
    }

    /// Re-read the folder, discarding manual order and removals.
    pub fn reload(&mut self) -> Result<()> {
        self.files = list_candidates(&self.folder, self.exclude.as_ref())?;
        self.selected = None;
        Ok(())
    }

    /// Source folder.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Entries in list order.
    pub fn files(&self) -> &[CandidateFile] {
        &self.files
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Entry at `idx`.
    pub fn get(&self, idx: usize) -> Option<&CandidateFile> {
        self.files.get(idx)
    }

    /// Index of the selected entry.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Move the entry at `idx` one place up. The selection follows it.
    ///
    /// Returns `false` (and changes nothing) at the top or out of range.
    pub fn move_up(&mut self, idx: usize) -> bool {
        if idx == 0 || idx >= self.files.len() {
            return false;
        }
        self.files.swap(idx, idx - 1);
        self.selected = Some(idx - 1);
        true
    }

    /// Move the entry at `idx` one place down. The selection follows it.
    ///
    /// Returns `false` (and changes nothing) at the bottom or out of range.
    pub fn move_down(&mut self, idx: usize) -> bool {
        if idx + 1 >= self.files.len() {
            return false;
        }
        self.files.swap(idx, idx + 1);
        self.selected = Some(idx + 1);
        true
    }

    /// Drop the entry at `idx` from the list.
    ///
    /// The selection moves to the entry that took its place, or to the new
    /// last entry when the removed one was last. The file stays on disk.
    pub fn remove(&mut self, idx: usize) -> Option<CandidateFile> {
        if idx >= self.files.len() {
            return None;
        }
        let removed = self.files.remove(idx);
        self.selected = (!self.files.is_empty()).then(|| idx.min(self.files.len() - 1));
        tracing::debug!(file = %removed.path.display(), "removed from working list");
        Some(removed)
    }

    /// Snapshot the list as a merge request.
    pub fn to_request(&self) -> MergeRequest {
        MergeRequest::new(self.folder.clone(), self.files.clone())
    }
}
