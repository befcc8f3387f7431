//! PDF reading and loading operations.
//!
//! # Examples
//!
//! ```no_run
//! use foldercat::io::reader::PdfReader;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loaded = PdfReader::new().load(Path::new("a.pdf"))?;
//! println!("{} pages in {:?}", loaded.page_count, loaded.load_time);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{FolderCatError, Result};

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to load the document.
    pub load_time: Duration,
}

/// PDF reader with configurable loading behavior.
#[derive(Debug, Clone)]
pub struct PdfReader {
    /// Reject documents without pages.
    verify: bool,
}

impl PdfReader {
    /// Create a new PDF reader that rejects page-less documents.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Create a reader that accepts documents with zero pages.
    pub fn without_verification() -> Self {
        Self { verify: false }
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// Returns [`FolderCatError::FailedToLoadPdf`] if the file cannot be
    /// read or parsed, is encrypted, or (when verifying) has no pages.
    pub fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let start = Instant::now();

        let document = Document::load(path).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("encrypt") || msg.contains("password") {
                FolderCatError::failed_to_load_pdf(path.to_path_buf(), "PDF is encrypted")
            } else {
                FolderCatError::failed_to_load_pdf(path.to_path_buf(), msg)
            }
        })?;

        if document.is_encrypted() {
            return Err(FolderCatError::failed_to_load_pdf(
                path.to_path_buf(),
                "PDF is encrypted",
            ));
        }

        let page_count = document.get_pages().len();
        if self.verify && page_count == 0 {
            return Err(FolderCatError::failed_to_load_pdf(
                path.to_path_buf(),
                "PDF has no pages",
            ));
        }

        Ok(LoadedPdf {
            document,
            path: path.to_path_buf(),
            page_count,
            load_time: start.elapsed(),
        })
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}
