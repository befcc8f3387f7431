//! PDF writing and saving operations.
//!
//! Writes are atomic by default: the document is serialized to a sibling
//! `.tmp` file which is then renamed over the destination, so a failed run
//! never leaves a truncated merged file behind.
//!
//! # Examples
//!
//! ```no_run
//! use foldercat::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let stats = PdfWriter::new().save(doc, Path::new("Reports_merged.pdf")).await?;
//! println!("Wrote {}", stats.format_file_size());
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{FolderCatError, Result};

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Write to a temp file, then rename.
    pub atomic: bool,

    /// Compress content streams before writing.
    pub compress: bool,

    /// Renumber objects into a dense range.
    pub optimize: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compress: true,
            optimize: true,
            buffer_size: 64 * 1024,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Number of pages in the written document.
    pub page_count: usize,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer that writes the destination in place.
    ///
    /// Used for intermediate files whose partial state is never observed.
    pub fn non_atomic() -> Self {
        Self {
            options: WriteOptions {
                atomic: false,
                optimize: false,
                ..Default::default()
            },
        }
    }

    /// Serialize `doc` to `path` on the current thread.
    ///
    /// # Errors
    ///
    /// Returns [`FolderCatError::FailedToCreateOutput`] if the file cannot be
    /// created and [`FolderCatError::FailedToWrite`] if serialization or the
    /// final rename fails. On error no file is left at `path` or at the
    /// temp location.
    pub fn write(&self, doc: &mut Document, path: &Path) -> Result<WriteStatistics> {
        let start = Instant::now();

        if self.options.compress {
            doc.compress();
        }
        if self.options.optimize {
            doc.renumber_objects();
        }

        let write_path = if self.options.atomic {
            path.with_extension("tmp")
        } else {
            path.to_path_buf()
        };

        if let Err(e) = self.write_file(doc, &write_path) {
            let _ = std::fs::remove_file(&write_path);
            return Err(e);
        }

        if self.options.atomic {
            std::fs::rename(&write_path, path).map_err(|e| {
                let _ = std::fs::remove_file(&write_path);
                FolderCatError::FailedToWrite {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }

        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        Ok(WriteStatistics {
            write_time: start.elapsed(),
            file_size,
            output_path: path.to_path_buf(),
            page_count: doc.get_pages().len(),
        })
    }

    fn write_file(&self, doc: &mut Document, write_path: &Path) -> Result<()> {
        let file = std::fs::File::create(write_path).map_err(|e| {
            FolderCatError::FailedToCreateOutput {
                path: write_path.to_path_buf(),
                source: e,
            }
        })?;

        let mut writer = std::io::BufWriter::with_capacity(self.options.buffer_size, file);

        doc.save_to(&mut writer)
            .map_err(|e| FolderCatError::FailedToWrite {
                path: write_path.to_path_buf(),
                source: std::io::Error::other(e),
            })?;

        writer.flush().map_err(|e| FolderCatError::FailedToWrite {
            path: write_path.to_path_buf(),
            source: e,
        })
    }

    /// Save a PDF from async code, serializing on the blocking pool.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use foldercat::io::writer::PdfWriter;
    /// # use lopdf::Document;
    /// # use std::path::Path;
    /// # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
    /// let stats = PdfWriter::new().save(doc, Path::new("output.pdf")).await?;
    /// println!("Wrote {} in {:?}", stats.format_file_size(), stats.write_time);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn save(&self, doc: Document, path: &Path) -> Result<WriteStatistics> {
        let writer = self.clone();
        let path = path.to_path_buf();
        let mut doc = doc;

        task::spawn_blocking(move || writer.write(&mut doc, &path))
            .await
            .map_err(|e| FolderCatError::other(format!("Write task failed: {e}")))?
    }
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
