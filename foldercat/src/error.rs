//! Error types for foldercat.
//!
//! This module defines all error types that can occur while converting and
//! merging the documents of a folder. Errors fall into three categories:
//!
//! - **Conversion**: a single file could not be turned into a PDF (image
//!   decode failure, converter application unavailable, open or export
//!   failure). Recorded and skipped; the run continues.
//! - **Missing file**: a listed file (or its converted counterpart) is gone
//!   at merge time. Recorded and skipped; the run continues.
//! - **Fatal**: the run cannot produce an output (nothing listed, nothing
//!   left to merge, load/concatenate/write failure). Aborts the run; temp
//!   cleanup still happens.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;

/// Result type alias for foldercat operations.
pub type Result<T> = std::result::Result<T, FolderCatError>;

/// Coarse classification used for reporting and control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    /// Per-file conversion failure.
    Conversion,
    /// Per-file missing input or missing converted output.
    MissingFile,
    /// Run-aborting failure.
    Fatal,
}

/// Main error type for foldercat operations.
#[derive(Debug, thiserror::Error)]
pub enum FolderCatError {
    /// Image could not be decoded or re-encoded as PDF.
    #[error("Failed to convert image: {}\n  Reason: {reason}", .path.display())]
    ImageConversion {
        /// Source image.
        path: PathBuf,
        /// Decoder/encoder message.
        reason: String,
    },

    /// The converter application for a document type is not reachable.
    #[error("{app} is not available. Check that it is installed.\n  Reason: {reason}")]
    ApplicationUnavailable {
        /// Human-readable application name.
        app: String,
        /// Launch failure details.
        reason: String,
    },

    /// The converter application could not open the document.
    #[error("Failed to open document: {}\n  Reason: {reason}", .path.display())]
    DocumentOpenFailed {
        /// Document path.
        path: PathBuf,
        /// Failure details.
        reason: String,
    },

    /// The export-to-PDF call reported failure.
    #[error("Failed to export PDF: {}\n  Reason: {reason}", .path.display())]
    ExportFailed {
        /// Document path.
        path: PathBuf,
        /// Failure details.
        reason: String,
    },

    /// A listed file no longer exists at merge time.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Conversion claimed success but no PDF was left behind.
    #[error("PDF file was not produced for: {}", .path.display())]
    ConversionNotProduced {
        /// Original document.
        path: PathBuf,
    },

    /// The folder to merge is not a directory.
    #[error("Not a directory: {}", .path.display())]
    NotADirectory {
        /// Offending path.
        path: PathBuf,
    },

    /// The working list was empty when the run started.
    #[error("No files to merge are listed")]
    NoFilesToMerge,

    /// Every listed file failed, so nothing is left to concatenate.
    #[error("None of the {total} listed file(s) could be merged")]
    NothingToMerge {
        /// Number of files that were listed.
        total: usize,
    },

    /// Failed to load a PDF during concatenation.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", .path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Page tree manipulation failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// A merge is already running on this worker.
    #[error("A merge is already in progress")]
    Busy,

    /// The background worker died before reporting a result.
    #[error("Merge worker stopped unexpectedly: {reason}")]
    WorkerFailed {
        /// Details from the join/runtime failure.
        reason: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for FolderCatError {
    fn from(err: lopdf::Error) -> Self {
        Self::merge_failed(err.to_string())
    }
}

impl From<anyhow::Error> for FolderCatError {
    fn from(err: anyhow::Error) -> Self {
        Self::invalid_config(format!("{err:#}"))
    }
}

impl FolderCatError {
    /// Create an ImageConversion error.
    pub fn image_conversion(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::ImageConversion {
            path,
            reason: reason.into(),
        }
    }

    /// Create an ApplicationUnavailable error.
    pub fn application_unavailable(app: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ApplicationUnavailable {
            app: app.into(),
            reason: reason.into(),
        }
    }

    /// Create a DocumentOpenFailed error.
    pub fn open_failed(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::DocumentOpenFailed {
            path,
            reason: reason.into(),
        }
    }

    /// Create an ExportFailed error.
    pub fn export_failed(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::ExportFailed {
            path,
            reason: reason.into(),
        }
    }

    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ImageConversion { .. }
            | Self::ApplicationUnavailable { .. }
            | Self::DocumentOpenFailed { .. }
            | Self::ExportFailed { .. }
            | Self::ConversionNotProduced { .. } => ErrorCategory::Conversion,
            Self::FileNotFound { .. } => ErrorCategory::MissingFile,
            _ => ErrorCategory::Fatal,
        }
    }

    /// Check if this error only affects a single file (the run can continue).
    pub fn is_recoverable(&self) -> bool {
        self.category() != ErrorCategory::Fatal
    }

    /// Check if this error aborts the run.
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Fatal
    }

    /// Short, single-line reason suitable for a failure list.
    ///
    /// Drops the path prefix that the full `Display` carries, since the
    /// failure list already names the file.
    pub fn reason(&self) -> String {
        match self {
            Self::ImageConversion { reason, .. }
            | Self::DocumentOpenFailed { reason, .. }
            | Self::ExportFailed { reason, .. } => reason.clone(),
            Self::ApplicationUnavailable { app, reason } => {
                format!("{app} is not available ({reason})")
            }
            Self::FileNotFound { .. } => "file not found".to_string(),
            Self::ConversionNotProduced { .. } => "PDF file was not produced".to_string(),
            other => other.to_string(),
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotADirectory { .. } | Self::FileNotFound { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::NoFilesToMerge | Self::NothingToMerge { .. } => 1,
            Self::FailedToCreateOutput { .. } | Self::FailedToWrite { .. } | Self::Io { .. } => 5,
            Self::MergeFailed { .. } => 6,
            Self::ImageConversion { .. }
            | Self::ApplicationUnavailable { .. }
            | Self::DocumentOpenFailed { .. }
            | Self::ExportFailed { .. }
            | Self::ConversionNotProduced { .. } => 7,
            Self::Busy | Self::WorkerFailed { .. } => 8,
            Self::InvalidConfig { .. } | Self::Other { .. } => 1,
        }
    }
}
