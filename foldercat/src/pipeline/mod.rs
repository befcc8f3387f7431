//! The merge run: convert, resolve, concatenate, write, clean up.
//!
//! A run walks through the [`Phase`]s in order. Per-file problems are
//! recorded in the [`MergeReport`] and never stop the run; only an empty
//! list, an empty resolution, or a concatenation/write failure does. Temp
//! PDFs are removed on every exit path.
//!
//! # Examples
//!
//! ```no_run
//! use foldercat::config::ConverterSettings;
//! use foldercat::pipeline::{LogObserver, MergeRequest, Pipeline};
//! use foldercat::scan::list_candidates;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> foldercat::Result<()> {
//! let folder = Path::new("/data/Reports");
//! let request = MergeRequest::new(folder, list_candidates(folder, None)?);
//!
//! let pipeline = Pipeline::with_settings(ConverterSettings::default());
//! let report = pipeline.run(&request, Arc::new(LogObserver)).await?;
//! println!("{} of {} files merged", report.succeeded(), report.total);
//! # Ok(())
//! # }
//! ```

pub mod report;
pub mod temp;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;

use crate::config::{ConverterSettings, output_path_for};
use crate::convert::{AppLauncher, CommandLauncher, DocumentConverter, convert_image};
use crate::error::{FolderCatError, Result};
use crate::io::PdfWriter;
use crate::merge::Concatenator;
use crate::scan::{CandidateFile, FileKind};

pub use report::{FileFailure, MergeReport};
pub use temp::TempRegistry;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// No run in progress.
    Idle,
    /// Turning images into temp PDFs.
    ConvertingImages,
    /// Turning documents into temp PDFs.
    ConvertingDocuments,
    /// Appending the resolved PDFs.
    Concatenating,
    /// Writing the merged file.
    Writing,
    /// The merged file is written.
    Done,
}

impl Phase {
    /// Label shown next to the progress bar.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Waiting",
            Self::ConvertingImages => "Converting images",
            Self::ConvertingDocuments => "Converting documents",
            Self::Concatenating => "Merging PDFs",
            Self::Writing => "Saving file",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receives progress and log lines from a running merge.
///
/// Called from the thread doing the work; implementations forward to
/// whoever renders.
pub trait MergeObserver: Send + Sync {
    /// Overall progress in percent (0 to 100) and the current phase.
    fn progress(&self, percent: u8, phase: Phase);

    /// A timestamped log line (`[HH:MM:SS] message`).
    fn log(&self, line: &str);
}

/// Observer that forwards log lines to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl MergeObserver for LogObserver {
    fn progress(&self, percent: u8, phase: Phase) {
        tracing::debug!(percent, phase = phase.label(), "progress");
    }

    fn log(&self, line: &str) {
        tracing::info!("{line}");
    }
}

/// What to merge: the folder and its files in the user's order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// Source folder; temp files and the output are written here.
    pub folder: PathBuf,

    /// Files to merge, in output order.
    pub files: Vec<CandidateFile>,
}

impl MergeRequest {
    /// Create a request.
    pub fn new(folder: impl Into<PathBuf>, files: Vec<CandidateFile>) -> Self {
        Self {
            folder: folder.into(),
            files,
        }
    }

    /// Path the merged file will be written to.
    pub fn output_path(&self) -> PathBuf {
        output_path_for(&self.folder)
    }
}

/// Result of converting one non-PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The temp PDF was written.
    Converted,
    /// Conversion failed; the file is left out.
    Failed(FileFailure),
}

/// Bookkeeping for one non-PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRecord {
    /// The listed file.
    pub source: PathBuf,

    /// Where its temp PDF was (to be) written.
    pub temp: PathBuf,

    /// What happened.
    pub outcome: ConversionOutcome,
}

impl ConversionRecord {
    /// Whether the temp PDF was written.
    pub fn is_converted(&self) -> bool {
        self.outcome == ConversionOutcome::Converted
    }
}

/// Timestamps log lines and clamps progress for an observer.
#[derive(Clone)]
struct Reporter {
    observer: Arc<dyn MergeObserver>,
}

impl Reporter {
    fn log(&self, message: &str) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.observer.log(&format!("[{stamp}] {message}"));
    }

    fn progress(&self, percent: f64, phase: Phase) {
        self.observer.progress(percent.clamp(0.0, 100.0) as u8, phase);
    }
}

/// Runs merges.
///
/// Cheap to clone; clones share the per-application conversion locks.
#[derive(Clone)]
pub struct Pipeline {
    converter: DocumentConverter,
    concatenator: Concatenator,
    writer: PdfWriter,
}

impl Pipeline {
    /// Create a pipeline that launches document converters via `launcher`.
    pub fn new(launcher: Arc<dyn AppLauncher>) -> Self {
        Self {
            converter: DocumentConverter::new(launcher),
            concatenator: Concatenator::new(),
            writer: PdfWriter::new(),
        }
    }

    /// Create a pipeline using the command-line converter backend.
    pub fn with_settings(settings: ConverterSettings) -> Self {
        Self::new(Arc::new(CommandLauncher::new(settings)))
    }

    /// Run a merge.
    ///
    /// # Errors
    ///
    /// - [`FolderCatError::NoFilesToMerge`] if the request lists no files;
    ///   nothing is converted or written
    /// - [`FolderCatError::NothingToMerge`] if no listed file could be
    ///   resolved to a PDF
    /// - load, concatenation and write errors, which are all fatal
    ///
    /// Temp PDFs created by the run are deleted before this returns, on
    /// success and on error.
    pub async fn run(
        &self,
        request: &MergeRequest,
        observer: Arc<dyn MergeObserver>,
    ) -> Result<MergeReport> {
        let reporter = Reporter { observer };

        if request.files.is_empty() {
            reporter.log("No files to merge are listed.");
            return Err(FolderCatError::NoFilesToMerge);
        }

        reporter.progress(0.0, Phase::ConvertingImages);

        let mut temps = TempRegistry::new();
        let outcome = self.execute(request, &reporter, &mut temps).await;

        if let Err(e) = &outcome {
            reporter.log(&format!("Error: the merge failed. {e}"));
        }

        reporter.log("Removing temporary files.");
        let removed = temps.cleanup();
        tracing::debug!(removed, "temp files removed");

        outcome
    }

    async fn execute(
        &self,
        request: &MergeRequest,
        reporter: &Reporter,
        temps: &mut TempRegistry,
    ) -> Result<MergeReport> {
        let folder = request.folder.as_path();
        let files = &request.files;
        let total = files.len();

        let mut records: Vec<Option<ConversionRecord>> = vec![None; total];
        let mut failures: Vec<(usize, FileFailure)> = Vec::new();
        let mut attempted = 0usize;

        let images: Vec<usize> = indices_where(files, |k| k == FileKind::Image);
        if !images.is_empty() {
            reporter.log("Converting image files to PDF...");
        }
        for idx in images {
            let file = &files[idx];
            reporter.progress(attempted as f64 / total as f64 * 50.0, Phase::ConvertingImages);
            reporter.log(&format!("  -> Converting: {}", file.name()));

            let temp = temps.allocate(folder, file);
            let result = if file.path.is_file() {
                let (src, dest) = (file.path.clone(), temp.clone());
                task::spawn_blocking(move || convert_image(&src, &dest))
                    .await
                    .unwrap_or_else(|e| {
                        Err(FolderCatError::image_conversion(
                            file.path.clone(),
                            format!("conversion task failed: {e}"),
                        ))
                    })
            } else {
                Err(FolderCatError::file_not_found(file.path.clone()))
            };

            records[idx] = Some(record(reporter, file, temp, result, &mut failures, idx));
            attempted += 1;
        }

        let documents: Vec<usize> = indices_where(files, |k| matches!(k, FileKind::Document(_)));
        if !documents.is_empty() {
            reporter.log("Converting document files to PDF...");
        }
        for idx in documents {
            let file = &files[idx];
            let FileKind::Document(app) = file.kind else {
                continue;
            };
            reporter.progress(
                50.0 + attempted as f64 / total as f64 * 30.0,
                Phase::ConvertingDocuments,
            );
            reporter.log(&format!("  -> Converting: {}", file.name()));

            let temp = temps.allocate(folder, file);
            let result = if file.path.is_file() {
                self.converter
                    .convert(app, file.path.clone(), temp.clone())
                    .await
            } else {
                Err(FolderCatError::file_not_found(file.path.clone()))
            };

            records[idx] = Some(record(reporter, file, temp, result, &mut failures, idx));
            attempted += 1;
        }

        reporter.progress(80.0, Phase::Concatenating);
        reporter.log("Starting PDF merge...");

        let (inputs, merged) = resolve(files, &records, reporter, &mut failures);
        failures.sort_by_key(|(idx, _)| *idx);
        let failures: Vec<FileFailure> = failures.into_iter().map(|(_, f)| f).collect();

        if inputs.is_empty() {
            return Err(FolderCatError::NothingToMerge { total });
        }

        let concatenator = self.concatenator.clone();
        let progress = reporter.clone();
        let names = merged.clone();
        let concatenated = task::spawn_blocking(move || {
            concatenator.concatenate(&inputs, |k, n, _| {
                progress.log(&format!("  -> Appending: {}", names[k - 1]));
                progress.progress(80.0 + k as f64 / n as f64 * 15.0, Phase::Concatenating);
            })
        })
        .await
        .map_err(|e| FolderCatError::merge_failed(format!("Merge task failed: {e}")))??;

        reporter.progress(95.0, Phase::Writing);
        let output = request.output_path();
        let stats = self.writer.save(concatenated.document, &output).await?;
        reporter.progress(100.0, Phase::Done);

        let report = MergeReport {
            total,
            merged,
            failures,
            output: Some(output),
            pages: stats.page_count,
        };
        for line in report.summary_lines() {
            reporter.log(&line);
        }

        Ok(report)
    }
}

fn indices_where(files: &[CandidateFile], pred: impl Fn(FileKind) -> bool) -> Vec<usize> {
    files
        .iter()
        .enumerate()
        .filter(|(_, f)| pred(f.kind))
        .map(|(i, _)| i)
        .collect()
}

/// Log a conversion result and turn it into a record.
fn record(
    reporter: &Reporter,
    file: &CandidateFile,
    temp: PathBuf,
    result: Result<()>,
    failures: &mut Vec<(usize, FileFailure)>,
    idx: usize,
) -> ConversionRecord {
    let outcome = match result {
        Ok(()) => {
            reporter.log(&format!("  ✓ Converted: {}", file.name()));
            ConversionOutcome::Converted
        }
        Err(e) => {
            let failure = FileFailure::from_error(file.name(), &e);
            reporter.log(&format!(
                "  ⚠ Conversion failed: {} - {}",
                file.name(),
                failure.reason
            ));
            tracing::debug!(src = %file.path.display(), error = %e, "conversion failed");
            failures.push((idx, failure.clone()));
            ConversionOutcome::Failed(failure)
        }
    };

    ConversionRecord {
        source: file.path.clone(),
        temp,
        outcome,
    }
}

/// Map the user's list onto loadable PDFs, keeping list order.
///
/// Returns the PDF paths and the listed names they stand for.
fn resolve(
    files: &[CandidateFile],
    records: &[Option<ConversionRecord>],
    reporter: &Reporter,
    failures: &mut Vec<(usize, FileFailure)>,
) -> (Vec<PathBuf>, Vec<String>) {
    let mut inputs = Vec::new();
    let mut merged = Vec::new();

    for (idx, file) in files.iter().enumerate() {
        let candidate: Option<&Path> = match (&file.kind, &records[idx]) {
            (FileKind::Pdf, _) => Some(file.path.as_path()),
            (_, Some(rec)) if rec.is_converted() => Some(rec.temp.as_path()),
            _ => {
                reporter.log(&format!("  ⚠ Skipping: {} (conversion failed)", file.name()));
                None
            }
        };
        let Some(path) = candidate else {
            continue;
        };

        if path.is_file() {
            inputs.push(path.to_path_buf());
            merged.push(file.name());
        } else {
            let err = FolderCatError::file_not_found(file.path.clone());
            reporter.log(&format!("  ⚠ Skipping: {} ({})", file.name(), err.reason()));
            failures.push((idx, FileFailure::from_error(file.name(), &err)));
        }
    }

    (inputs, merged)
}
