//! Configuration module for foldercat.
//!
//! This module turns the shell's arguments into a validated configuration
//! that drives a merge run. It handles:
//! - Validation of the source folder
//! - Exclude pattern compilation
//! - Converter program and timeout resolution
//! - Naming of temp and output files
//!
//! Nothing is persisted; every run is configured from arguments and
//! environment variables only.

use anyhow::{Context, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::convert::AppKind;
use crate::error::{FolderCatError, Result};

/// Prefix of the intermediate PDFs written next to the originals.
pub const TEMP_PREFIX: &str = "__temp_";

/// Suffix appended to the folder name to form the output file name.
pub const MERGED_SUFFIX: &str = "_merged.pdf";

/// Default converter program (LibreOffice-compatible command line).
pub const DEFAULT_OFFICE_PROGRAM: &str = "soffice";

/// Default bound on a single external conversion.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Programs and limits used by the document converters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterSettings {
    /// Program used for word-processor, spreadsheet and presentation files.
    pub office_program: PathBuf,

    /// Program used for Korean word-processor (`hwp`, `hwpx`) files.
    pub hwp_program: PathBuf,

    /// Upper bound for one conversion; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            office_program: PathBuf::from(DEFAULT_OFFICE_PROGRAM),
            hwp_program: PathBuf::from(DEFAULT_OFFICE_PROGRAM),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl ConverterSettings {
    /// Program responsible for the given application kind.
    pub fn program_for(&self, kind: AppKind) -> &Path {
        match kind {
            AppKind::Hangul => &self.hwp_program,
            AppKind::Word | AppKind::Spreadsheet | AppKind::Presentation => &self.office_program,
        }
    }
}

/// Parse a timeout given in seconds.
///
/// `0` and `none` disable the limit.
///
/// # Examples
///
/// ```
/// use foldercat::config::parse_timeout;
/// use std::time::Duration;
///
/// assert_eq!(parse_timeout("30").unwrap(), Some(Duration::from_secs(30)));
/// assert_eq!(parse_timeout("none").unwrap(), None);
/// ```
pub fn parse_timeout(s: &str) -> anyhow::Result<Option<Duration>> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    let secs: u64 = s
        .parse()
        .with_context(|| format!("Invalid timeout: {s}. Expected a number of seconds"))?;

    if secs > 24 * 60 * 60 {
        bail!("Timeout of {secs}s is longer than a day");
    }

    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

/// Complete configuration for one merge run.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Folder whose documents are merged.
    pub folder: PathBuf,

    /// Glob patterns of file names to leave out of the listing.
    pub exclude: Vec<String>,

    /// Converter programs and limits.
    pub converters: ConverterSettings,

    /// List what would be merged without converting or writing.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,
}

impl Config {
    /// Configuration for a folder with every other setting at its default.
    pub fn for_folder(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            ..Default::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder is not a directory or an exclude
    /// pattern does not compile.
    pub fn validate(&self) -> Result<()> {
        if !self.folder.is_dir() {
            return Err(FolderCatError::NotADirectory {
                path: self.folder.clone(),
            });
        }

        if self.quiet && self.verbose {
            return Err(FolderCatError::invalid_config(
                "Cannot be both quiet and verbose",
            ));
        }

        self.exclude_set()?;
        Ok(())
    }

    /// Compile the exclude patterns, if any.
    pub fn exclude_set(&self) -> Result<Option<GlobSet>> {
        if self.exclude.is_empty() {
            return Ok(None);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            let glob = Glob::new(pattern).map_err(|e| {
                FolderCatError::invalid_config(format!("Invalid exclude pattern '{pattern}': {e}"))
            })?;
            builder.add(glob);
        }

        builder
            .build()
            .map(Some)
            .map_err(|e| FolderCatError::invalid_config(e.to_string()))
    }

    /// Path of the merged output inside the folder.
    pub fn output_path(&self) -> PathBuf {
        output_path_for(&self.folder)
    }
}

/// Name of the merged output for a folder: `<folder-name>_merged.pdf`.
///
/// # Examples
///
/// ```
/// use foldercat::config::merged_file_name;
/// use std::path::Path;
///
/// assert_eq!(merged_file_name(Path::new("/home/me/Reports")), "Reports_merged.pdf");
/// ```
pub fn merged_file_name(folder: &Path) -> String {
    let name = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            folder
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "folder".to_string());

    format!("{name}{MERGED_SUFFIX}")
}

/// Full output path for a folder.
pub fn output_path_for(folder: &Path) -> PathBuf {
    folder.join(merged_file_name(folder))
}

/// Name of the temp PDF that stands in for a converted file.
pub fn temp_pdf_name(stem: &str) -> String {
    format!("{TEMP_PREFIX}{stem}.pdf")
}
