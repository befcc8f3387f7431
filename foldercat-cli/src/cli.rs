//! CLI argument parsing for foldercat.
//!
//! This module defines the command-line interface structure using `clap`.
//! It is also compiled by the build script to render the man page, so it
//! only depends on `clap` and the `foldercat` library.

use clap::Parser;
use std::path::PathBuf;

use foldercat::config::{Config, ConverterSettings, DEFAULT_OFFICE_PROGRAM, parse_timeout};
use foldercat::error::Result;

/// Merge the documents of a folder into a single PDF.
///
/// foldercat lists the PDFs, images and office documents in FOLDER in
/// natural order, lets you reorder or drop entries, then converts what is
/// not already a PDF and concatenates everything into
/// FOLDER/<name>_merged.pdf.
#[derive(Parser, Debug)]
#[command(name = "foldercat")]
#[command(version)]
#[command(about = "Merge the documents of a folder into a single PDF", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Folder whose documents are merged
    ///
    /// The merged file is written into this folder as <name>_merged.pdf.
    #[arg(required = true, value_name = "FOLDER")]
    pub folder: PathBuf,

    /// Start the merge right away instead of opening the interactive list
    #[arg(short, long)]
    pub yes: bool,

    /// Leave out files whose name matches GLOB (repeatable)
    ///
    /// Examples:
    ///   foldercat ./Reports --exclude '*.xlsx'
    ///   foldercat ./Reports -e 'draft*' -e '*.hwp'
    #[arg(short, long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Dry run - list what would be merged without converting or writing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the final report as JSON
    #[arg(long)]
    pub json: bool,

    /// Seconds a single document conversion may take (0 or "none" to wait
    /// indefinitely)
    #[arg(long, value_name = "SECS", env = "FOLDERCAT_TIMEOUT")]
    pub timeout: Option<String>,

    /// Converter program for word-processor, spreadsheet and presentation
    /// files
    #[arg(long, value_name = "PROGRAM", env = "FOLDERCAT_SOFFICE")]
    pub soffice: Option<PathBuf>,

    /// Converter program for hwp/hwpx files (defaults to the --soffice
    /// program)
    #[arg(long, value_name = "PROGRAM", env = "FOLDERCAT_HWP_PROGRAM")]
    pub hwp_program: Option<PathBuf>,

    /// Verbose output - show diagnostics from the converters
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Converter programs and timeout from the flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is not a number of seconds.
    pub fn converter_settings(&self) -> Result<ConverterSettings> {
        let timeout = match &self.timeout {
            Some(raw) => parse_timeout(raw)?,
            None => ConverterSettings::default().timeout,
        };

        let office_program = self
            .soffice
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OFFICE_PROGRAM));
        let hwp_program = self
            .hwp_program
            .clone()
            .unwrap_or_else(|| office_program.clone());

        Ok(ConverterSettings {
            office_program,
            hwp_program,
            timeout,
        })
    }

    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The timeout is invalid
    /// - The folder is not a directory
    /// - An exclude pattern does not compile
    pub fn to_config(&self) -> Result<Config> {
        let config = Config {
            folder: self.folder.clone(),
            exclude: self.exclude.clone(),
            converters: self.converter_settings()?,
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
        };

        config.validate()?;
        Ok(config)
    }
}
