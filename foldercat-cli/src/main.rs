//! foldercat - Merge the documents of a folder into a single PDF.
//!
//! Lists a folder, lets the user reorder the list in a small interactive
//! shell, and runs the merge on a background worker.

mod cli;
mod shell;

use clap::Parser;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::shell::Shell;
use foldercat::config::Config;
use foldercat::error::FolderCatError;
use foldercat::io::PdfReader;
use foldercat::output::{OutputFormatter, display_list, kind_tag};
use foldercat::pipeline::Pipeline;
use foldercat::scan::FileKind;
use foldercat::session::WorkingList;
use foldercat::worker::MergeWorker;

// Plain `main`: the shell blocks on the worker's channel, which must not
// happen inside a runtime. Each run brings its own.
fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(&cli);

    // Run the application and handle errors
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Install the diagnostics subscriber. `RUST_LOG` wins unless `-v` is given.
fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic.
fn run(cli: Cli) -> Result<(), FolderCatError> {
    let config = cli.to_config()?;
    let formatter = OutputFormatter::from_config(&config);

    if !cli.json {
        formatter.section(&format!("{} v{}", foldercat::NAME, foldercat::VERSION));
    }

    let list = WorkingList::load(&config.folder, config.exclude_set()?)?;
    tracing::debug!(
        folder = %config.folder.display(),
        files = list.len(),
        converters = ?config.converters,
        "working list loaded"
    );

    // Dry run mode - stop here
    if config.dry_run {
        return dry_run(&config, &formatter, &list);
    }

    let worker = MergeWorker::new(Pipeline::with_settings(config.converters.clone()));
    let stdin = io::stdin();
    let mut shell = Shell::new(list, worker, formatter, stdin.lock(), cli.json);

    if cli.yes {
        shell.merge().map(|_| ())
    } else {
        shell.run()
    }
}

/// Print what a merge would include, with page counts for existing PDFs.
fn dry_run(
    config: &Config,
    formatter: &OutputFormatter,
    list: &WorkingList,
) -> Result<(), FolderCatError> {
    display_list(formatter, list);

    if formatter.is_verbose() {
        let reader = PdfReader::new();
        formatter.blank_line();
        for file in list.files() {
            let detail = match file.kind {
                FileKind::Pdf => match reader.load(&file.path) {
                    Ok(loaded) => format!("{} page(s)", loaded.page_count),
                    Err(e) => format!("unreadable ({})", e.reason()),
                },
                _ => format!("{}, converted during the run", kind_tag(file)),
            };
            formatter.detail(&file.name(), &detail);
        }
    }

    formatter.blank_line();
    formatter.success("Dry run completed successfully");
    formatter.info(&format!("  Output would be: {}", config.output_path().display()));
    formatter.info("  Run without --dry-run to start the merge");
    Ok(())
}
