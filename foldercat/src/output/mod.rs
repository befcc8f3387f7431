//! Terminal output for foldercat.
//!
//! Formatted status messages, the progress line, and the renderings of the
//! working list and the final report.
//!
//! # Examples
//!
//! ```no_run
//! use foldercat::output::{OutputFormatter, display_list};
//! use foldercat::session::WorkingList;
//!
//! # fn example(list: &WorkingList) {
//! let formatter = OutputFormatter::new(false, false);
//! display_list(&formatter, list);
//! # }
//! ```

pub mod formatter;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter};
pub use progress::{ProgressBar, ProgressStyle};

use crate::pipeline::MergeReport;
use crate::scan::{CandidateFile, FileKind};
use crate::session::WorkingList;

/// Short tag shown next to a list entry.
pub fn kind_tag(file: &CandidateFile) -> &'static str {
    match file.kind {
        FileKind::Pdf => "pdf",
        FileKind::Image => "image",
        FileKind::Document(_) => "document",
    }
}

/// Print the numbered working list, marking the selected entry.
pub fn display_list(formatter: &OutputFormatter, list: &WorkingList) {
    formatter.section(&format!("Files in {}", list.folder().display()));

    if list.is_empty() {
        formatter.info("  (no files to merge)");
        return;
    }

    for (idx, file) in list.files().iter().enumerate() {
        let marker = if list.selected() == Some(idx) { "*" } else { " " };
        formatter.list_item(
            idx + 1,
            &format!("{marker} {} [{}]", file.name(), kind_tag(file)),
        );
    }
}

/// Print the end-of-run summary, the terminal stand-in for a dialog.
pub fn display_report(formatter: &OutputFormatter, report: &MergeReport) {
    formatter.blank_line();
    formatter.success(&format!(
        "Merge complete: {} of {} file(s) merged, {} page(s)",
        report.succeeded(),
        report.total,
        report.pages
    ));

    if !report.failures.is_empty() {
        formatter.warning(&format!("{} file(s) failed:", report.failed()));
        for failure in &report.failures {
            formatter.warning(&format!("  • {} ({})", failure.name, failure.short_reason()));
        }
        formatter.info("See the log above for details.");
    }

    if let Some(output) = &report.output {
        formatter.info(&format!("Saved file: {}", output.display()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::AppKind;
    use crate::error::ErrorCategory;
    use crate::pipeline::FileFailure;
    use std::path::PathBuf;

    #[test]
    fn test_kind_tag() {
        let pdf = CandidateFile::from_path("a.pdf").unwrap();
        let doc = CandidateFile {
            path: PathBuf::from("b.hwp"),
            kind: FileKind::Document(AppKind::Hangul),
        };
        assert_eq!(kind_tag(&pdf), "pdf");
        assert_eq!(kind_tag(&doc), "document");
    }

    #[test]
    fn test_display_report_does_not_panic() {
        let report = MergeReport {
            total: 2,
            merged: vec!["a.pdf".into()],
            failures: vec![FileFailure {
                name: "b.docx".into(),
                reason: "export call reported failure".into(),
                category: ErrorCategory::Conversion,
            }],
            output: Some(PathBuf::from("Reports_merged.pdf")),
            pages: 3,
        };
        display_report(&OutputFormatter::new(true, false), &report);
    }

    #[test]
    fn test_display_empty_list() {
        let list = WorkingList::from_files("/data/empty", Vec::new());
        display_list(&OutputFormatter::new(true, false), &list);
    }
}
