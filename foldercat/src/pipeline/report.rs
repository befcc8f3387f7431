//! Outcome of a merge run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ErrorCategory, FolderCatError};

const RULE_WIDTH: usize = 60;
const SHORT_REASON_LEN: usize = 50;

/// A listed file that did not make it into the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    /// File name as listed.
    pub name: String,

    /// Human-readable reason.
    pub reason: String,

    /// Why the file was dropped.
    pub category: ErrorCategory,
}

impl FileFailure {
    /// Record `err` against the file called `name`.
    pub fn from_error(name: impl Into<String>, err: &FolderCatError) -> Self {
        Self {
            name: name.into(),
            reason: err.reason(),
            category: err.category(),
        }
    }

    /// The reason, cut down for a one-line summary.
    ///
    /// ```
    /// use foldercat::error::ErrorCategory;
    /// use foldercat::pipeline::FileFailure;
    ///
    /// let failure = FileFailure {
    ///     name: "a.docx".into(),
    ///     reason: "x".repeat(80),
    ///     category: ErrorCategory::Conversion,
    /// };
    /// assert_eq!(failure.short_reason().chars().count(), 50);
    /// assert!(failure.short_reason().ends_with("..."));
    /// ```
    pub fn short_reason(&self) -> String {
        if self.reason.chars().count() < SHORT_REASON_LEN {
            return self.reason.clone();
        }
        let head: String = self.reason.chars().take(SHORT_REASON_LEN - 3).collect();
        format!("{head}...")
    }
}

/// Structured result of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    /// Number of listed files.
    pub total: usize,

    /// Names of the files whose pages are in the output, in output order.
    pub merged: Vec<String>,

    /// Files left out, in list order.
    pub failures: Vec<FileFailure>,

    /// Path of the written file.
    pub output: Option<PathBuf>,

    /// Page count of the written file.
    pub pages: usize,
}

impl MergeReport {
    /// Number of files included in the output.
    pub fn succeeded(&self) -> usize {
        self.merged.len()
    }

    /// Number of files left out.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// The summary block written to the log at the end of a run.
    pub fn summary_lines(&self) -> Vec<String> {
        let rule = "=".repeat(RULE_WIDTH);
        let mut lines = vec![
            rule.clone(),
            "Merge summary".to_string(),
            rule.clone(),
            format!("Total files: {}", self.total),
            format!("Merged successfully: {}", self.succeeded()),
            format!("Failed: {}", self.failed()),
        ];

        if !self.merged.is_empty() {
            lines.push(String::new());
            lines.push("Included in the merge:".to_string());
            lines.extend(
                self.merged
                    .iter()
                    .enumerate()
                    .map(|(i, name)| format!("  {}. {name}", i + 1)),
            );
        }

        if !self.failures.is_empty() {
            lines.push(String::new());
            lines.push("Excluded from the merge:".to_string());
            lines.extend(
                self.failures
                    .iter()
                    .enumerate()
                    .map(|(i, f)| format!("  {}. {} - {}", i + 1, f.name, f.reason)),
            );
        }

        if let Some(output) = &self.output {
            lines.push(String::new());
            lines.push(format!("Saved file: {}", output.display()));
        }
        lines.push(rule);

        lines
    }
}
