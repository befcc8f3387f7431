//! Folder enumeration and natural ordering.
//!
//! Lists the immediate files of a folder that foldercat can merge and sorts
//! them the way people number their files: `img2` before `img10`.
//!
//! # Examples
//!
//! ```
//! use foldercat::scan::natural_cmp;
//!
//! let mut names = vec!["img2.png", "img10.png", "img1.png"];
//! names.sort_by(|a, b| natural_cmp(a, b));
//! assert_eq!(names, ["img1.png", "img2.png", "img10.png"]);
//! ```

use globset::GlobSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{TEMP_PREFIX, merged_file_name};
use crate::convert::AppKind;
use crate::error::{FolderCatError, Result};

/// What a candidate file is, as far as conversion is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileKind {
    /// Already a PDF; used as-is.
    Pdf,
    /// Raster image converted through the image codec.
    Image,
    /// Document converted by an external application.
    Document(AppKind),
}

impl FileKind {
    /// Classify a path by its extension (case-insensitive).
    ///
    /// Returns `None` for anything foldercat does not merge.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let kind = match ext.as_str() {
            "pdf" => Self::Pdf,
            "jpg" | "jpeg" | "png" => Self::Image,
            "docx" | "doc" => Self::Document(AppKind::Word),
            "xlsx" | "xls" => Self::Document(AppKind::Spreadsheet),
            "pptx" | "ppt" => Self::Document(AppKind::Presentation),
            "hwp" | "hwpx" => Self::Document(AppKind::Hangul),
            _ => return None,
        };
        Some(kind)
    }
}

/// A file in the working list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Full path of the file.
    pub path: PathBuf,
    /// Classification derived from the extension.
    pub kind: FileKind,
}

impl CandidateFile {
    /// Build a candidate from a path, if its extension is supported.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let kind = FileKind::from_path(&path)?;
        Some(Self { path, kind })
    }

    /// File name as shown to the user.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A piece of a name: either a run of ASCII digits or anything else.
#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Text(&'a str),
    Number(&'a str),
}

/// Split a name into alternating text and digit runs.
///
/// The first chunk is always text (possibly empty), so two names always
/// line up text-against-text and number-against-number.
fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = false;

    for (idx, ch) in s.char_indices() {
        let is_digit = ch.is_ascii_digit();
        if is_digit != in_digits {
            out.push(if in_digits {
                Chunk::Number(&s[start..idx])
            } else {
                Chunk::Text(&s[start..idx])
            });
            start = idx;
            in_digits = is_digit;
        }
    }

    out.push(if in_digits {
        Chunk::Number(&s[start..])
    } else {
        Chunk::Text(&s[start..])
    });
    out
}

/// Compare two digit runs by value, without parsing (no overflow).
fn cmp_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Natural ordering of two file names.
///
/// Digit runs compare as integers, everything else compares
/// case-insensitively. Names that differ only in leading zeros compare
/// equal, so a stable sort keeps their original order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l, r) {
            (Chunk::Number(x), Chunk::Number(y)) => cmp_numeric(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
            // Alternation guarantees aligned chunk types.
            (Chunk::Text(_), Chunk::Number(_)) => Ordering::Less,
            (Chunk::Number(_), Chunk::Text(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len())
}

/// Sort candidates in natural order of their names (stable).
pub fn sort_natural(files: &mut [CandidateFile]) {
    files.sort_by(|a, b| natural_cmp(&a.name(), &b.name()));
}

/// Whether a name is an artifact of a foldercat run in this folder.
fn is_generated(name: &str, merged_name: &str) -> bool {
    name.starts_with(TEMP_PREFIX) || name == merged_name
}

/// List the mergeable files directly inside `folder`, naturally sorted.
///
/// Subfolders are not descended into. Leftover temp PDFs and the folder's
/// own merged output are skipped, as is any name matching `exclude`.
///
/// # Errors
///
/// Returns an error if `folder` is not a readable directory.
pub fn list_candidates(folder: &Path, exclude: Option<&GlobSet>) -> Result<Vec<CandidateFile>> {
    if !folder.is_dir() {
        return Err(FolderCatError::NotADirectory {
            path: folder.to_path_buf(),
        });
    }

    let merged_name = merged_file_name(folder);
    let mut files = Vec::new();

    for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| FolderCatError::Io {
            source: e.into(),
        })?;

        if !entry.path().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if is_generated(&name, &merged_name) {
            tracing::debug!(file = %name, "skipping generated file");
            continue;
        }
        if exclude.is_some_and(|set| set.is_match(&*name)) {
            tracing::debug!(file = %name, "excluded by pattern");
            continue;
        }

        if let Some(candidate) = CandidateFile::from_path(entry.path()) {
            files.push(candidate);
        }
    }

    sort_natural(&mut files);
    Ok(files)
}
