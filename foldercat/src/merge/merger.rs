//! Page-tree concatenation of PDF documents.
//!
//! The first document is the base. Every later document is renumbered past
//! the base's highest object id and its objects are moved in. All pages are
//! then hung directly under the base's root `Pages` node in input order.
//! Attributes a page inherited from its old tree (`MediaBox`, `Resources`,
//! `CropBox`, `Rotate`) are copied onto the page first, so reparenting does
//! not change how it renders. Orphaned catalogs and intermediate tree nodes
//! are pruned at the end.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{FolderCatError, Result};
use crate::io::PdfReader;

/// Page attributes that a page may inherit from its ancestors.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"Resources", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

/// Statistics about a concatenation.
#[derive(Debug, Clone)]
pub struct ConcatStatistics {
    /// Number of PDFs appended.
    pub files_merged: usize,

    /// Total number of pages in the result.
    pub total_pages: usize,

    /// Time taken to load and concatenate.
    pub merge_time: Duration,
}

/// Result of a concatenation.
#[derive(Debug)]
pub struct ConcatResult {
    /// The concatenated document, not yet written.
    pub document: Document,

    /// Statistics about the concatenation.
    pub statistics: ConcatStatistics,
}

/// Concatenates whole PDF documents in order.
#[derive(Debug, Clone, Default)]
pub struct Concatenator {
    reader: PdfReader,
}

impl Concatenator {
    /// Create a concatenator that rejects page-less inputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every page of every PDF in `paths`, in order.
    ///
    /// `on_append(k, n, path)` is called after the `k`-th of `n` files has
    /// been appended (`k` starts at 1).
    ///
    /// # Errors
    ///
    /// - [`FolderCatError::NoFilesToMerge`] for an empty `paths`
    /// - [`FolderCatError::FailedToLoadPdf`] if any input cannot be loaded
    /// - [`FolderCatError::MergeFailed`] if a page tree is malformed
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use foldercat::merge::Concatenator;
    /// # use std::path::PathBuf;
    /// # fn example() -> foldercat::Result<()> {
    /// let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
    /// let result = Concatenator::new().concatenate(&paths, |k, n, path| {
    ///     println!("[{k}/{n}] {}", path.display());
    /// })?;
    /// println!("{} pages", result.statistics.total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub fn concatenate<F>(&self, paths: &[PathBuf], mut on_append: F) -> Result<ConcatResult>
    where
        F: FnMut(usize, usize, &Path),
    {
        let start = Instant::now();
        let total = paths.len();

        let (first, rest) = paths.split_first().ok_or(FolderCatError::NoFilesToMerge)?;

        let mut merged = self.reader.load(first)?.document;
        let root_pages = root_pages_id(&merged)?;
        let mut all_pages = flatten_pages(&mut merged, root_pages)?;
        strip_inheritable(&mut merged, root_pages)?;
        on_append(1, total, first);

        let mut max_id = merged.max_id;

        for (idx, path) in rest.iter().enumerate() {
            let mut doc = self.reader.load(path)?.document;

            doc.renumber_objects_with(max_id + 1);
            max_id = doc.max_id;

            let pages = flatten_pages(&mut doc, root_pages)
                .map_err(|e| FolderCatError::merge_failed(format!("{}: {}", path.display(), e.reason())))?;
            all_pages.extend(pages);

            merged.objects.extend(doc.objects);
            merged.max_id = max_id;

            on_append(idx + 2, total, path);
        }

        set_kids(&mut merged, root_pages, &all_pages)?;

        merged.prune_objects();
        merged.renumber_objects();

        let total_pages = merged.get_pages().len();
        tracing::debug!(files = total, pages = total_pages, "concatenated documents");

        Ok(ConcatResult {
            document: merged,
            statistics: ConcatStatistics {
                files_merged: total,
                total_pages,
                merge_time: start.elapsed(),
            },
        })
    }
}

fn root_pages_id(doc: &Document) -> Result<ObjectId> {
    doc.catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| FolderCatError::merge_failed(format!("Failed to get pages reference: {e}")))
}

/// Values for the inheritable keys `page_id` does not set itself.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Result<Vec<(Vec<u8>, Object)>> {
    let page = doc.get_dictionary(page_id)?;
    let mut missing: Vec<&[u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();

    let mut found = Vec::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(node_id) = parent {
        if missing.is_empty() || depth >= MAX_TREE_DEPTH {
            break;
        }
        let node = doc.get_dictionary(node_id)?;
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    Ok(found)
}

/// Make every page of `doc` self-contained and point it at `parent`.
///
/// Returns the page ids in page order.
fn flatten_pages(doc: &mut Document, parent: ObjectId) -> Result<Vec<ObjectId>> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for &page_id in &page_ids {
        let inherited = inherited_attributes(doc, page_id)?;
        let page = doc.get_object_mut(page_id).and_then(Object::as_dict_mut)?;

        for (key, value) in inherited {
            page.set(key, value);
        }
        if !page.has(b"MediaBox") {
            // US Letter, the PDF reader default.
            page.set(
                "MediaBox",
                vec![0.into(), 0.into(), 612.into(), 792.into()],
            );
        }
        if !page.has(b"Resources") {
            page.set("Resources", Dictionary::new());
        }
        page.set("Parent", parent);
    }

    Ok(page_ids)
}

/// Remove inheritable keys from the root node so pages appended later do
/// not pick up the base document's values.
fn strip_inheritable(doc: &mut Document, pages_id: ObjectId) -> Result<()> {
    let pages = doc.get_object_mut(pages_id).and_then(Object::as_dict_mut)?;
    for key in INHERITABLE {
        pages.remove(key);
    }
    Ok(())
}

fn set_kids(doc: &mut Document, pages_id: ObjectId, page_ids: &[ObjectId]) -> Result<()> {
    let pages = doc
        .get_object_mut(pages_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| FolderCatError::merge_failed(format!("Pages object is not a dictionary: {e}")))?;

    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
    pages.set("Kids", kids);
    pages.set("Count", page_ids.len() as i64);
    pages.remove(b"Parent");

    Ok(())
}
