//! Shared helpers for the foldercat integration tests.
//!
//! Fixtures are generated on the fly: small PDFs whose pages carry a
//! recognizable media box width, raster images, and a scripted document
//! converter that stands in for an office suite.

#![allow(dead_code)]

use foldercat::convert::{AppKind, AppLauncher, AutomationApp, DocumentHandle, OpenOptions};
use foldercat::pipeline::{MergeObserver, Phase};
use foldercat::{FolderCatError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// A scratch directory holding a source folder with the given name.
pub fn source_folder(name: &str) -> (TempDir, PathBuf) {
    let root = TempDir::new().expect("Failed to create temp dir");
    let folder = root.path().join(name);
    std::fs::create_dir(&folder).expect("Failed to create source folder");
    (root, folder)
}

/// Build a PDF with `pages` pages, each `width` points wide.
pub fn pdf_document(pages: usize, width: i64) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for n in 0..pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tj", vec![Object::string_literal(format!("page {n}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().expect("Failed to encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), 400.into()],
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Write a PDF fixture into `folder` and return its path.
pub fn write_pdf(folder: &Path, name: &str, pages: usize, width: i64) -> PathBuf {
    let path = folder.join(name);
    pdf_document(pages, width)
        .save(&path)
        .expect("Failed to save PDF fixture");
    path
}

/// Write a solid-color image; the format follows the extension.
pub fn write_image(folder: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = folder.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]))
        .save(&path)
        .expect("Failed to save image fixture");
    path
}

/// Write a placeholder office document.
pub fn write_document(folder: &Path, name: &str) -> PathBuf {
    let path = folder.join(name);
    std::fs::write(&path, b"PK\x03\x04 placeholder").expect("Failed to write document");
    path
}

/// Widths of the pages of the PDF at `path`, in page order.
pub fn page_widths(path: &Path) -> Vec<i64> {
    let doc = Document::load(path).expect("Failed to load merged PDF");
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_dictionary(id).expect("page dictionary");
            let media_box = page
                .get(b"MediaBox")
                .and_then(Object::as_array)
                .expect("page has a media box");
            media_box[2].as_float().expect("numeric width").round() as i64
        })
        .collect()
}

/// Names of leftover `__temp_` files in `folder`.
pub fn temp_files(folder: &Path) -> Vec<String> {
    std::fs::read_dir(folder)
        .expect("Failed to read folder")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("__temp_"))
        .collect()
}

/// Document converter driven by a script instead of an office suite.
///
/// Each listed document converts to a one-page PDF of its configured
/// width; names in `failing` report an export failure and kinds in
/// `unavailable` cannot be launched.
#[derive(Default)]
pub struct ScriptedLauncher {
    widths: HashMap<String, i64>,
    failing: HashSet<String>,
    unavailable: HashSet<AppKind>,
    launched: Mutex<Vec<AppKind>>,
}

impl ScriptedLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn converts(mut self, name: &str, width: i64) -> Self {
        self.widths.insert(name.to_string(), width);
        self
    }

    pub fn fails(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn without(mut self, kind: AppKind) -> Self {
        self.unavailable.insert(kind);
        self
    }

    /// Applications launched so far, in order.
    pub fn launched(&self) -> Vec<AppKind> {
        self.launched.lock().expect("launch log poisoned").clone()
    }
}

impl AppLauncher for ScriptedLauncher {
    fn launch(&self, kind: AppKind) -> Result<Box<dyn AutomationApp>> {
        if self.unavailable.contains(&kind) {
            return Err(FolderCatError::application_unavailable(
                kind.display_name(),
                "not installed",
            ));
        }
        self.launched.lock().expect("launch log poisoned").push(kind);
        Ok(Box::new(ScriptedApp {
            kind,
            widths: self.widths.clone(),
            failing: self.failing.clone(),
        }))
    }
}

struct ScriptedApp {
    kind: AppKind,
    widths: HashMap<String, i64>,
    failing: HashSet<String>,
}

impl ScriptedApp {
    fn name_of(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl AutomationApp for ScriptedApp {
    fn kind(&self) -> AppKind {
        self.kind
    }

    fn open(&mut self, path: &Path, _options: &OpenOptions) -> Result<DocumentHandle> {
        if !path.exists() {
            return Err(FolderCatError::open_failed(path.to_path_buf(), "no such file"));
        }
        Ok(DocumentHandle::new(path))
    }

    fn export_pdf(&mut self, doc: &DocumentHandle, dest: &Path) -> Result<bool> {
        let name = Self::name_of(doc.path());
        if self.failing.contains(&name) {
            return Ok(false);
        }
        let width = self.widths.get(&name).copied().unwrap_or(333);
        pdf_document(1, width)
            .save(dest)
            .map_err(|e| FolderCatError::export_failed(doc.path().to_path_buf(), e.to_string()))?;
        Ok(true)
    }

    fn close(&mut self, _doc: DocumentHandle) -> Result<()> {
        Ok(())
    }

    fn quit(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Observer that keeps everything a run reports.
#[derive(Default)]
pub struct RecordingObserver {
    progress: Mutex<Vec<(u8, Phase)>>,
    lines: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn progress(&self) -> Vec<(u8, Phase)> {
        self.progress.lock().expect("progress log poisoned").clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("line log poisoned").clone()
    }

    pub fn logged(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl MergeObserver for RecordingObserver {
    fn progress(&self, percent: u8, phase: Phase) {
        self.progress
            .lock()
            .expect("progress log poisoned")
            .push((percent, phase));
    }

    fn log(&self, line: &str) {
        self.lines
            .lock()
            .expect("line log poisoned")
            .push(line.to_string());
    }
}
