//! Document conversion through installed applications.
//!
//! Every backend is reached through the [`AutomationApp`] capability
//! interface: open a document, export it as PDF, close it, quit. One
//! application is launched per document and always asked to quit, even
//! when opening or exporting fails; see [`AppSession`].
//!
//! Conversions against the same [`AppKind`] never overlap: a converter
//! serializes access per kind, since an automation host is one global
//! instance whose state would be corrupted by concurrent use.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::AppKind;
use crate::error::{FolderCatError, Result};

/// Options passed to [`AutomationApp::open`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenOptions {
    /// Open even if the application warns about the format version.
    pub force_open: bool,
}

impl OpenOptions {
    /// Options used for documents handled by `kind`.
    pub fn for_kind(kind: AppKind) -> Self {
        Self {
            force_open: kind == AppKind::Hangul,
        }
    }
}

/// An open document inside an automation application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    path: PathBuf,
}

impl DocumentHandle {
    /// Handle for a document opened from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path the document was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A launched application that can turn documents into PDFs.
pub trait AutomationApp: Send {
    /// The application family this instance belongs to.
    fn kind(&self) -> AppKind;

    /// Register the module that lets the application touch arbitrary paths
    /// without prompting.
    fn register_access_module(&mut self) -> Result<()> {
        Ok(())
    }

    /// Switch message boxes to auto-confirm so nothing waits on a user.
    fn set_silent_mode(&mut self) -> Result<()> {
        Ok(())
    }

    /// Open the document at `path`.
    fn open(&mut self, path: &Path, options: &OpenOptions) -> Result<DocumentHandle>;

    /// Export an open document as PDF to `dest`; `Ok(false)` when the
    /// application reports failure.
    fn export_pdf(&mut self, doc: &DocumentHandle, dest: &Path) -> Result<bool>;

    /// Close a document without saving changes.
    fn close(&mut self, doc: DocumentHandle) -> Result<()>;

    /// Quit the application.
    fn quit(&mut self) -> Result<()>;
}

/// Starts automation applications.
pub trait AppLauncher: Send + Sync {
    /// Launch a fresh, hidden instance of the application for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`FolderCatError::ApplicationUnavailable`] when the
    /// application is not installed or cannot be reached.
    fn launch(&self, kind: AppKind) -> Result<Box<dyn AutomationApp>>;
}

/// A launched application that is quit when dropped.
///
/// Quit errors are logged and swallowed, so release never masks the error
/// that caused an early return.
pub struct AppSession {
    app: Box<dyn AutomationApp>,
}

impl AppSession {
    /// Launch the application for `kind`.
    pub fn launch(launcher: &dyn AppLauncher, kind: AppKind) -> Result<Self> {
        tracing::debug!(app = kind.automation_id(), "launching application");
        let app = launcher.launch(kind)?;
        Ok(Self { app })
    }

    /// The wrapped application.
    pub fn app(&mut self) -> &mut dyn AutomationApp {
        self.app.as_mut()
    }
}

impl Drop for AppSession {
    fn drop(&mut self) {
        let kind = self.app.kind();
        match self.app.quit() {
            Ok(()) => tracing::debug!(app = kind.automation_id(), "application quit"),
            Err(e) => tracing::warn!(app = kind.automation_id(), error = %e, "quit failed"),
        }
    }
}

/// Converts documents to PDF, one application instance per document.
#[derive(Clone)]
pub struct DocumentConverter {
    launcher: Arc<dyn AppLauncher>,
    locks: Arc<[Mutex<()>; 4]>,
}

impl DocumentConverter {
    /// Create a converter that launches applications through `launcher`.
    pub fn new(launcher: Arc<dyn AppLauncher>) -> Self {
        Self {
            launcher,
            locks: Arc::new([
                Mutex::new(()),
                Mutex::new(()),
                Mutex::new(()),
                Mutex::new(()),
            ]),
        }
    }

    /// Convert `src` to a PDF at `dest`, blocking until done.
    ///
    /// # Errors
    ///
    /// Returns a conversion error when the application is unavailable, the
    /// document does not open, the export reports failure, or the export
    /// leaves no file at `dest`.
    pub fn convert_blocking(&self, kind: AppKind, src: &Path, dest: &Path) -> Result<()> {
        let _guard = self.locks[kind.index()]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut session = AppSession::launch(self.launcher.as_ref(), kind)?;
        let app = session.app();

        if kind == AppKind::Hangul {
            app.register_access_module()?;
            app.set_silent_mode()?;
        }

        let doc = app.open(src, &OpenOptions::for_kind(kind))?;
        tracing::debug!(src = %src.display(), dest = %dest.display(), "exporting PDF");

        let exported = app.export_pdf(&doc, dest);
        if let Err(e) = app.close(doc) {
            tracing::warn!(src = %src.display(), error = %e, "closing document failed");
        }

        match exported? {
            true if dest.exists() => Ok(()),
            true => Err(FolderCatError::ConversionNotProduced {
                path: src.to_path_buf(),
            }),
            false => Err(FolderCatError::export_failed(
                src.to_path_buf(),
                "export call reported failure",
            )),
        }
    }

    /// Convert on the blocking thread pool.
    pub async fn convert(&self, kind: AppKind, src: PathBuf, dest: PathBuf) -> Result<()> {
        let converter = self.clone();
        tokio::task::spawn_blocking(move || converter.convert_blocking(kind, &src, &dest))
            .await
            .map_err(|e| FolderCatError::other(format!("Conversion task failed: {e}")))?
    }
}
