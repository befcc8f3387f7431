//! Command-line conversion backend.
//!
//! Drives a LibreOffice-compatible converter (`soffice --headless
//! --convert-to pdf`) behind the [`AutomationApp`] interface. "Launching"
//! resolves the program on `PATH`, "opening" checks the document, and
//! "exporting" runs one bounded conversion process into a scratch directory
//! next to the destination before moving the result into place.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::AppKind;
use super::office::{AppLauncher, AutomationApp, DocumentHandle, OpenOptions};
use crate::config::ConverterSettings;
use crate::error::{FolderCatError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const OLE_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

/// Launches [`CommandApp`]s using the configured programs.
#[derive(Debug, Clone, Default)]
pub struct CommandLauncher {
    settings: ConverterSettings,
}

impl CommandLauncher {
    /// Create a launcher from converter settings.
    pub fn new(settings: ConverterSettings) -> Self {
        Self { settings }
    }
}

impl AppLauncher for CommandLauncher {
    fn launch(&self, kind: AppKind) -> Result<Box<dyn AutomationApp>> {
        let configured = self.settings.program_for(kind);
        let program = which::which(configured).map_err(|e| {
            FolderCatError::application_unavailable(
                kind.display_name(),
                format!("{}: {e}", configured.display()),
            )
        })?;

        tracing::debug!(
            app = kind.automation_id(),
            program = %program.display(),
            "resolved converter program"
        );

        Ok(Box::new(CommandApp::new(kind, program, self.settings.timeout)))
    }
}

/// One converter "instance" for a single document.
#[derive(Debug)]
pub struct CommandApp {
    kind: AppKind,
    program: PathBuf,
    timeout: Option<Duration>,
    args: Vec<String>,
    open: Option<PathBuf>,
}

impl CommandApp {
    /// Create an app that runs `program` with a per-export `timeout`.
    pub fn new(kind: AppKind, program: PathBuf, timeout: Option<Duration>) -> Self {
        Self {
            kind,
            program,
            timeout,
            args: vec!["--headless".to_string(), "--norestore".to_string()],
            open: None,
        }
    }

    /// Arguments passed before `--convert-to`.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn push_arg(&mut self, arg: &str) {
        if !self.args.iter().any(|a| a == arg) {
            self.args.push(arg.to_string());
        }
    }

    fn build_command(&self, src: &Path, outdir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(outdir)
            .arg(src)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

/// Whether the first bytes of `path` look like a document of this kind.
///
/// Modern formats are ZIP containers, legacy ones OLE2 compound files.
fn has_expected_signature(path: &Path) -> std::io::Result<bool> {
    let mut magic = [0u8; 4];
    let mut file = File::open(path)?;
    if file.read(&mut magic)? < magic.len() {
        return Ok(false);
    }
    Ok(magic == ZIP_MAGIC || magic == OLE_MAGIC)
}

/// Wait for `child`, killing it once `timeout` has passed.
///
/// Returns `None` when the process had to be killed.
fn wait_bounded(
    child: &mut std::process::Child,
    timeout: Option<Duration>,
) -> std::io::Result<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return child.wait().map(Some);
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            child.kill()?;
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

impl AutomationApp for CommandApp {
    fn kind(&self) -> AppKind {
        self.kind
    }

    fn register_access_module(&mut self) -> Result<()> {
        // Skip the lock-file check so documents on shared folders open.
        self.push_arg("--nolockcheck");
        Ok(())
    }

    fn set_silent_mode(&mut self) -> Result<()> {
        self.push_arg("--nologo");
        self.push_arg("--nodefault");
        Ok(())
    }

    fn open(&mut self, path: &Path, options: &OpenOptions) -> Result<DocumentHandle> {
        if !path.is_file() {
            return Err(FolderCatError::open_failed(
                path.to_path_buf(),
                "file does not exist",
            ));
        }

        let recognized = has_expected_signature(path)
            .map_err(|e| FolderCatError::open_failed(path.to_path_buf(), e.to_string()))?;

        if !recognized {
            if !options.force_open {
                return Err(FolderCatError::open_failed(
                    path.to_path_buf(),
                    format!("not a valid {} document", self.kind.display_name()),
                ));
            }
            tracing::debug!(src = %path.display(), "unrecognized signature, opening anyway");
        }

        self.open = Some(path.to_path_buf());
        Ok(DocumentHandle::new(path))
    }

    fn export_pdf(&mut self, doc: &DocumentHandle, dest: &Path) -> Result<bool> {
        let src = doc.path();
        let parent = dest.parent().unwrap_or_else(|| Path::new("."));
        let scratch = tempfile::Builder::new()
            .prefix(".foldercat-")
            .tempdir_in(parent)
            .map_err(|e| FolderCatError::export_failed(src.to_path_buf(), e.to_string()))?;

        let mut cmd = self.build_command(src, scratch.path());
        tracing::debug!(command = ?cmd, "running converter");

        let mut child = cmd.spawn().map_err(|e| {
            FolderCatError::application_unavailable(self.kind.display_name(), e.to_string())
        })?;

        let status = wait_bounded(&mut child, self.timeout)
            .map_err(|e| FolderCatError::export_failed(src.to_path_buf(), e.to_string()))?;

        let Some(status) = status else {
            let secs = self.timeout.map(|t| t.as_secs()).unwrap_or_default();
            return Err(FolderCatError::export_failed(
                src.to_path_buf(),
                format!("converter did not finish within {secs}s"),
            ));
        };

        if !status.success() {
            tracing::warn!(src = %src.display(), %status, "converter exited with failure");
            return Ok(false);
        }

        let mut produced_name = src.file_stem().unwrap_or_default().to_os_string();
        produced_name.push(".pdf");
        let produced = scratch.path().join(produced_name);
        if !produced.exists() {
            return Ok(false);
        }

        std::fs::rename(&produced, dest)
            .map_err(|e| FolderCatError::export_failed(src.to_path_buf(), e.to_string()))?;
        Ok(true)
    }

    fn close(&mut self, doc: DocumentHandle) -> Result<()> {
        if self.open.as_deref() == Some(doc.path()) {
            self.open = None;
        }
        Ok(())
    }

    fn quit(&mut self) -> Result<()> {
        self.open = None;
        Ok(())
    }
}
