//! Conversion of non-PDF inputs into single-document PDFs.
//!
//! - [`image`]: raster images through the `image` codec, no external program.
//! - [`office`]: documents through an installed application, driven via the
//!   [`AutomationApp`] capability interface.
//! - [`command`]: the default [`AppLauncher`], which shells out to a
//!   LibreOffice-compatible command-line converter.

pub mod command;
pub mod image;
pub mod office;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use command::{CommandApp, CommandLauncher};
pub use image::{convert_image, image_to_pdf};
pub use office::{
    AppLauncher, AppSession, AutomationApp, DocumentConverter, DocumentHandle, OpenOptions,
};

/// The external application family responsible for a document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AppKind {
    /// Word processor (`doc`, `docx`).
    Word,
    /// Spreadsheet (`xls`, `xlsx`).
    Spreadsheet,
    /// Presentation (`ppt`, `pptx`).
    Presentation,
    /// Korean word processor (`hwp`, `hwpx`).
    Hangul,
}

impl AppKind {
    /// All kinds, in a fixed order.
    pub const ALL: [AppKind; 4] = [
        AppKind::Word,
        AppKind::Spreadsheet,
        AppKind::Presentation,
        AppKind::Hangul,
    ];

    /// Human-readable application name for messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Word => "Word processor",
            Self::Spreadsheet => "Spreadsheet application",
            Self::Presentation => "Presentation application",
            Self::Hangul => "Hangul word processor",
        }
    }

    /// Automation identifier of the desktop application on hosts that
    /// expose one.
    pub fn automation_id(&self) -> &'static str {
        match self {
            Self::Word => "Word.Application",
            Self::Spreadsheet => "Excel.Application",
            Self::Presentation => "PowerPoint.Application",
            Self::Hangul => "HWPFrame.HwpObject",
        }
    }

    /// Position in [`AppKind::ALL`].
    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Word => 0,
            Self::Spreadsheet => 1,
            Self::Presentation => 2,
            Self::Hangul => 3,
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
