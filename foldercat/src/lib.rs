//! foldercat - Turn a folder of mixed documents into one PDF.
//!
//! The documents of a folder are listed in natural order. Images are
//! converted through the `image` codec and office documents through an
//! installed converter application. The results are concatenated, in the
//! order the user chose, into `<folder>_merged.pdf` inside the folder.
//!
//! - [`scan`]: enumerate and naturally sort a folder
//! - [`convert`]: image and document to PDF conversion
//! - [`merge`]: page-tree concatenation
//! - [`pipeline`]: the merge run and its report
//! - [`session`] and [`worker`]: the editable list and background runs
//! - [`output`]: terminal rendering
//!
//! # Examples
//!
//! ## Merge a folder in natural order
//!
//! ```no_run
//! use foldercat::config::ConverterSettings;
//! use foldercat::pipeline::{LogObserver, Pipeline};
//! use foldercat::session::WorkingList;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let list = WorkingList::load("/data/Reports", None)?;
//! let pipeline = Pipeline::with_settings(ConverterSettings::default());
//!
//! let report = pipeline.run(&list.to_request(), Arc::new(LogObserver)).await?;
//! println!("{} of {} files merged", report.succeeded(), report.total);
//! # Ok(())
//! # }
//! ```
//!
//! ## Reorder before merging, on a background thread
//!
//! ```no_run
//! use foldercat::config::ConverterSettings;
//! use foldercat::pipeline::Pipeline;
//! use foldercat::session::WorkingList;
//! use foldercat::worker::MergeWorker;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut list = WorkingList::load("/data/Reports", None)?;
//! list.move_up(2);
//! list.remove(0);
//!
//! let worker = MergeWorker::new(Pipeline::with_settings(ConverterSettings::default()));
//! let report = worker.spawn(list.to_request())?.wait()?;
//! println!("Wrote {:?}", report.output);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod convert;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod scan;
pub mod session;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use error::{FolderCatError, Result};
pub use pipeline::{MergeReport, MergeRequest, Pipeline};
pub use session::WorkingList;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
