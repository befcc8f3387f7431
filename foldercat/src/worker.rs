//! Background execution of merge runs.
//!
//! A run executes on its own OS thread, which owns a tokio runtime. The
//! caller (the UI thread) receives everything the run reports as
//! [`MergeEvent`]s over a channel and is the only place that renders them.
//! A [`MergeWorker`] allows one run at a time; there is no cancellation.
//!
//! # Examples
//!
//! ```no_run
//! use foldercat::config::ConverterSettings;
//! use foldercat::pipeline::Pipeline;
//! use foldercat::session::WorkingList;
//! use foldercat::worker::{MergeEvent, MergeWorker};
//!
//! # fn example() -> foldercat::Result<()> {
//! let list = WorkingList::load("/data/Reports", None)?;
//! let worker = MergeWorker::new(Pipeline::with_settings(ConverterSettings::default()));
//!
//! let mut handle = worker.spawn(list.to_request())?;
//! while let Some(event) = handle.recv_blocking() {
//!     match event {
//!         MergeEvent::Progress { percent, phase } => println!("{percent}% {phase}"),
//!         MergeEvent::Log(line) => println!("{line}"),
//!         MergeEvent::Finished(result) => println!("{:?}", result.map(|r| r.succeeded())),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::{FolderCatError, Result};
use crate::pipeline::{MergeObserver, MergeReport, MergeRequest, Phase, Pipeline};

/// Something a running merge reports.
#[derive(Debug)]
pub enum MergeEvent {
    /// Overall progress.
    Progress {
        /// Percent complete.
        percent: u8,
        /// Current phase.
        phase: Phase,
    },

    /// A timestamped log line.
    Log(String),

    /// The run ended. Always the last event of a run.
    Finished(Result<MergeReport>),
}

/// Forwards observer calls into the event channel.
struct ChannelObserver {
    tx: UnboundedSender<MergeEvent>,
}

impl MergeObserver for ChannelObserver {
    fn progress(&self, percent: u8, phase: Phase) {
        // The receiver may be gone; the run still finishes and cleans up.
        let _ = self.tx.send(MergeEvent::Progress { percent, phase });
    }

    fn log(&self, line: &str) {
        let _ = self.tx.send(MergeEvent::Log(line.to_string()));
    }
}

/// Clears the running flag when the worker thread ends, panics included.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Starts merge runs on a background thread, one at a time.
#[derive(Clone)]
pub struct MergeWorker {
    pipeline: Pipeline,
    running: Arc<AtomicBool>,
}

impl MergeWorker {
    /// Create a worker around `pipeline`.
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a run started by this worker is still in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start a run for `request` on a new thread.
    ///
    /// # Errors
    ///
    /// - [`FolderCatError::Busy`] if a run is already in flight
    /// - [`FolderCatError::WorkerFailed`] if the thread cannot be spawned
    pub fn spawn(&self, request: MergeRequest) -> Result<WorkerHandle> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(FolderCatError::Busy);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let pipeline = self.pipeline.clone();
        let guard = RunningGuard(Arc::clone(&self.running));

        let spawned = thread::Builder::new()
            .name("foldercat-merge".to_string())
            .spawn(move || {
                let observer = Arc::new(ChannelObserver { tx: tx.clone() });

                let result = tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(1)
                    .enable_all()
                    .build()
                    .map_err(|e| FolderCatError::WorkerFailed {
                        reason: format!("failed to start runtime: {e}"),
                    })
                    .and_then(|runtime| runtime.block_on(pipeline.run(&request, observer)));

                if let Err(e) = &result {
                    tracing::debug!(error = %e, "merge run ended with error");
                }
                drop(guard);
                let _ = tx.send(MergeEvent::Finished(result));
            });

        match spawned {
            Ok(_) => Ok(WorkerHandle {
                events: rx,
                running: Arc::clone(&self.running),
            }),
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                Err(FolderCatError::WorkerFailed {
                    reason: e.to_string(),
                })
            }
        }
    }
}

/// Receiving end of one run.
#[derive(Debug)]
pub struct WorkerHandle {
    events: UnboundedReceiver<MergeEvent>,
    running: Arc<AtomicBool>,
}

impl WorkerHandle {
    /// Whether the run is still in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Wait for the next event. `None` once the run is over and drained.
    ///
    /// Must not be called from inside an async runtime.
    pub fn recv_blocking(&mut self) -> Option<MergeEvent> {
        self.events.blocking_recv()
    }

    /// Wait for the next event from async code.
    pub async fn recv(&mut self) -> Option<MergeEvent> {
        self.events.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<MergeEvent> {
        self.events.try_recv().ok()
    }

    /// Drain events until the run finishes and return its result.
    ///
    /// # Errors
    ///
    /// Returns the run's error, or [`FolderCatError::WorkerFailed`] if the
    /// worker thread died without reporting.
    pub fn wait(mut self) -> Result<MergeReport> {
        while let Some(event) = self.recv_blocking() {
            if let MergeEvent::Finished(result) = event {
                return result;
            }
        }
        Err(FolderCatError::WorkerFailed {
            reason: "worker stopped without a result".to_string(),
        })
    }
}
