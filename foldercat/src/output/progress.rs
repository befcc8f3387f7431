//! Percent progress indicator for merge runs.
//!
//! # Examples
//!
//! ```
//! use foldercat::output::progress::{ProgressBar, ProgressStyle};
//! use foldercat::pipeline::Phase;
//!
//! let mut progress = ProgressBar::new(ProgressStyle::Bar);
//! progress.set(40, Phase::ConvertingImages);
//! progress.set(100, Phase::Done);
//! progress.finish();
//! ```

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::pipeline::Phase;

/// Style of progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    /// Classic progress bar: [=====>    ]
    Bar,
    /// Spinner next to the phase label: ⠋ ⠙ ⠹ ⠸ ⠼ ⠴ ⠦ ⠧ ⠇ ⠏
    Spinner,
    /// Plain percentage.
    Percent,
}

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Single-line progress display, redrawn in place.
pub struct ProgressBar {
    percent: u8,
    phase: Phase,
    style: ProgressStyle,
    width: usize,
    start_time: Instant,
    enabled: bool,
    spinner_frame: usize,
}

impl ProgressBar {
    /// Create a progress bar; disabled when stdout is not a terminal.
    pub fn new(style: ProgressStyle) -> Self {
        Self {
            percent: 0,
            phase: Phase::Idle,
            style,
            width: 40,
            start_time: Instant::now(),
            enabled: Self::is_terminal(),
            spinner_frame: 0,
        }
    }

    /// Create a disabled progress bar (no output).
    pub fn disabled() -> Self {
        let mut pb = Self::new(ProgressStyle::Percent);
        pb.enabled = false;
        pb
    }

    fn is_terminal() -> bool {
        use std::io::IsTerminal;
        io::stdout().is_terminal()
    }

    /// Update to `percent` in `phase` and redraw.
    pub fn set(&mut self, percent: u8, phase: Phase) {
        self.percent = percent.min(100);
        self.phase = phase;
        self.render();
    }

    /// Current percentage.
    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Time since the bar was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Erase the bar so a log line can be printed in its place.
    pub fn clear(&self) {
        if self.enabled {
            print!("\r\x1b[K");
            io::stdout().flush().ok();
        }
    }

    /// Redraw after something else was printed.
    pub fn redraw(&mut self) {
        self.render();
    }

    /// Draw the final state and move to a new line.
    pub fn finish(&mut self) {
        if self.enabled {
            self.render();
            println!();
        }
    }

    fn render(&mut self) {
        if !self.enabled {
            return;
        }
        let line = self.line();
        print!("\r\x1b[K{line}");
        io::stdout().flush().ok();
    }

    /// The text of the progress line.
    fn line(&mut self) -> String {
        let elapsed = format_duration(self.start_time.elapsed());
        match self.style {
            ProgressStyle::Bar => {
                let filled = self.width * usize::from(self.percent) / 100;
                let head = if filled > 0 && filled < self.width { ">" } else { "" };
                let body = "=".repeat(filled.saturating_sub(head.len()));
                let empty = " ".repeat(self.width - filled);
                format!(
                    "{} [{body}{head}{empty}] {}% {elapsed}",
                    self.phase.label(),
                    self.percent
                )
            }
            ProgressStyle::Spinner => {
                let frame = SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()];
                self.spinner_frame += 1;
                format!("{frame} {} ({}%) {elapsed}", self.phase.label(), self.percent)
            }
            ProgressStyle::Percent => format!("{} ({}%)", self.phase.label(), self.percent),
        }
    }
}

/// Format a duration as a human-readable string.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
