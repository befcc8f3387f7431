//! Interactive shell around the working list.
//!
//! Prints the numbered list, applies edit commands, and runs merges on the
//! background worker while rendering its events.

use std::io::{self, BufRead, Write};

use foldercat::error::{FolderCatError, Result};
use foldercat::output::{
    OutputFormatter, ProgressBar, ProgressStyle, display_list, display_report,
};
use foldercat::pipeline::MergeReport;
use foldercat::session::WorkingList;
use foldercat::worker::{MergeEvent, MergeWorker};

const HELP: &str = "Commands: u N (up), d N (down), r N (remove), l (list), g (reload), s (start), q (quit)";

/// One line of shell input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Move entry N (1-based) up.
    Up(usize),
    /// Move entry N down.
    Down(usize),
    /// Remove entry N from the list.
    Remove(usize),
    /// Print the list.
    List,
    /// Re-read the folder.
    Reload,
    /// Run the merge.
    Start,
    /// Leave the shell.
    Quit,
    /// Print the command summary.
    Help,
}

impl Command {
    /// Parse a command line.
    ///
    /// # Errors
    ///
    /// Returns a message for unknown commands and missing or invalid entry
    /// numbers.
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Ok(Self::List);
        };

        let entry = |raw: Option<&str>| -> std::result::Result<usize, String> {
            let raw = raw.ok_or_else(|| format!("'{word}' needs an entry number"))?;
            match raw.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(n),
                _ => Err(format!("Invalid entry number: {raw}")),
            }
        };

        let command = match word.to_lowercase().as_str() {
            "u" | "up" => Self::Up(entry(parts.next())?),
            "d" | "down" => Self::Down(entry(parts.next())?),
            "r" | "rm" | "remove" => Self::Remove(entry(parts.next())?),
            "l" | "ls" | "list" => Self::List,
            "g" | "reload" => Self::Reload,
            "s" | "start" => Self::Start,
            "q" | "quit" | "exit" => Self::Quit,
            "h" | "?" | "help" => Self::Help,
            other => return Err(format!("Unknown command: {other}")),
        };

        if parts.next().is_some() {
            return Err(format!("Too many arguments for '{word}'"));
        }
        Ok(command)
    }
}

/// The interactive session.
pub struct Shell<R> {
    list: WorkingList,
    worker: MergeWorker,
    formatter: OutputFormatter,
    input: R,
    json: bool,
}

impl<R: BufRead> Shell<R> {
    /// Create a shell reading commands from `input`.
    pub fn new(
        list: WorkingList,
        worker: MergeWorker,
        formatter: OutputFormatter,
        input: R,
        json: bool,
    ) -> Self {
        Self {
            list,
            worker,
            formatter,
            input,
            json,
        }
    }

    /// The working list as currently edited.
    pub fn list(&self) -> &WorkingList {
        &self.list
    }

    /// Read and apply commands until `q` or end of input.
    ///
    /// Merge failures are reported and the loop continues.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub fn run(&mut self) -> Result<()> {
        display_list(&self.formatter, &self.list);
        self.formatter.info(HELP);

        while let Some(line) = self.prompt("> ")? {
            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(message) => {
                    self.formatter.warning(&message);
                    continue;
                }
            };

            match command {
                Command::Quit => break,
                Command::Start => {
                    if let Err(e) = self.merge() {
                        self.formatter.error(&format!("Error: {e}"));
                    }
                }
                other => self.apply(other)?,
            }
        }

        Ok(())
    }

    /// Run one merge, render it, and reload the list afterwards.
    ///
    /// # Errors
    ///
    /// Returns the run's fatal error, or [`FolderCatError::Busy`] if a run
    /// is still in flight.
    pub fn merge(&mut self) -> Result<MergeReport> {
        if self.worker.is_running() {
            return Err(FolderCatError::Busy);
        }
        if self.list.is_empty() {
            return Err(FolderCatError::NoFilesToMerge);
        }

        let result = self.render_run();
        if let Ok(report) = &result {
            self.show_report(report)?;
        }

        self.list.reload()?;
        if !self.json {
            display_list(&self.formatter, &self.list);
        }
        result
    }

    fn render_run(&mut self) -> Result<MergeReport> {
        let mut handle = self.worker.spawn(self.list.to_request())?;
        let mut bar = if self.formatter.is_quiet() || self.json {
            ProgressBar::disabled()
        } else {
            ProgressBar::new(ProgressStyle::Bar)
        };

        while let Some(event) = handle.recv_blocking() {
            match event {
                MergeEvent::Progress { percent, phase } => bar.set(percent, phase),
                MergeEvent::Log(line) => {
                    bar.clear();
                    if !self.json {
                        self.formatter.log_line(&line);
                    }
                    bar.redraw();
                }
                MergeEvent::Finished(result) => {
                    bar.finish();
                    return result;
                }
            }
        }

        Err(FolderCatError::WorkerFailed {
            reason: "worker stopped without a result".to_string(),
        })
    }

    fn show_report(&self, report: &MergeReport) -> Result<()> {
        if self.json {
            let json = serde_json::to_string_pretty(report)
                .map_err(|e| FolderCatError::other(format!("Failed to encode report: {e}")))?;
            println!("{json}");
        } else {
            display_report(&self.formatter, report);
        }
        Ok(())
    }

    fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Up(n) => {
                if !self.list.move_up(n - 1) {
                    self.formatter.warning(&format!("Entry {n} cannot move up."));
                }
            }
            Command::Down(n) => {
                if !self.list.move_down(n - 1) {
                    self.formatter.warning(&format!("Entry {n} cannot move down."));
                }
            }
            Command::Remove(n) => self.remove(n)?,
            Command::Reload => self.list.reload()?,
            Command::Help => {
                self.formatter.info(HELP);
                return Ok(());
            }
            Command::List | Command::Start | Command::Quit => {}
        }

        display_list(&self.formatter, &self.list);
        Ok(())
    }

    fn remove(&mut self, n: usize) -> Result<()> {
        let Some(file) = self.list.get(n - 1) else {
            self.formatter.warning(&format!("No entry {n}."));
            return Ok(());
        };

        let question = format!(
            "Remove '{}' from the list? The file is not deleted. [y/N]: ",
            file.name()
        );
        let answer = self.prompt(&question)?.unwrap_or_default();
        if matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            self.list.remove(n - 1);
        }
        Ok(())
    }

    /// Print `text` and read one line; `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        if !self.formatter.is_quiet() {
            print!("{text}");
            io::stdout().flush().ok();
        }

        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        Ok((read > 0).then(|| line.trim_end().to_string()))
    }
}
