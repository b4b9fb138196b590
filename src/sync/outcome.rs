//! Per-target result record

use std::path::{Path, PathBuf};

use crate::git::{Action, CommandError, Status};

/// Indentation applied to every line below an outcome header
pub const INDENT: usize = 4;

/// Result of one target's pipeline
///
/// Created empty when the pipeline starts and only ever appended to by that
/// pipeline; the aggregator reads it after the pipeline returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub path: PathBuf,
    pub source: String,
    /// `None` when the pipeline never got as far as classifying the target
    pub action: Option<Action>,
    pub lines: Vec<String>,
    pub error: bool,
    pub changed: bool,
}

impl Outcome {
    pub fn new(path: impl AsRef<Path>, source: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            source: source.into(),
            action: None,
            lines: Vec::new(),
            error: false,
            changed: false,
        }
    }

    /// Outcome for a pipeline that died without returning
    pub fn aborted(path: impl AsRef<Path>, source: impl Into<String>, reason: &str) -> Self {
        let mut outcome = Self::new(path, source);
        outcome.push(format!("[ERROR] {reason}"));
        outcome.error = true;
        outcome
    }

    pub fn status(&self) -> Status {
        Status::from_flags(self.error, self.changed)
    }

    /// Appends a header line (no indentation)
    pub fn header(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Appends one line at the standard indentation
    pub fn push(&mut self, line: impl AsRef<str>) {
        self.lines.push(indent(line.as_ref(), 1));
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.push(format!("[INFO] {}", message.as_ref()));
    }

    /// Appends captured command output verbatim, indented one level
    pub fn push_block(&mut self, lines: &[String]) {
        self.lines.extend(lines.iter().map(|line| indent(line, 1)));
    }

    /// Records a failure with its message and any captured output
    pub fn record_error(&mut self, message: &str, command: Option<&CommandError>) {
        self.error = true;
        self.push(format!("[ERROR] {message}"));
        if let Some(command) = command {
            self.lines
                .extend(command.stdout().iter().map(|line| indent(line, 2)));
            self.lines
                .extend(command.stderr().iter().map(|line| indent(line, 2)));
        }
    }

    /// Full log as one string
    pub fn output(&self) -> String {
        self.lines.join("\n")
    }
}

fn indent(line: &str, depth: usize) -> String {
    if line.is_empty() {
        return String::new();
    }
    format!("{}{}", " ".repeat(INDENT * depth), line)
}
