//! External command execution
//!
//! Every interaction with the working copy goes through [`CommandRunner`].
//! The runner never interprets output: it captures stdout/stderr as lines and
//! turns a non-zero exit into [`CommandError::Failed`].

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Environment overrides applied on top of the inherited process environment
pub type EnvMap = Arc<BTreeMap<String, String>>;

/// Errors raised by a [`CommandRunner`]
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process ran and exited with a non-zero status
    #[error("Command '{command}' returned non-zero exit status {}", display_code(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stdout: Vec<String>,
        stderr: Vec<String>,
    },

    /// The process could not be started at all
    #[error("Failed to execute '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "(killed by signal)".to_string(),
    }
}

impl CommandError {
    /// Captured stdout lines, empty when the process never started
    pub fn stdout(&self) -> &[String] {
        match self {
            CommandError::Failed { stdout, .. } => stdout,
            CommandError::Spawn { .. } => &[],
        }
    }

    /// Captured stderr lines, empty when the process never started
    pub fn stderr(&self) -> &[String] {
        match self {
            CommandError::Failed { stderr, .. } => stderr,
            CommandError::Spawn { .. } => &[],
        }
    }
}

/// A single process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    /// Convenience constructor for `git <args>`
    pub fn git<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("git", args)
    }

    pub fn current_dir(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Renders the invocation the way a user would type it
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(quote_arg(&self.program));
        parts.extend(self.args.iter().map(|arg| quote_arg(arg)));
        parts.join(" ")
    }
}

fn quote_arg(arg: &str) -> String {
    if !arg.is_empty()
        && !arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'))
    {
        return arg.to_string();
    }
    format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Captured output of a successful invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl CommandOutput {
    /// First stdout line, trimmed; `None` when the command printed nothing
    pub fn first_line(&self) -> Option<&str> {
        self.stdout
            .first()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
    }
}

/// Runs a command, captures its output, reports failure on non-zero exit
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation, env: &EnvMap)
        -> Result<CommandOutput, CommandError>;
}

/// [`CommandRunner`] backed by real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        env: &EnvMap,
    ) -> Result<CommandOutput, CommandError> {
        let command_line = invocation.command_line();
        debug!(command = %command_line, cwd = ?invocation.cwd, "running command");

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(env.iter())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        let output = command.output().await.map_err(|source| CommandError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        let stdout = split_lines(&output.stdout);
        let stderr = split_lines(&output.stderr);

        if output.status.success() {
            Ok(CommandOutput { stdout, stderr })
        } else {
            debug!(command = %command_line, code = ?output.status.code(), "command failed");
            Err(CommandError::Failed {
                command: command_line,
                code: output.status.code(),
                stdout,
                stderr,
            })
        }
    }
}

fn split_lines(raw: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(raw)
        .lines()
        .map(|line| line.to_string())
        .collect()
}

/// Environment every git invocation receives: no credential prompts, no pager
pub fn git_environment() -> EnvMap {
    let mut env = BTreeMap::new();
    env.insert("GIT_TERMINAL_PROMPT".to_string(), "0".to_string());
    env.insert("GIT_PAGER".to_string(), String::new());
    Arc::new(env)
}
