//! Command runners for observing or replacing git in tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use repofleet::git::{CommandError, CommandOutput, CommandRunner, EnvMap, Invocation, ProcessRunner};

/// Delegates to the real runner and records every command line
#[derive(Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<String>>,
}

impl RecordingRunner {
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    /// Recorded git subcommands equal to `subcommand`
    pub fn count(&self, subcommand: &str) -> usize {
        self.commands()
            .iter()
            .filter(|line| line.split_whitespace().nth(1) == Some(subcommand))
            .count()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation, env: &EnvMap) -> Result<CommandOutput, CommandError> {
        self.commands.lock().unwrap().push(invocation.command_line());
        ProcessRunner.run(invocation, env).await
    }
}

/// Answers git without touching the disk
///
/// `git clone` sleeps for `delay` and then succeeds, unless the source
/// contains `invalid` (fails) or `panic` (panics). Every other command
/// succeeds immediately with empty output, except `symbolic-ref`,
/// `rev-parse` and `config --get`, which fail as on a detached HEAD
/// without remotes.
pub struct ScriptedRunner {
    delay: Duration,
    active: AtomicUsize,
    max_active: AtomicUsize,
    clones: AtomicUsize,
}

impl ScriptedRunner {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            clones: AtomicUsize::new(0),
        }
    }

    /// Highest number of clones observed running at once
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    /// Clones started so far
    pub fn clones(&self) -> usize {
        self.clones.load(Ordering::SeqCst)
    }

    fn failure(invocation: &Invocation, code: i32, stderr: &str) -> CommandError {
        CommandError::Failed {
            command: invocation.command_line(),
            code: Some(code),
            stdout: Vec::new(),
            stderr: vec![stderr.to_string()],
        }
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation, _env: &EnvMap) -> Result<CommandOutput, CommandError> {
        let args: Vec<&str> = invocation.args.iter().map(String::as_str).collect();
        match args.first().copied() {
            Some("clone") => {
                self.clones.fetch_add(1, Ordering::SeqCst);
                let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
                let _guard = ActiveGuard(&self.active);
                self.max_active.fetch_max(now, Ordering::SeqCst);

                tokio::time::sleep(self.delay).await;
                let source = args.len().checked_sub(2).map_or("", |i| args[i]);
                if source.contains("panic") {
                    panic!("scripted panic for {source}");
                }
                if source.contains("invalid") {
                    return Err(Self::failure(
                        invocation,
                        128,
                        "fatal: repository 'invalid' does not exist",
                    ));
                }
                Ok(CommandOutput::default())
            }
            Some("symbolic-ref") | Some("rev-parse") => Err(Self::failure(invocation, 1, "")),
            Some("config") if args.contains(&"--get") => Err(Self::failure(invocation, 1, "")),
            _ => Ok(CommandOutput::default()),
        }
    }
}
