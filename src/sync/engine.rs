//! Per-target synchronization state machine
//!
//! ```text
//! ABSENT --clone--> PRESENT --delete--> ABSENT
//! PRESENT: hooks_before -> fix remote -> maybe fetch -> maybe merge
//!          -> maybe switch -> submodules -> hooks_after (if changed)
//! ```
//!
//! Every step goes through the [`CommandRunner`]; the engine itself only
//! builds arguments and decides what to run. A failing step stops the
//! pipeline of its own target and nothing else.

use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use super::hooks::run_hooks;
use super::outcome::Outcome;
use crate::git::{
    clone_invocation, Action, CommandError, CommandOutput, CommandRunner, EnvMap, GitRepo,
    Invocation, ORIGIN,
};
use crate::task::{GitTarget, Task};

// Flags every clone receives in addition to the configured ones
const BUILTIN_CLONE_ARGS: &[&str] = &["--recurse-submodules"];

/// Errors that stop one target's pipeline
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("The revision '{0}' does not exist.")]
    RevisionNotFound(String),

    #[error("Cannot be deleted because '{0}' is not a Git repository")]
    NotARepository(PathBuf),

    #[error("Failed to set the Git remote '{remote}' to '{url}'")]
    Remote {
        remote: String,
        url: String,
        #[source]
        source: CommandError,
    },

    #[error("Failed to delete '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Captured command output worth attaching to the report, if any
    pub fn command(&self) -> Option<&CommandError> {
        match self {
            SyncError::Command(source) | SyncError::Remote { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Runs target pipelines against a [`CommandRunner`]
pub struct SyncEngine<'a> {
    runner: &'a dyn CommandRunner,
    env: &'a EnvMap,
}

impl<'a> SyncEngine<'a> {
    pub fn new(runner: &'a dyn CommandRunner, env: &'a EnvMap) -> Self {
        Self { runner, env }
    }

    /// Runs the pipeline for one task and returns its finished outcome
    pub async fn run(&self, task: &Task) -> Outcome {
        match task {
            Task::Git(target) => self.sync_git(target).await,
        }
    }

    async fn sync_git(&self, target: &GitTarget) -> Outcome {
        let action = Action::classify(target.delete, target.path.exists());
        info!(path = %target.path.display(), action = action.label(), "starting target");

        let mut pass = GitPass {
            runner: self.runner,
            env: self.env,
            repo: GitRepo::new(self.runner, self.env, &target.path),
            target,
            outcome: Outcome::new(&target.path, &target.source),
            branch: None,
            fetched: false,
        };
        pass.outcome.action = Some(action);
        pass.outcome.header(header_line(action, target));

        let result = match action {
            Action::Delete => pass.delete().await,
            Action::Clone => match pass.clone_repo().await {
                Ok(()) => pass.update().await,
                Err(err) => Err(err),
            },
            Action::Update => pass.update().await,
        };

        let mut outcome = pass.outcome;
        if let Err(err) = result {
            debug!(path = %target.path.display(), error = %err, "target failed");
            outcome.record_error(&err.to_string(), err.command());
        }
        if !outcome.error && !outcome.changed {
            outcome.info("Nothing to do.");
        }
        outcome
    }
}

fn header_line(action: Action, target: &GitTarget) -> String {
    match &target.revision {
        Some(revision) => format!(
            "[GIT {}] {} (Ref: {})",
            action.label(),
            target.source,
            revision
        ),
        None => format!("[GIT {}] {}", action.label(), target.source),
    }
}

/// State of one pipeline run; owned by the worker executing it
struct GitPass<'a> {
    runner: &'a dyn CommandRunner,
    env: &'a EnvMap,
    repo: GitRepo<'a>,
    target: &'a GitTarget,
    outcome: Outcome,
    /// Checked-out branch, `None` when HEAD is detached
    branch: Option<String>,
    /// Set once the remote has been contacted in this run
    fetched: bool,
}

impl GitPass<'_> {
    /// Runs a mutating command, logging it and its stdout in the outcome
    async fn run_logged(&mut self, invocation: Invocation) -> Result<CommandOutput, CommandError> {
        self.outcome
            .push(format!("[RUN] {}", invocation.command_line()));
        let output = self.runner.run(&invocation, self.env).await?;
        self.outcome.push_block(&output.stdout);
        Ok(output)
    }

    async fn delete(&mut self) -> Result<(), SyncError> {
        let path = self.repo.path().to_path_buf();
        if !path.exists() {
            self.outcome.info("Already deleted");
            return Ok(());
        }
        if !GitRepo::is_working_copy(&path) {
            return Err(SyncError::NotARepository(path));
        }
        tokio::fs::remove_dir_all(&path)
            .await
            .map_err(|source| SyncError::Io {
                path: path.clone(),
                source,
            })?;
        self.outcome.info(format!("Deleted: '{}'", path.display()));
        self.outcome.changed = true;
        Ok(())
    }

    async fn clone_repo(&mut self) -> Result<(), SyncError> {
        let mut args = self.target.clone_args.clone();
        for builtin in BUILTIN_CLONE_ARGS {
            if !args.iter().any(|arg| arg == builtin) {
                args.push(builtin.to_string());
            }
        }
        let invocation = clone_invocation(&args, &self.target.source, self.repo.path());
        self.run_logged(invocation).await?;
        self.outcome.changed = true;
        // A fresh clone already holds everything the remote has
        self.fetched = true;
        Ok(())
    }

    async fn update(&mut self) -> Result<(), SyncError> {
        self.branch = self.repo.current_branch().await;

        let cwd = self.repo.path().to_path_buf();
        run_hooks(
            self.runner,
            self.env,
            &self.target.hooks_before,
            &cwd,
            &mut self.outcome,
        )
        .await?;

        self.fix_remote_origin().await?;
        self.maybe_fetch().await?;

        let merged = if self.fetched {
            self.maybe_merge().await?
        } else {
            false
        };
        let switched = self.maybe_switch().await?;

        if merged || switched {
            self.update_submodules().await?;
        }

        if self.outcome.changed {
            run_hooks(
                self.runner,
                self.env,
                &self.target.hooks_after,
                &cwd,
                &mut self.outcome,
            )
            .await?;
        }
        Ok(())
    }

    /// Points `origin` at the configured source before any remote operation
    async fn fix_remote_origin(&mut self) -> Result<(), SyncError> {
        let wanted = self.target.source.clone();
        if self.repo.remote_url(ORIGIN).await.as_deref() == Some(wanted.as_str()) {
            return Ok(());
        }

        self.outcome
            .info(format!("Git remote '{ORIGIN}' set to {wanted}"));
        self.repo
            .replace_remote(ORIGIN, &wanted)
            .await
            .map_err(|source| SyncError::Remote {
                remote: ORIGIN.to_string(),
                url: wanted.clone(),
                source,
            })?;

        if let Some(branch) = self.branch.clone() {
            self.outcome.info(format!(
                "Git fetch origin reason: we need to set the upstream origin to {branch}"
            ));
            self.fetch_origin().await?;
            let invocation = self.repo.set_upstream_invocation(&branch);
            self.run_logged(invocation).await?;
        }
        Ok(())
    }

    /// Why the remote must be contacted, `None` when local state is enough
    async fn fetch_reason(&self) -> Option<String> {
        let Some(revision) = self.target.revision.as_deref() else {
            return Some("No 'revision:' specified".to_string());
        };
        if let Some(branch) = &self.branch {
            return Some(format!("HEAD is the branch '{branch}'"));
        }
        if self.repo.resolve_commit(revision).await.is_none() {
            return Some(format!("The revision does not exist: {revision}"));
        }
        // A tag wins over a branch of the same name
        if self.repo.is_local_branch(revision).await && !self.repo.is_tag(revision).await {
            return Some(format!("{revision} is a branch, not a tag"));
        }
        None
    }

    async fn maybe_fetch(&mut self) -> Result<(), SyncError> {
        if self.fetched {
            return Ok(());
        }
        match self.fetch_reason().await {
            Some(reason) => {
                info!(path = %self.repo.path().display(), %reason, "fetching");
                self.outcome
                    .info(format!("Git fetch origin reason: {reason}"));
                self.fetch_origin().await?;
            }
            None => {
                info!(path = %self.repo.path().display(), "fetch skipped");
                self.outcome.info("git fetch ignored");
            }
        }
        Ok(())
    }

    /// `git fetch origin`, at most once per run
    async fn fetch_origin(&mut self) -> Result<(), SyncError> {
        if self.fetched {
            return Ok(());
        }
        let invocation = self.repo.fetch_origin_invocation();
        self.run_logged(invocation).await?;
        self.fetched = true;
        Ok(())
    }

    /// Fast-forwards the checked-out branch onto its remote counterpart
    async fn maybe_merge(&mut self) -> Result<bool, SyncError> {
        let Some(branch) = self.branch.clone() else {
            return Ok(false);
        };
        if !self.target.sync_enabled {
            self.outcome.info("git merge skipped (git_pull: false)");
            return Ok(false);
        }
        if !self.repo.head_is_local_branch().await {
            return Ok(false);
        }
        if self
            .repo
            .resolve_commit(&format!("{ORIGIN}/{branch}"))
            .await
            .is_none()
        {
            return Ok(false);
        }

        let before = self.repo.head_commit().await;
        let invocation = self.repo.merge_ff_only_invocation(&branch);
        self.run_logged(invocation).await?;
        let after = self.repo.head_commit().await;

        if before == after {
            return Ok(false);
        }
        self.outcome.changed = true;
        if let (Some(before), Some(after)) = (before, after) {
            let invocation = self.repo.log_range_invocation(&before, &after);
            self.run_logged(invocation).await?;
        }
        Ok(true)
    }

    /// Resolves the configured revision to (commit, checkout target)
    ///
    /// Order: tag, then `origin/<revision>`, then the bare name. The tag
    /// precedence matches the one in [`Self::fetch_reason`]; change both
    /// together.
    async fn resolve_revision(&self, revision: &str) -> Option<(String, String)> {
        if self.repo.is_tag(revision).await {
            if let Some(commit) = self
                .repo
                .resolve_commit(&format!("refs/tags/{revision}"))
                .await
            {
                return Some((commit, format!("tags/{revision}")));
            }
        }
        if let Some(commit) = self
            .repo
            .resolve_commit(&format!("{ORIGIN}/{revision}"))
            .await
        {
            return Some((commit, revision.to_string()));
        }
        self.repo
            .resolve_commit(revision)
            .await
            .map(|commit| (commit, revision.to_string()))
    }

    /// Checks out the configured revision when HEAD is somewhere else
    async fn maybe_switch(&mut self) -> Result<bool, SyncError> {
        let Some(revision) = self.target.revision.clone() else {
            return Ok(false);
        };
        // Checking out the branch that is already checked out changes nothing
        if self.branch.as_deref() == Some(revision.as_str()) {
            return Ok(false);
        }

        let (wanted, checkout_target) = self
            .resolve_revision(&revision)
            .await
            .ok_or_else(|| SyncError::RevisionNotFound(revision.clone()))?;
        let head = self.repo.head_commit().await;
        let tags_at_head = self.repo.tags_at_head().await?;

        if head.as_deref() == Some(wanted.as_str()) || tags_at_head.contains(&revision) {
            return Ok(false);
        }

        let invocation = self.repo.checkout_invocation(&checkout_target);
        self.run_logged(invocation).await?;
        self.outcome
            .info(format!("Branch changed to {revision}"));
        self.outcome.changed = true;
        self.branch = self.repo.current_branch().await;
        Ok(true)
    }

    async fn update_submodules(&mut self) -> Result<(), SyncError> {
        if self.repo.has_submodules() {
            let invocation = self.repo.submodule_update_invocation();
            self.run_logged(invocation).await?;
        }
        Ok(())
    }
}
