//! Git argument construction and working-copy queries
//!
//! Queries that are used for branching (does this revision exist? is HEAD a
//! branch?) return `Option`/`bool`; only commands whose failure is a real
//! error return `Result`.

use std::path::{Path, PathBuf};

use super::runner::{CommandError, CommandOutput, CommandRunner, EnvMap, Invocation};

// Remote name the engine manages
pub const ORIGIN: &str = "origin";

// Git command arguments
const GIT_SYMBOLIC_REF_ARGS: &[&str] = &["symbolic-ref", "--short", "HEAD"];
const GIT_FULL_NAME_ARGS: &[&str] = &["rev-parse", "--symbolic-full-name", "HEAD"];
const GIT_FETCH_ORIGIN_ARGS: &[&str] = &["fetch", ORIGIN];
const GIT_TAG_POINTS_AT_HEAD_ARGS: &[&str] = &["tag", "--points-at", "HEAD"];
const GIT_SUBMODULE_UPDATE_ARGS: &[&str] = &["submodule", "update", "--recursive"];
const GIT_LOG_FORMAT: &str = "--pretty=format:%h %ad %s [%cn]";

const LOCAL_BRANCH_PREFIX: &str = "refs/heads/";

/// Handle on one working copy: the path plus the means to run git inside it
pub struct GitRepo<'a> {
    runner: &'a dyn CommandRunner,
    env: &'a EnvMap,
    path: PathBuf,
}

impl<'a> GitRepo<'a> {
    pub fn new(runner: &'a dyn CommandRunner, env: &'a EnvMap, path: impl AsRef<Path>) -> Self {
        Self {
            runner,
            env,
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Builds a git invocation rooted in the working copy
    pub fn invocation<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::git(args).current_dir(&self.path)
    }

    /// Runs git inside the working copy
    pub async fn git<I, S>(&self, args: I) -> Result<CommandOutput, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runner.run(&self.invocation(args), self.env).await
    }

    /// Checks whether `path` looks like the top of a git working copy
    pub fn is_working_copy(path: &Path) -> bool {
        path.join(".git").is_dir()
    }

    /// Name of the checked-out branch, `None` when HEAD is detached
    pub async fn current_branch(&self) -> Option<String> {
        self.git(GIT_SYMBOLIC_REF_ARGS.iter().copied())
            .await
            .ok()
            .and_then(|output| output.first_line().map(str::to_string))
    }

    /// True when HEAD resolves to a ref under `refs/heads/`
    pub async fn head_is_local_branch(&self) -> bool {
        match self.git(GIT_FULL_NAME_ARGS.iter().copied()).await {
            Ok(output) => output
                .first_line()
                .is_some_and(|name| name.starts_with(LOCAL_BRANCH_PREFIX)),
            Err(_) => false,
        }
    }

    /// Resolves a revision to an object id; `None` when it does not exist locally
    pub async fn resolve(&self, revision: &str) -> Option<String> {
        self.git(["rev-parse", "--verify", "--quiet", revision])
            .await
            .ok()
            .and_then(|output| output.first_line().map(str::to_string))
    }

    /// Resolves a revision and peels it to the commit it designates
    pub async fn resolve_commit(&self, revision: &str) -> Option<String> {
        self.resolve(&format!("{revision}^{{commit}}")).await
    }

    /// Commit id of HEAD, `None` for an unborn branch
    pub async fn head_commit(&self) -> Option<String> {
        self.resolve_commit("HEAD").await
    }

    /// Checks for an exact ref such as `refs/heads/main`
    pub async fn has_ref(&self, full_ref: &str) -> bool {
        self.git(["show-ref", "--verify", "--quiet", full_ref])
            .await
            .is_ok()
    }

    pub async fn is_local_branch(&self, name: &str) -> bool {
        self.has_ref(&format!("{LOCAL_BRANCH_PREFIX}{name}")).await
    }

    pub async fn is_tag(&self, name: &str) -> bool {
        self.has_ref(&format!("refs/tags/{name}")).await
    }

    /// Tags attached to the commit HEAD points at
    pub async fn tags_at_head(&self) -> Result<Vec<String>, CommandError> {
        let output = self.git(GIT_TAG_POINTS_AT_HEAD_ARGS.iter().copied()).await?;
        Ok(output
            .stdout
            .iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }

    /// Configured URL of a remote, `None` when the remote is missing
    pub async fn remote_url(&self, remote: &str) -> Option<String> {
        self.git(["config", "--get", &format!("remote.{remote}.url")])
            .await
            .ok()
            .and_then(|output| output.first_line().map(str::to_string))
    }

    /// Replaces a remote with one pointing at `url`
    pub async fn replace_remote(&self, remote: &str, url: &str) -> Result<(), CommandError> {
        // Removing a remote that does not exist is fine
        let _ = self.git(["remote", "remove", remote]).await;
        self.git(["remote", "add", remote, url]).await?;
        Ok(())
    }

    pub fn fetch_origin_invocation(&self) -> Invocation {
        self.invocation(GIT_FETCH_ORIGIN_ARGS.iter().copied())
    }

    pub fn set_upstream_invocation(&self, branch: &str) -> Invocation {
        self.invocation([
            "branch".to_string(),
            format!("--set-upstream-to={ORIGIN}/{branch}"),
        ])
    }

    pub fn merge_ff_only_invocation(&self, branch: &str) -> Invocation {
        self.invocation([
            "merge".to_string(),
            "--ff-only".to_string(),
            format!("{ORIGIN}/{branch}"),
        ])
    }

    pub fn checkout_invocation(&self, target: &str) -> Invocation {
        self.invocation(["checkout", target])
    }

    pub fn submodule_update_invocation(&self) -> Invocation {
        self.invocation(GIT_SUBMODULE_UPDATE_ARGS.iter().copied())
    }

    pub fn log_range_invocation(&self, from: &str, to: &str) -> Invocation {
        self.invocation([
            "log".to_string(),
            GIT_LOG_FORMAT.to_string(),
            "--decorate".to_string(),
            "--date=short".to_string(),
            format!("{from}..{to}"),
        ])
    }

    pub fn has_submodules(&self) -> bool {
        self.path.join(".gitmodules").is_file()
    }
}

/// `git clone <extra args> <source> <destination>`
pub fn clone_invocation(clone_args: &[String], source: &str, destination: &Path) -> Invocation {
    let mut args: Vec<String> = Vec::with_capacity(clone_args.len() + 4);
    args.push("clone".to_string());
    args.extend(clone_args.iter().cloned());
    args.push(source.to_string());
    args.push(destination.to_string_lossy().into_owned());
    Invocation::git(args)
}
