//! Public API for git operations.
//!
//! This module provides the stable public API for git-related functionality:
//! - The command runner boundary and its process-backed implementation
//! - Working-copy queries used by the sync engine
//! - Target classification and status
//!
//! ## Example: resolving a revision
//!
//! ```rust,no_run
//! use repofleet::git::{git_environment, GitRepo, ProcessRunner};
//! use std::path::Path;
//!
//! async fn head(path: &Path) -> Option<String> {
//!     let env = git_environment();
//!     let repo = GitRepo::new(&ProcessRunner, &env, path);
//!     repo.head_commit().await
//! }
//! ```

// Command runner boundary
pub use super::runner::{
    git_environment, CommandError, CommandOutput, CommandRunner, EnvMap, Invocation,
    ProcessRunner,
};

// Working-copy queries
pub use super::operations::{clone_invocation, GitRepo, ORIGIN};

// Classification
pub use super::status::{Action, Status};
