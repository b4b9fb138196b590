//! Declarative task model
//!
//! A [`Task`] is a closed set of target kinds. Today there is one kind,
//! a git working copy; adding another means adding a variant here and an
//! arm in the engine dispatch.

pub mod descriptor;
pub mod error;
pub mod loader;

use std::path::Path;

pub use descriptor::{
    derive_path, normalize_source, resolve_local_source, GitTarget, GlobalOptions, OneOrMany,
};
pub use error::ConfigError;
pub use loader::{ensure_unique_paths, TaskSet};

/// One synchronization unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Git(GitTarget),
}

impl Task {
    /// Absolute destination of the working copy
    pub fn path(&self) -> &Path {
        match self {
            Task::Git(target) => &target.path,
        }
    }

    /// Identifier shown in reports
    pub fn source(&self) -> &str {
        match self {
            Task::Git(target) => &target.source,
        }
    }

    pub fn is_delete(&self) -> bool {
        match self {
            Task::Git(target) => target.delete,
        }
    }
}
