//! Configuration error taxonomy
//!
//! Every variant is fatal before any target executes.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML or does not match the schema
    #[error("schema error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A task does not name any known target kind
    #[error("task #{index}: none of the keywords {keywords} have been found")]
    MissingKind { index: usize, keywords: String },

    /// A task names an empty source
    #[error("task #{index}: the '{keyword}' value must not be empty")]
    EmptySource { index: usize, keyword: String },

    /// No `path` was given and none can be derived from the source
    #[error("task #{index}: cannot derive a destination path from '{url}'")]
    UnderivablePath { index: usize, url: String },

    /// Two tasks resolve to the same destination
    #[error("more than one task have the destination path '{path}' ({first} and {second})")]
    DuplicatePath {
        path: PathBuf,
        first: String,
        second: String,
    },

    /// A requested subset path matches no task
    #[error("no task has the destination path '{0}'")]
    UnknownTarget(PathBuf),
}
