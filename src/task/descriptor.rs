//! Raw configuration records and validated target descriptors
//!
//! Loading is two-phase: serde produces the `Raw*` records, then
//! [`GlobalOptions::resolve`] and [`GitTarget::validate`] turn them into
//! immutable, normalized values. Nothing downstream ever mutates them.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use crate::utils::absolute_path;

/// Keyword that marks a task as a git target
pub const GIT_KEYWORD: &str = "git";

// Suffix stripped when deriving a directory name from a source URL
const VCS_SUFFIX: &str = ".git";

/// A string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl OneOrMany {
    /// Flattens into trimmed, non-empty entries
    pub fn into_vec(self) -> Vec<String> {
        let items = match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        };
        items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

/// `options:` section as written in the file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawOptions {
    #[serde(default)]
    pub exec_before: OneOrMany,
    #[serde(default)]
    pub exec_after: OneOrMany,
    #[serde(default)]
    pub ignore_untracked: OneOrMany,
    #[serde(default)]
    pub git_clone_args: Vec<String>,
    #[serde(default)]
    pub git_pull: Option<bool>,
}

/// One entry of `tasks:` as written in the file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTask {
    #[serde(default)]
    pub git: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub revision: Option<String>,
    /// Older spelling of `revision`
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub delete: Option<bool>,
    #[serde(default)]
    pub git_clone_args: Option<Vec<String>>,
    #[serde(default)]
    pub git_pull: Option<bool>,
    #[serde(default)]
    pub exec_before: Option<OneOrMany>,
    #[serde(default)]
    pub exec_after: Option<OneOrMany>,
}

/// Global defaults shared read-only by every target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalOptions {
    pub exec_before: Vec<String>,
    pub exec_after: Vec<String>,
    /// Absolute paths exempt from the untracked-path audit
    pub ignore_untracked: Vec<PathBuf>,
    pub git_clone_args: Vec<String>,
    pub git_pull: bool,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            exec_before: Vec::new(),
            exec_after: Vec::new(),
            ignore_untracked: Vec::new(),
            git_clone_args: Vec::new(),
            git_pull: true,
        }
    }
}

impl GlobalOptions {
    /// Resolves the raw section; relative ignore entries are taken from `base_dir`
    pub fn resolve(raw: RawOptions, base_dir: &Path) -> Self {
        Self {
            exec_before: raw.exec_before.into_vec(),
            exec_after: raw.exec_after.into_vec(),
            ignore_untracked: raw
                .ignore_untracked
                .into_vec()
                .into_iter()
                .map(|entry| absolute_path(base_dir, Path::new(&entry)))
                .collect(),
            git_clone_args: trim_all(raw.git_clone_args),
            git_pull: raw.git_pull.unwrap_or(true),
        }
    }
}

/// A validated git synchronization unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitTarget {
    /// Absolute, lexically normalized destination
    pub path: PathBuf,
    /// Remote URL, without trailing slashes
    pub source: String,
    /// Branch, tag or commit; `None` follows the remote default branch
    pub revision: Option<String>,
    pub delete: bool,
    /// Extra `git clone` flags, local list replacing the global one
    pub clone_args: Vec<String>,
    /// Whether fast-forward integration is permitted
    pub sync_enabled: bool,
    /// Global hooks followed by local hooks
    pub hooks_before: Vec<String>,
    pub hooks_after: Vec<String>,
}

impl GitTarget {
    /// Validates and normalizes a raw task against the resolved global options
    ///
    /// `index` is the task's position in the file, used in error messages.
    pub fn validate(
        raw: RawTask,
        options: &GlobalOptions,
        base_dir: &Path,
        index: usize,
    ) -> Result<Self, ConfigError> {
        let source = raw
            .git
            .ok_or_else(|| ConfigError::MissingKind {
                index,
                keywords: GIT_KEYWORD.to_string(),
            })
            .map(|source| normalize_source(&source))?;
        if source.is_empty() {
            return Err(ConfigError::EmptySource {
                index,
                keyword: GIT_KEYWORD.to_string(),
            });
        }

        let relative = match non_empty(raw.path) {
            Some(path) => path,
            None => derive_path(&source).ok_or_else(|| ConfigError::UnderivablePath {
                index,
                url: source.clone(),
            })?,
        };
        let path = absolute_path(base_dir, Path::new(&relative));
        let source = resolve_local_source(source, base_dir);

        let revision = non_empty(raw.revision).or_else(|| non_empty(raw.reference));

        let mut hooks_before = options.exec_before.clone();
        hooks_before.extend(raw.exec_before.unwrap_or_default().into_vec());
        let mut hooks_after = options.exec_after.clone();
        hooks_after.extend(raw.exec_after.unwrap_or_default().into_vec());

        Ok(Self {
            path,
            source,
            revision,
            delete: raw.delete.unwrap_or(false),
            clone_args: raw
                .git_clone_args
                .map(trim_all)
                .unwrap_or_else(|| options.git_clone_args.clone()),
            sync_enabled: raw.git_pull.unwrap_or(options.git_pull),
            hooks_before,
            hooks_after,
        })
    }
}

fn trim_all(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Trims whitespace and trailing slashes from a source URL
pub fn normalize_source(source: &str) -> String {
    source.trim().trim_end_matches('/').to_string()
}

/// Anchors a relative filesystem source at the configuration directory
///
/// URLs (`scheme://...`) and scp-style sources (`host:path`) are returned
/// unchanged.
pub fn resolve_local_source(source: String, base_dir: &Path) -> String {
    let path = Path::new(&source);
    if path.is_absolute() || source.contains("://") {
        return source;
    }
    let head = source.split('/').next().unwrap_or_default();
    if head.contains(':') {
        return source;
    }
    absolute_path(base_dir, path).display().to_string()
}

/// Last path segment of a source, without a `.git` suffix
///
/// Handles scp-style sources (`git@host:group/repo.git`) as well as URLs.
pub fn derive_path(source: &str) -> Option<String> {
    let source = normalize_source(source);
    let segment = source.rsplit(['/', ':']).next()?;
    let name = segment.strip_suffix(VCS_SUFFIX).unwrap_or(segment);
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}
