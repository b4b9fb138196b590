//! Run planning: subset selection and the untracked-audit layout

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::task::{ConfigError, Task, TaskSet};
use crate::utils::real_path;

/// Tasks that execute for one configuration file's run
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Tasks whose pipeline executes, in configuration order
    pub selected: Vec<Task>,
}

impl RunPlan {
    /// Builds the plan for `set`, restricted to `requested` when non-empty
    ///
    /// `requested` holds absolute paths.
    pub fn new(set: &TaskSet, requested: &[PathBuf]) -> Self {
        let wanted = RequestedPaths::new(requested);
        let selected = set
            .tasks
            .iter()
            .filter(|task| wanted.is_empty() || wanted.matches(task.path()))
            .cloned()
            .collect();
        Self { selected }
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

/// What the untracked audit expects to find on disk
///
/// Covers every loaded configuration file, selected or not.
#[derive(Debug, Clone, Default)]
pub struct AuditLayout {
    /// Directory holding managed targets -> names owned by targets
    pub expected_children: BTreeMap<PathBuf, BTreeSet<OsString>>,
    /// Absolute paths exempt from the audit
    pub ignore: BTreeSet<PathBuf>,
}

impl AuditLayout {
    pub fn new(sets: &[TaskSet]) -> Self {
        let tasks: Vec<Task> = sets.iter().flat_map(|set| set.tasks.iter().cloned()).collect();
        let mut ignore = BTreeSet::new();
        for set in sets {
            ignore.extend(ignore_set(set));
        }
        Self {
            expected_children: expected_children(&tasks),
            ignore,
        }
    }
}

/// Fails on the first requested path that no task in any set claims
pub fn check_requested(sets: &[TaskSet], requested: &[PathBuf]) -> Result<(), ConfigError> {
    for path in requested {
        let wanted = RequestedPaths::new(std::slice::from_ref(path));
        let known = sets
            .iter()
            .flat_map(|set| set.tasks.iter())
            .any(|task| wanted.matches(task.path()));
        if !known {
            return Err(ConfigError::UnknownTarget(path.clone()));
        }
    }
    Ok(())
}

/// Requested paths in both literal and resolved form
struct RequestedPaths(BTreeSet<PathBuf>);

impl RequestedPaths {
    fn new(paths: &[PathBuf]) -> Self {
        Self(
            paths
                .iter()
                .flat_map(|path| [path.clone(), real_path(path)])
                .collect(),
        )
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn matches(&self, path: &Path) -> bool {
        self.0.contains(path) || self.0.contains(&real_path(path))
    }
}

/// Parent directory -> owned names, for directories holding a kept target
pub fn expected_children(tasks: &[Task]) -> BTreeMap<PathBuf, BTreeSet<OsString>> {
    let mut layout: BTreeMap<PathBuf, BTreeSet<OsString>> = BTreeMap::new();
    for task in tasks.iter().filter(|task| !task.is_delete()) {
        if let Some(parent) = task.path().parent() {
            layout.entry(parent.to_path_buf()).or_default();
        }
    }
    // Deleted targets still own their name until the directory is gone
    for task in tasks {
        let path = task.path();
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            if let Some(names) = layout.get_mut(parent) {
                names.insert(name.to_os_string());
            }
        }
    }
    layout
}

fn ignore_set(set: &TaskSet) -> BTreeSet<PathBuf> {
    let mut ignore = BTreeSet::new();
    ignore.insert(set.config_path.clone());
    ignore.insert(real_path(&set.config_path));
    for entry in &set.options.ignore_untracked {
        ignore.insert(entry.clone());
        ignore.insert(real_path(entry));
    }
    ignore
}
