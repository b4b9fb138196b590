//! Configuration loading with destination uniqueness enforcement

use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::descriptor::{GitTarget, GlobalOptions, RawOptions, RawTask};
use super::error::ConfigError;
use super::Task;
use crate::utils::{absolute_path, real_path};

/// Whole file as written
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    options: Option<RawOptions>,
    #[serde(default)]
    tasks: Option<Vec<RawTask>>,
}

/// Validated contents of one configuration file
#[derive(Debug, Clone)]
pub struct TaskSet {
    /// Absolute path of the configuration file
    pub config_path: PathBuf,
    /// Directory relative paths are resolved against
    pub base_dir: PathBuf,
    pub options: GlobalOptions,
    pub tasks: Vec<Task>,
}

impl TaskSet {
    /// Reads and validates a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content, &absolute_path(&cwd, path))
    }

    /// Validates YAML content as if it had been read from `config_path`
    pub fn from_yaml(content: &str, config_path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: config_path.to_path_buf(),
                source,
            })?
        };

        let base_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        let options = GlobalOptions::resolve(raw.options.unwrap_or_default(), &base_dir);

        let mut tasks = Vec::new();
        for (index, raw_task) in raw.tasks.unwrap_or_default().into_iter().enumerate() {
            let target = GitTarget::validate(raw_task, &options, &base_dir, index)?;
            tasks.push(Task::Git(target));
        }
        ensure_unique_paths(&tasks)?;

        debug!(config = %config_path.display(), tasks = tasks.len(), "configuration loaded");
        Ok(Self {
            config_path: config_path.to_path_buf(),
            base_dir,
            options,
            tasks,
        })
    }
}

/// Rejects two tasks sharing a destination, literally or through symlinks
pub fn ensure_unique_paths(tasks: &[Task]) -> Result<(), ConfigError> {
    let mut claimed: HashMap<PathBuf, &str> = HashMap::with_capacity(tasks.len() * 2);
    for task in tasks {
        let literal = task.path().to_path_buf();
        let resolved = real_path(&literal);
        let keys: BTreeSet<PathBuf> = [literal, resolved].into_iter().collect();

        for key in &keys {
            if let Some(first) = claimed.get(key) {
                return Err(ConfigError::DuplicatePath {
                    path: key.clone(),
                    first: first.to_string(),
                    second: task.source().to_string(),
                });
            }
        }
        for key in keys {
            claimed.insert(key, task.source());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_empty_task_set() {
        let set = TaskSet::from_yaml("", Path::new("/srv/fleet.yaml")).unwrap();
        assert!(set.tasks.is_empty());
        assert_eq!(set.base_dir, PathBuf::from("/srv"));
        assert!(set.options.git_pull);
    }

    #[test]
    fn test_tasks_resolve_against_config_dir() {
        let yaml = r#"
options:
  git_clone_args: ["--depth", "1"]
  exec_after: "make"
tasks:
  - git: https://example.test/alpha.git
  - git: https://example.test/beta
    path: vendor/beta
    revision: v1.0
"#;
        let set = TaskSet::from_yaml(yaml, Path::new("/srv/fleet/repos.yaml")).unwrap();
        assert_eq!(set.tasks.len(), 2);
        assert_eq!(set.tasks[0].path(), Path::new("/srv/fleet/alpha"));
        assert_eq!(set.tasks[1].path(), Path::new("/srv/fleet/vendor/beta"));
        let Task::Git(beta) = &set.tasks[1];
        assert_eq!(beta.revision.as_deref(), Some("v1.0"));
        assert_eq!(beta.clone_args, vec!["--depth", "1"]);
        assert_eq!(beta.hooks_after, vec!["make"]);
    }

    #[test]
    fn test_unknown_field_is_schema_error() {
        let yaml = "tasks:\n  - git: https://example.test/a\n    branch: main\n";
        let err = TaskSet::from_yaml(yaml, Path::new("/srv/f.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_duplicate_literal_path_rejected() {
        let yaml = r#"
tasks:
  - git: https://example.test/one/lib.git
  - git: https://example.test/two/lib
"#;
        let err = TaskSet::from_yaml(yaml, Path::new("/srv/f.yaml")).unwrap_err();
        match err {
            ConfigError::DuplicatePath { path, first, second } => {
                assert_eq!(path, PathBuf::from("/srv/lib"));
                assert_eq!(first, "https://example.test/one/lib.git");
                assert_eq!(second, "https://example.test/two/lib");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_spelling_rejected() {
        let yaml = r#"
tasks:
  - git: https://example.test/lib
    path: vendor/lib
  - git: https://example.test/lib
    path: ./vendor/../vendor/lib/
"#;
        let err = TaskSet::from_yaml(yaml, Path::new("/srv/f.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicatePath { .. }));
    }

    #[test]
    fn test_missing_keyword_reported() {
        let yaml = "tasks:\n  - path: somewhere\n";
        let err = TaskSet::from_yaml(yaml, Path::new("/srv/f.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKind { index: 0, .. }));
    }
}
