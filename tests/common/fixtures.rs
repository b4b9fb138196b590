//! Test fixtures: an on-disk fleet with upstream repositories

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use repofleet::git::{git_environment, EnvMap, ProcessRunner};
use repofleet::sync::{Outcome, SyncEngine};
use repofleet::task::{Task, TaskSet};

use super::git::{create_test_commit, setup_git_repo};

/// A temporary fleet layout with automatic cleanup
///
/// ```text
/// <tmp>/upstreams/<name>   repositories targets clone from
/// <tmp>/work/              configuration file and working copies
/// ```
pub struct Fleet {
    pub temp_dir: TempDir,
    pub env: EnvMap,
}

impl Fleet {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        std::fs::create_dir(temp_dir.path().join("upstreams"))?;
        std::fs::create_dir(temp_dir.path().join("work"))?;
        Ok(Self {
            temp_dir,
            env: git_environment(),
        })
    }

    /// Directory holding the configuration file and working copies
    pub fn work_dir(&self) -> PathBuf {
        self.temp_dir.path().join("work")
    }

    pub fn config_path(&self) -> PathBuf {
        self.work_dir().join("repofleet.yaml")
    }

    /// Creates an upstream repository on `main` with one commit
    pub fn upstream(&self, name: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join("upstreams").join(name);
        std::fs::create_dir(&path)?;
        setup_git_repo(&path)?;
        create_test_commit(&path, "README.md", &format!("# {name}\n"), "Initial commit")?;
        Ok(path)
    }

    /// Writes the configuration file and loads it
    pub fn load(&self, yaml: &str) -> Result<TaskSet> {
        std::fs::write(self.config_path(), yaml)?;
        Ok(TaskSet::load(&self.config_path())?)
    }

    /// Loads `yaml` and returns its only task
    pub fn single_task(&self, yaml: &str) -> Result<Task> {
        let mut set = self.load(yaml)?;
        anyhow::ensure!(set.tasks.len() == 1, "expected exactly one task");
        Ok(set.tasks.remove(0))
    }

    /// Runs one task with the real process runner
    pub async fn sync(&self, task: &Task) -> Outcome {
        SyncEngine::new(&ProcessRunner, &self.env).run(task).await
    }
}

/// YAML for one git task with optional extra keys
pub fn git_task_yaml(source: &Path, path: &str, extra: &[(&str, &str)]) -> String {
    let mut yaml = format!("tasks:\n  - git: {}\n    path: {path}\n", source.display());
    for (key, value) in extra {
        yaml.push_str(&format!("    {key}: {value}\n"));
    }
    yaml
}
