//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod git;
pub mod runners;

pub use self::fixtures::{git_task_yaml, Fleet};
pub use self::git::{
    configure_identity, create_test_commit, git, is_git_available, rev_parse, setup_git_repo,
};
pub use self::runners::{RecordingRunner, ScriptedRunner};
