//! Per-target synchronization
//!
//! The [`SyncEngine`] decides what a working copy needs and drives git
//! through a [`crate::git::CommandRunner`]; the resulting [`Outcome`] is the
//! only thing a pipeline hands back.

pub mod engine;
pub mod hooks;
pub mod outcome;

pub use engine::{SyncEngine, SyncError};
pub use hooks::{hook_invocation, run_hooks};
pub use outcome::{Outcome, INDENT};
