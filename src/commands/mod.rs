//! Command handlers invoked by the binary

pub mod sync;

pub use sync::{
    audit_untracked, handle_sync_command, load_task_sets, run_task_set, run_task_sets, SyncOptions,
};
