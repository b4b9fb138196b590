//! Before/after hook execution

use std::path::Path;

use super::outcome::Outcome;
use crate::git::{CommandError, CommandRunner, EnvMap, Invocation};

const HOOK_SHELL: &str = "sh";

/// Shell invocation for one hook command
pub fn hook_invocation(command: &str, cwd: &Path) -> Invocation {
    Invocation::new(HOOK_SHELL, ["-c", command]).current_dir(cwd)
}

/// Runs hooks in order inside `cwd`, stopping at the first failure
///
/// Each hook logs a `[RUN]` line followed by its stdout and stderr.
pub async fn run_hooks(
    runner: &dyn CommandRunner,
    env: &EnvMap,
    hooks: &[String],
    cwd: &Path,
    outcome: &mut Outcome,
) -> Result<(), CommandError> {
    for hook in hooks {
        outcome.push(format!("[RUN] {hook}"));
        let output = runner.run(&hook_invocation(hook, cwd), env).await?;
        outcome.push_block(&output.stdout);
        outcome.push_block(&output.stderr);
    }
    Ok(())
}
