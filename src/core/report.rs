//! Outcome display policy and summary rendering

use std::path::PathBuf;

use super::config::{
    INTERRUPTED_MESSAGE, SUMMARY_FAILED, SUMMARY_NOTHING_TO_DO, SUMMARY_SUCCESS, UNTRACKED_HINT,
};
use super::stats::Verdict;
use crate::sync::Outcome;

/// Errors and changes are always shown; quiet successes only when verbose
pub fn should_display(outcome: &Outcome, verbose: bool) -> bool {
    verbose || outcome.error || outcome.changed
}

/// Outcome log prefixed with its status symbol
pub fn render_outcome(outcome: &Outcome) -> String {
    let symbol = outcome.status().symbol();
    match outcome.lines.split_first() {
        Some((first, rest)) if !first.starts_with(' ') => {
            let mut block = vec![format!("{symbol} {first}")];
            block.extend(rest.iter().cloned());
            block.join("\n")
        }
        _ => {
            let mut block = vec![format!("{symbol} {}", outcome.path.display())];
            block.extend(outcome.lines.iter().cloned());
            block.join("\n")
        }
    }
}

/// Final summary for one run
pub fn summary_lines(verdict: &Verdict, interrupted: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if interrupted {
        lines.push(format!("⚠️  {INTERRUPTED_MESSAGE}"));
    }
    match verdict {
        Verdict::Failed(paths) if !paths.is_empty() => {
            lines.push("🔴 Failed:".to_string());
            lines.extend(paths.iter().map(|path| format!("  - {}", path.display())));
        }
        Verdict::Failed(_) => lines.push(format!("🔴 {SUMMARY_FAILED}")),
        Verdict::NothingToDo => lines.push(format!("🟢 {SUMMARY_NOTHING_TO_DO}")),
        Verdict::Success => lines.push(format!("✅ {SUMMARY_SUCCESS}")),
    }
    lines
}

/// Listing of untracked paths with the remediation hint
pub fn untracked_lines(paths: &[PathBuf]) -> Vec<String> {
    let mut lines = vec!["🔴 Untracked paths found:".to_string()];
    lines.extend(paths.iter().map(|path| format!("  - {}", path.display())));
    lines.push(UNTRACKED_HINT.to_string());
    lines
}
