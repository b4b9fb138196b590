//! Progress bar shown while a run is in flight

use anyhow::Result;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

use super::config::{PATH_DISPLAY_WIDTH, PROGRESS_TEMPLATE, PROGRESS_TICK_MILLIS};
use super::report::{render_outcome, should_display};
use crate::sync::Outcome;
use crate::utils::shorten_path;

/// Counts finished targets and prints outcome blocks above the bar
pub struct RunProgress {
    bar: ProgressBar,
    verbose: bool,
}

impl RunProgress {
    /// Creates the bar; it stays hidden when stdout is not a terminal
    pub fn new(total: usize, verbose: bool) -> Result<Self> {
        let bar = ProgressBar::new(total as u64);
        if std::io::stdout().is_terminal() {
            bar.set_draw_target(ProgressDrawTarget::stdout());
            bar.set_style(create_progress_style()?);
            bar.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MILLIS));
        } else {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        Ok(Self { bar, verbose })
    }

    /// Counts one finished target and prints it when the display policy allows
    pub fn report(&self, outcome: &Outcome) {
        self.bar.inc(1);
        self.bar.set_message(shorten_path(
            &outcome.path.display().to_string(),
            PATH_DISPLAY_WIDTH,
        ));
        if should_display(outcome, self.verbose) {
            self.println(&format!("{}\n", render_outcome(outcome)));
        }
    }

    /// Prints above the bar, or straight to stdout when the bar is hidden
    pub fn println(&self, text: &str) {
        if self.bar.is_hidden() {
            println!("{text}");
        } else {
            self.bar.println(text);
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn create_progress_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_spinner().template(PROGRESS_TEMPLATE)?)
}
