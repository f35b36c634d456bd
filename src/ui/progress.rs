use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;

use crate::core::ProgressTarget;
use crate::reporting::ProgressCallback;

/// Terminal progress bar fed by a report run
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(enabled: bool, target: ProgressTarget) -> Self {
        if !enabled {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::with_draw_target(
            Some(u64::from(target.total)),
            ProgressDrawTarget::stderr(),
        );
        let unit = target.unit.unwrap_or("%");
        if let Ok(style) = ProgressStyle::default_bar().template(&format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}{unit}"
        )) {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }

    /// Progress is drawn when stderr is a terminal and nothing silenced it
    pub fn should_display(quiet: bool, no_progress: bool) -> bool {
        !quiet && !no_progress && std::io::stderr().is_terminal()
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for ProgressReporter {
    fn report(&mut self, value: u32) {
        self.bar.set_position(u64::from(value));
    }
}
