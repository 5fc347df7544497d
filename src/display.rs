//! Terminal progress for long-running commands.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::deploy::ProgressEvent;

/// Progress bar driven by deployment [`ProgressEvent`]s.
///
/// Starts as a spinner and switches to a bar once the tool reports a step
/// counter. Raw output lines are printed above the bar.
pub struct DeployProgress {
    bar: ProgressBar,
    show_output: bool,
}

impl DeployProgress {
    pub fn new(message: &str, show_output: bool) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("Valid progress template")
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar, show_output }
    }

    pub fn update(&self, event: &ProgressEvent) {
        if let (Some(current), Some(total)) = (event.current_step, event.total_steps) {
            if self.bar.length() != Some(u64::from(total)) {
                self.bar.set_length(u64::from(total));
                self.bar.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                        .expect("Valid progress template")
                        .progress_chars("##-"),
                );
            }
            self.bar.set_position(u64::from(current));
        }

        if self.show_output {
            for line in &event.output_lines {
                self.bar.println(line);
            }
        }
    }

    pub fn success(self, message: &str) {
        self.bar.finish_with_message(format!("✓ {}", message));
    }

    pub fn error(self, message: &str) {
        self.bar.abandon_with_message(format!("✗ {}", message));
    }
}

/// Spinner for operations with no step counter
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.yellow} {msg} [{elapsed}]")
                .expect("Valid progress template"),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    pub fn success(self, message: &str) {
        self.bar.finish_with_message(format!("✓ {}", message));
    }

    pub fn error(self, message: &str) {
        self.bar.abandon_with_message(format!("✗ {}", message));
    }
}
