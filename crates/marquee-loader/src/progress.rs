//! Operator-facing progress spinners, one per load stage.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::sequencer::Stage;

const TEMPLATE: &str =
  "{spinner:.green} {prefix:>15.bold} {human_pos:>12} records  {per_sec:>14}  {elapsed}";

/// Progress display settings. Purely cosmetic; never affects the load.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
  visible: bool,
}

impl Progress {
  pub fn new(visible: bool) -> Self { Self { visible } }

  pub fn hidden() -> Self { Self::new(false) }

  /// An unbounded spinner counting records for `stage`.
  pub fn stage(&self, stage: Stage) -> ProgressBar {
    if !self.visible {
      return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
      ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_prefix(stage.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
  }
}
