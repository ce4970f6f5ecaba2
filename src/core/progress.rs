//! Progress spinner shown while a scan runs

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::config::{PROGRESS_TEMPLATE, PROGRESS_TICK_INTERVAL_MS, SCANNING_MESSAGE};
use crate::utils::{display_path, shorten_path};

const PROGRESS_MESSAGE_WIDTH: usize = 60;

/// Spinner on stderr counting repositories as they are summarized
pub struct ScanProgress {
    bar: ProgressBar,
}

impl ScanProgress {
    /// A spinner drawn on stderr
    pub fn visible() -> Result<Self> {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        bar.set_style(create_progress_style()?);
        bar.set_prefix(SCANNING_MESSAGE);
        bar.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_INTERVAL_MS));
        Ok(Self { bar })
    }

    /// A spinner that never draws
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Called when a repository starts being queried
    pub fn on_repository(&self, path: &Path) {
        self.bar.inc(1);
        self.bar.set_message(format!(
            "[{}] {}",
            self.bar.position(),
            shorten_path(&display_path(path), PROGRESS_MESSAGE_WIDTH)
        ));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Creates a progress bar style configuration
fn create_progress_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_spinner().template(PROGRESS_TEMPLATE)?)
}
