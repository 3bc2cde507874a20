//! Progress bar for the upload stage
//!
//! Counts uploaded files. The bar is only drawn once uploading begins, so
//! it never interleaves with the interactive prompts that precede it.

use std::sync::OnceLock;

use sd_core::{UploadItem, UploadProgress};

use super::OutputConfig;

const TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files {msg}";

/// Progress bar wrapper
///
/// In quiet, JSON or no-progress mode, progress is suppressed.
#[derive(Debug)]
pub struct ProgressBar {
    enabled: bool,
    bar: OnceLock<indicatif::ProgressBar>,
}

impl ProgressBar {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            enabled: !(config.quiet || config.json || config.no_progress),
            bar: OnceLock::new(),
        }
    }

    /// Check if progress bar is visible
    pub fn is_visible(&self) -> bool {
        self.enabled
    }

    /// Number of files counted so far
    pub fn position(&self) -> u64 {
        self.bar.get().map(|bar| bar.position()).unwrap_or(0)
    }

    fn create(total: usize) -> indicatif::ProgressBar {
        let bar = indicatif::ProgressBar::new(total as u64);
        if let Ok(style) = indicatif::ProgressStyle::default_bar().template(TEMPLATE) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar
    }
}

impl UploadProgress for ProgressBar {
    fn begin(&self, total: usize) {
        if self.enabled {
            let _ = self.bar.set(Self::create(total));
        }
    }

    fn uploaded(&self, item: &UploadItem) {
        if let Some(bar) = self.bar.get() {
            bar.set_message(item.key.clone());
            bar.inc(1);
        }
    }

    fn finish(&self) {
        if let Some(bar) = self.bar.get() {
            bar.finish_and_clear();
        }
    }
}
