//! Download progress using indicatif

#![allow(clippy::expect_used)] // Templates are compile-time constants

use std::cell::RefCell;

use indicatif::{ProgressBar, ProgressStyle};

use crate::application::ports::ProgressSink;

const BAR_TEMPLATE: &str = "  {msg}\n    {bar:40.cyan/dim} {percent}%  {bytes}/{total_bytes}";
const SPINNER_TEMPLATE: &str = "  {msg}  {spinner:.cyan} {bytes}";

/// Create a progress bar for a transfer of known length.
///
/// # Panics
///
/// Panics if the progress bar template string is invalid (it is a compile-time constant and will not panic).
#[must_use]
pub fn bar(len: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .expect("valid template")
            .progress_chars("━━─"),
    );
    pb.set_message(msg.to_string());
    pb
}

/// Create a byte counter for a transfer of unknown length.
///
/// # Panics
///
/// Panics if the spinner template string is invalid (it is a compile-time constant and will not panic).
#[must_use]
pub fn counter(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template(SPINNER_TEMPLATE)
            .expect("valid template"),
    );
    pb.set_message(msg.to_string());
    pb
}

/// `ProgressSink` drawing an indicatif bar for each transfer.
pub struct BarProgress {
    label: String,
    bar: RefCell<Option<ProgressBar>>,
}

impl BarProgress {
    /// Progress sink whose bar is titled `label`.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            bar: RefCell::new(None),
        }
    }
}

impl ProgressSink for BarProgress {
    fn start(&self, total: Option<u64>) {
        let pb = match total {
            Some(len) => bar(len, &self.label),
            None => counter(&self.label),
        };
        if let Some(previous) = self.bar.replace(Some(pb)) {
            previous.finish_and_clear();
        }
    }

    fn advance(&self, bytes: u64) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            pb.inc(bytes);
        }
    }

    fn finish(&self) {
        if let Some(pb) = self.bar.borrow_mut().take() {
            pb.finish();
        }
    }
}

/// `ProgressSink` that draws nothing (quiet, JSON, or non-TTY output).
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn start(&self, _: Option<u64>) {}
    fn advance(&self, _: u64) {}
    fn finish(&self) {}
}
