//! Progress bar rendering for streamed progress events.

use std::collections::HashMap;
use std::sync::Mutex;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// A container holding one bar per streamed progress label.
pub struct ProgressContainer {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl ProgressContainer {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    /// Update the bar for `label`, creating it on first sight. Once every
    /// bar is complete the container resets for the next batch of labels.
    pub fn update(&self, label: &str, current: i32, total: i32) {
        let mut bars = self.bars.lock().expect("progress container mutex poisoned");
        let bar = bars.entry(label.to_string()).or_insert_with(|| {
            let bar = self.multi.add(ProgressBar::new(total.max(0) as u64));
            bar.set_style(ProgressStyle::with_template("{msg} {pos}/{len} [{elapsed}] {bar:40.green} {percent}%").unwrap());
            bar.set_message(label.to_string());
            bar
        });
        bar.set_position(current.max(0) as u64);

        if bars.values().all(|bar| bar.position() >= bar.length().unwrap_or(0)) {
            for bar in bars.values() {
                bar.finish();
            }
            bars.clear();
        }
    }

    /// Abort all running bars, leaving them visible in their failed state.
    pub fn abort(&self) {
        let mut bars = self.bars.lock().expect("progress container mutex poisoned");
        for bar in bars.values() {
            bar.abandon();
        }
        bars.clear();
    }
}
