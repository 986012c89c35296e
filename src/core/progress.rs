use crate::domain::model::Progress;
use crate::domain::ports::ProgressSink;

/// Reports progress through the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, progress: &Progress) {
        tracing::info!(
            "⏳ [{}/{} {:>3.0}%] Processing... {}",
            progress.done,
            progress.total,
            progress.fraction() * 100.0,
            progress.name
        );
    }
}

/// Discards progress updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn report(&self, _progress: &Progress) {}
}
