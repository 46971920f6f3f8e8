//! Progress tracking and callbacks for unwarping runs.
//!
//! Work is counted in (volume, slice) units. Workers report completed units
//! concurrently, so the tracker counts with an atomic and callbacks must be
//! `Send + Sync`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Progress information for a run.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Units completed so far.
    pub completed: usize,
    /// Total number of units.
    pub total: usize,
    /// Time elapsed since start.
    pub elapsed: Duration,
    /// Estimated remaining time.
    pub estimated_remaining: Option<Duration>,
}

impl ProgressInfo {
    /// Create new progress information.
    pub fn new(completed: usize, total: usize, elapsed: Duration) -> Self {
        Self {
            completed,
            total,
            elapsed,
            estimated_remaining: None,
        }
    }

    /// Calculate progress percentage.
    pub fn progress_percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }

    /// Calculate estimated remaining time.
    pub fn calculate_remaining(&mut self) {
        if self.completed > 0 {
            let per_unit = self.elapsed.as_secs_f64() / self.completed as f64;
            let remaining = self.total.saturating_sub(self.completed);
            self.estimated_remaining = Some(Duration::from_secs_f64(per_unit * remaining as f64));
        }
    }
}

/// Progress callback trait for monitoring a run.
pub trait ProgressCallback: Send + Sync {
    /// Called after each completed unit.
    fn on_progress(&self, info: &ProgressInfo);

    /// Called once before any unit runs.
    fn on_start(&self, _total: usize) {}

    /// Called when every unit has completed.
    fn on_complete(&self, _info: &ProgressInfo) {}

    /// Called when the run is aborted.
    fn on_error(&self, _error: &str) {}
}

/// Callback that logs progress through `tracing` at fixed percentage steps.
#[derive(Debug, Clone)]
pub struct LogProgress {
    /// Number of log lines over the full run.
    pub steps: usize,
}

impl Default for LogProgress {
    fn default() -> Self {
        Self { steps: 10 }
    }
}

impl LogProgress {
    pub fn new(steps: usize) -> Self {
        Self { steps: steps.max(1) }
    }
}

impl ProgressCallback for LogProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let interval = (info.total / self.steps.max(1)).max(1);
        if info.completed % interval == 0 || info.completed == info.total {
            let remaining = info
                .estimated_remaining
                .map(|d| format!("{:.1}s", d.as_secs_f64()))
                .unwrap_or_else(|| "N/A".to_string());
            tracing::info!(
                "Unwarped {}/{} slices ({:.0}%) | Elapsed: {:.1}s | ETA: {}",
                info.completed,
                info.total,
                info.progress_percent(),
                info.elapsed.as_secs_f64(),
                remaining
            );
        }
    }

    fn on_start(&self, total: usize) {
        tracing::info!(total, "Unwarping started");
    }

    fn on_complete(&self, info: &ProgressInfo) {
        tracing::info!("Unwarping completed in {:.2}s", info.elapsed.as_secs_f64());
    }

    fn on_error(&self, error: &str) {
        tracing::error!("Unwarping failed: {}", error);
    }
}

/// History callback that records every progress update.
#[derive(Debug, Clone, Default)]
pub struct HistoryCallback {
    history: Arc<Mutex<Vec<ProgressInfo>>>,
}

impl HistoryCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the recorded history.
    pub fn get_history(&self) -> Vec<ProgressInfo> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Clear the history.
    pub fn clear(&self) {
        if let Ok(mut history) = self.history.lock() {
            history.clear();
        }
    }
}

impl ProgressCallback for HistoryCallback {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Ok(mut history) = self.history.lock() {
            history.push(info.clone());
        }
    }
}

/// Progress tracker that fans updates out to registered callbacks.
#[derive(Default)]
pub struct ProgressTracker {
    callbacks: Vec<Arc<dyn ProgressCallback>>,
    start_time: Mutex<Option<Instant>>,
    completed: AtomicUsize,
    total: AtomicUsize,
}

impl ProgressTracker {
    /// Create a tracker without callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callback.
    pub fn add_callback(&mut self, callback: Arc<dyn ProgressCallback>) {
        self.callbacks.push(callback);
    }

    /// Builder form of [`add_callback`](Self::add_callback).
    pub fn with_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.add_callback(callback);
        self
    }

    /// Reset counters and notify callbacks of a run of `total` units.
    pub fn start(&self, total: usize) {
        if let Ok(mut start) = self.start_time.lock() {
            *start = Some(Instant::now());
        }
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
        for callback in &self.callbacks {
            callback.on_start(total);
        }
    }

    /// Record one completed unit.
    pub fn advance(&self) {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        let mut info = self.info(completed);
        info.calculate_remaining();
        for callback in &self.callbacks {
            callback.on_progress(&info);
        }
    }

    /// Units completed since the last [`start`](Self::start).
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Notify callbacks that the run finished.
    pub fn complete(&self) {
        let info = self.info(self.completed());
        for callback in &self.callbacks {
            callback.on_complete(&info);
        }
    }

    /// Report error.
    pub fn error(&self, error: &str) {
        for callback in &self.callbacks {
            callback.on_error(error);
        }
    }

    fn info(&self, completed: usize) -> ProgressInfo {
        let elapsed = self
            .start_time
            .lock()
            .ok()
            .and_then(|start| start.map(|t| t.elapsed()))
            .unwrap_or(Duration::ZERO);
        ProgressInfo::new(completed, self.total.load(Ordering::Relaxed), elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_info() {
        let info = ProgressInfo::new(10, 40, Duration::from_secs(10));
        assert_eq!(info.completed, 10);
        assert_eq!(info.progress_percent(), 25.0);
    }

    #[test]
    fn test_progress_info_remaining() {
        let mut info = ProgressInfo::new(10, 40, Duration::from_secs(10));
        info.calculate_remaining();
        assert_eq!(info.estimated_remaining, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_history_callback() {
        let callback = HistoryCallback::new();
        callback.on_progress(&ProgressInfo::new(1, 10, Duration::ZERO));
        callback.on_progress(&ProgressInfo::new(2, 10, Duration::ZERO));

        let history = callback.get_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].completed, 2);
        callback.clear();
        assert!(callback.get_history().is_empty());
    }

    #[test]
    fn test_progress_tracker() {
        let history = Arc::new(HistoryCallback::new());
        let tracker = ProgressTracker::new()
            .with_callback(history.clone())
            .with_callback(Arc::new(LogProgress::default()));
        tracker.start(3);
        tracker.advance();
        tracker.advance();
        tracker.advance();
        tracker.complete();

        assert_eq!(tracker.completed(), 3);
        let counts: Vec<usize> = history.get_history().iter().map(|i| i.completed).collect();
        assert_eq!(counts, vec![1, 2, 3]);
        assert!(history.get_history().iter().all(|i| i.total == 3));
    }
}
