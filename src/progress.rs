//! Progress reporting for acquisition runs.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

/// Counters reported to the progress observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Requests whose batch has fully settled
    pub processed: usize,
    pub total: usize,
    /// Segments resolved with a routed geometry
    pub real_count: usize,
    /// Segments resolved with a straight-line fallback
    pub fallback_count: usize,
}

impl ProgressSnapshot {
    /// Completion percentage (0-100). An empty run is 100% complete.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.processed as f64 / self.total as f64 * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.processed == self.total
    }
}

/// Progress callback type
pub type ProgressCallback = Arc<dyn Fn(ProgressSnapshot) + Send + Sync>;

/// Running counters for one acquisition run, forwarded to an optional observer.
pub struct ProgressTracker<'a> {
    snapshot: ProgressSnapshot,
    callback: Option<&'a ProgressCallback>,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(total: usize, callback: Option<&'a ProgressCallback>) -> Self {
        Self {
            snapshot: ProgressSnapshot { total, ..Default::default() },
            callback,
        }
    }

    pub fn record_real(&mut self) {
        self.snapshot.real_count += 1;
    }

    pub fn record_fallback(&mut self) {
        self.snapshot.fallback_count += 1;
    }

    /// Mark `count` more requests as processed, never past `total`.
    pub fn advance(&mut self, count: usize) {
        self.snapshot.processed = (self.snapshot.processed + count).min(self.snapshot.total);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshot
    }

    /// Send the current counters to the observer.
    pub fn report(&self) {
        let s = self.snapshot;
        debug!(
            "[Progress] {}/{} ({:.0}%) | real={} fallback={}",
            s.processed, s.total, s.percentage(), s.real_count, s.fallback_count
        );
        if let Some(cb) = self.callback {
            cb(s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_percentage() {
        let s = ProgressSnapshot { processed: 3, total: 12, real_count: 2, fallback_count: 1 };
        assert_eq!(s.percentage(), 25.0);
        assert!(!s.is_complete());
        assert_eq!(ProgressSnapshot::default().percentage(), 100.0);
        assert!(ProgressSnapshot::default().is_complete());
    }

    #[test]
    fn test_tracker_forwards_and_clamps() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Arc::new(move |s| sink.lock().unwrap().push(s));

        let mut tracker = ProgressTracker::new(4, Some(&callback));
        tracker.report();
        tracker.record_real();
        tracker.record_fallback();
        tracker.advance(3);
        tracker.report();
        tracker.advance(3);
        tracker.report();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], ProgressSnapshot { processed: 0, total: 4, real_count: 0, fallback_count: 0 });
        assert_eq!(seen[1].processed, 3);
        assert_eq!(seen[1].real_count, 1);
        assert_eq!(seen[1].fallback_count, 1);
        assert_eq!(seen[2].processed, 4);
    }

    #[test]
    fn test_tracker_without_callback() {
        let mut tracker = ProgressTracker::new(1, None);
        tracker.record_real();
        tracker.advance(1);
        tracker.report();
        assert!(tracker.snapshot().is_complete());
    }
}
