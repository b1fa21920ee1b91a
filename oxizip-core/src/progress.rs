//! Progress accounting for zip and unzip operations.
//!
//! The total is fixed before the main loop starts. Each processed entry
//! advances the completed count and the ratio is handed to an optional
//! callback. Finishing always reports exactly `1.0`.

/// Boxed progress callback receiving a value in `0.0..=1.0`.
pub type ProgressFn<'a> = Box<dyn FnMut(f64) + 'a>;

/// Tracks completed bytes against a fixed total.
pub struct ProgressTracker<'a, 'cb> {
    total: u64,
    completed: u64,
    callback: Option<&'a mut (dyn FnMut(f64) + 'cb)>,
}

impl<'a, 'cb> ProgressTracker<'a, 'cb> {
    /// Create a tracker for `total` bytes.
    pub fn new(total: u64, callback: Option<&'a mut (dyn FnMut(f64) + 'cb)>) -> Self {
        Self {
            total,
            completed: 0,
            callback,
        }
    }

    /// Total bytes expected.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Bytes completed so far.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Add completed bytes. Saturates at `u64::MAX`.
    pub fn advance(&mut self, bytes: u64) {
        self.completed = self.completed.saturating_add(bytes);
    }

    /// Current completion ratio, capped at `1.0`.
    ///
    /// An empty total counts as complete.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.completed as f64 / self.total as f64).min(1.0)
    }

    /// Report the current ratio.
    pub fn report(&mut self) {
        let fraction = self.fraction();
        if let Some(callback) = self.callback.as_mut() {
            callback(fraction);
        }
    }

    /// Report the current ratio unless it is already complete, leaving the
    /// single `1.0` notification to [`ProgressTracker::finish`].
    pub fn report_unless_complete(&mut self) {
        if self.fraction() < 1.0 {
            self.report();
        }
    }

    /// Mark the operation complete and report `1.0`.
    pub fn finish(&mut self) {
        self.completed = self.completed.max(self.total);
        if let Some(callback) = self.callback.as_mut() {
            callback(1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_fraction() {
        let mut tracker = ProgressTracker::new(200, None);
        assert_eq!(tracker.fraction(), 0.0);
        tracker.advance(50);
        assert_eq!(tracker.fraction(), 0.25);
        tracker.advance(500);
        assert_eq!(tracker.fraction(), 1.0);
    }

    #[test]
    fn test_empty_total_is_complete() {
        let tracker = ProgressTracker::new(0, None);
        assert_eq!(tracker.fraction(), 1.0);
    }

    #[test]
    fn test_reports_and_finish() {
        let seen = RefCell::new(Vec::new());
        let mut callback: ProgressFn<'_> = Box::new(|p| seen.borrow_mut().push(p));
        {
            let mut tracker = ProgressTracker::new(4, Some(callback.as_mut()));
            tracker.advance(1);
            tracker.report_unless_complete();
            tracker.advance(3);
            tracker.report_unless_complete();
            tracker.finish();
            assert_eq!(tracker.completed(), 4);
        }
        drop(callback);
        assert_eq!(seen.into_inner(), vec![0.25, 1.0]);
    }
}
