//! Preprocessing progress.

/// Told how many features the input holds and when each one has been
/// enriched or skipped.
pub trait ProgressCallback: Send + Sync {
    /// Number of features in the input collection.
    fn set_total(&self, total: u64);

    /// `delta` more features handled.
    fn inc(&self, delta: u64);

    /// Every feature handled; `msg` summarizes the kept county count.
    fn finish(&self, msg: String);
}

/// Progress sink for library callers and tests.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn finish(&self, _msg: String) {}
}
