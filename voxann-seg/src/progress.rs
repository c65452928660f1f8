//! Progress reporting for long-running slice loops

/// Receives one increment per slice segmented or embedded. A UI layer
/// can back this with a progress bar; the engine does not care.
pub trait ProgressSink {
    fn advance(&mut self, amount: usize);
}

/// Sink that discards all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advance(&mut self, _amount: usize) {}
}

/// Sink that counts updates.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    pub count: usize,
}

impl ProgressSink for ProgressCounter {
    fn advance(&mut self, amount: usize) {
        self.count += amount;
    }
}
