//! Session activity classification.
//!
//! Tracks only the last-interaction timestamp. The tracker is deliberately
//! decoupled from recording policy — recorders touch it, the scheduler reads
//! it, and nothing else.

/// Last-interaction tracker.
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    last_activity_ms: u64,
    threshold_ms: u64,
}

impl ActivityTracker {
    /// A fresh tracker counts construction time as the first interaction.
    pub fn new(now_ms: u64, threshold_ms: u64) -> Self {
        Self {
            last_activity_ms: now_ms,
            threshold_ms,
        }
    }

    /// Record an interaction of any kind.
    pub fn touch(&mut self, now_ms: u64) {
        self.last_activity_ms = now_ms;
    }

    /// True iff an interaction happened within the threshold window.
    pub fn is_active(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_activity_ms) < self.threshold_ms
    }

    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms
    }
}
