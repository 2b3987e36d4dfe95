//! Sampling policy for high-volume event classes.
//!
//! Mouse moves are throttled: a sample is retained only when the throttle
//! window has elapsed since the last retained sample; intermediate samples
//! are dropped, never queued. Scrolls are debounced: each observation
//! replaces the pending one, and only the position still pending after a
//! debounce-window gap of scroll inactivity is retained.
//!
//! There is no timer behind the debounce. The pending sample is flushed
//! cooperatively — the collector polls on every event entry point and at the
//! top of every delivery cycle. Retained scroll timestamps are therefore the
//! flush time, matching the moment of retention.

/// Throttle gate for mouse-move sampling.
#[derive(Debug, Clone)]
pub struct MouseThrottle {
    throttle_ms: u64,
    last_retained_ms: Option<u64>,
}

impl MouseThrottle {
    pub fn new(throttle_ms: u64) -> Self {
        Self {
            throttle_ms,
            last_retained_ms: None,
        }
    }

    /// Returns true when the sample observed at `now_ms` should be retained.
    /// The first sample always passes.
    pub fn admit(&mut self, now_ms: u64) -> bool {
        let pass = match self.last_retained_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.throttle_ms,
        };
        if pass {
            self.last_retained_ms = Some(now_ms);
        }
        pass
    }
}

/// A scroll observation waiting out its debounce window.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingScroll {
    pub observed_ms: u64,
    pub scroll_y: i64,
    pub path: String,
}

/// Debounce gate for scroll sampling.
#[derive(Debug, Clone)]
pub struct ScrollDebounce {
    debounce_ms: u64,
    pending: Option<PendingScroll>,
}

impl ScrollDebounce {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            pending: None,
        }
    }

    /// Observe a scroll position. Replaces any pending sample and restarts
    /// the debounce window.
    pub fn observe(&mut self, now_ms: u64, scroll_y: i64, path: String) {
        self.pending = Some(PendingScroll {
            observed_ms: now_ms,
            scroll_y,
            path,
        });
    }

    /// Take the pending sample if the debounce window has elapsed without a
    /// newer observation.
    pub fn poll(&mut self, now_ms: u64) -> Option<PendingScroll> {
        let elapsed = self
            .pending
            .as_ref()
            .is_some_and(|p| now_ms.saturating_sub(p.observed_ms) >= self.debounce_ms);
        if elapsed { self.pending.take() } else { None }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
