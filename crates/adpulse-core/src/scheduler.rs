//! Adaptive collection cadence.
//!
//! Two logical states, two fixed intervals. The run loop re-evaluates the
//! cadence from the activity tracker around every tick, so the interval used
//! to arm the next timer always reflects the current state, and exactly one
//! timer is pending at a time (the loop arms the next sleep only after the
//! previous one fired). Overlap protection is the collector's in-flight
//! flag, not the timer.

use std::time::Duration;

use crate::config::CollectorConfig;

/// Collection cadence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cadence {
    #[default]
    Active,
    Idle,
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Idle => write!(f, "idle"),
        }
    }
}

/// Cadence state machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scheduler {
    cadence: Cadence,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-evaluate the cadence from the current activity classification.
    /// Returns the new cadence.
    pub fn observe(&mut self, active: bool) -> Cadence {
        self.cadence = if active { Cadence::Active } else { Cadence::Idle };
        self.cadence
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Interval to arm for the next tick under the current cadence.
    pub fn interval(&self, config: &CollectorConfig) -> Duration {
        let ms = match self.cadence {
            Cadence::Active => config.base_interval_ms,
            Cadence::Idle => config.idle_interval_ms,
        };
        Duration::from_millis(ms)
    }
}
