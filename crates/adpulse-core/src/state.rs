//! Collector state.
//!
//! One [`CollectorState`] is exclusively owned by one collector instance per
//! page context. It is mutated only by that collector's event entry points
//! and delivery cycles, serialized as a JSON snapshot when delivery is
//! exhausted, and merged back in on the next construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::{ClickEvent, ConversionEvent, MouseMoveEvent, ScrollEvent};
use crate::metrics::AdMetrics;
use crate::retention::prune_older_than;

/// Session counters. `duration_secs` is derived from `start_time_ms` on
/// every read and is never trusted from a stored snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub duration_secs: f64,
    pub interactions: u64,
    pub conversions: u64,
}

/// Full in-memory collector state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorState {
    pub collector_id: Uuid,
    /// Resolved (and possibly anonymized) client IP. Empty until the first
    /// successful lookup; never re-resolved once populated.
    pub ip: String,
    pub user_agent: String,
    pub start_time_ms: u64,
    pub clicks: Vec<ClickEvent>,
    pub mouse_movements: Vec<MouseMoveEvent>,
    pub scroll_events: Vec<ScrollEvent>,
    pub session_data: SessionData,
    pub device_fingerprint: Option<String>,
    pub conversions: Vec<ConversionEvent>,
    pub ad_metrics: AdMetrics,
}

impl CollectorState {
    pub fn new(now_ms: u64, user_agent: String) -> Self {
        Self {
            collector_id: Uuid::new_v4(),
            ip: String::new(),
            user_agent,
            start_time_ms: now_ms,
            clicks: Vec::new(),
            mouse_movements: Vec::new(),
            scroll_events: Vec::new(),
            session_data: SessionData::default(),
            device_fingerprint: None,
            conversions: Vec::new(),
            ad_metrics: AdMetrics::default(),
        }
    }

    /// Session counters with the duration recomputed from `now`.
    pub fn session_snapshot(&self, now_ms: u64) -> SessionData {
        SessionData {
            duration_secs: now_ms.saturating_sub(self.start_time_ms) as f64 / 1000.0,
            ..self.session_data.clone()
        }
    }

    /// Prune every event log independently by age.
    pub fn prune(&mut self, now_ms: u64, max_age_ms: u64) {
        prune_older_than(&mut self.clicks, now_ms, max_age_ms);
        prune_older_than(&mut self.mouse_movements, now_ms, max_age_ms);
        prune_older_than(&mut self.scroll_events, now_ms, max_age_ms);
        prune_older_than(&mut self.conversions, now_ms, max_age_ms);
    }

    /// Clear exactly the logs that were delivered. Conversions and session
    /// counters survive sends so cumulative metrics keep accruing.
    pub fn clear_delivered(&mut self) {
        self.clicks.clear();
        self.mouse_movements.clear();
        self.scroll_events.clear();
    }
}

/// Reconcile a freshly constructed state with a stored snapshot.
///
/// Policy: every stored field overwrites its in-memory default, except
/// `user_agent` and `device_fingerprint`, which are re-derived from the
/// environment the collector is running in now — a restored snapshot must
/// not pin identity signals from a previous environment.
pub fn merge_stored(current: CollectorState, stored: CollectorState) -> CollectorState {
    CollectorState {
        user_agent: current.user_agent,
        device_fingerprint: current.device_fingerprint,
        ..stored
    }
}
