//! Derived ad-engagement metrics.
//!
//! Metrics are never mutated incrementally. [`AdMetrics::derive`] fully
//! recomputes them from the current conversion log on every read, so the
//! output is always a pure function of the log contents and cannot drift.

use serde::{Deserialize, Serialize};

use crate::events::{ConversionEvent, ConversionKind};

/// Aggregated ad-engagement metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdMetrics {
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub total_hover_time_ms: u64,
    /// Percentage. Defined as 0 when there are no impressions.
    pub click_through_rate: f64,
    /// Defined as 0 when there are no hovers.
    pub average_hover_time_ms: f64,
}

impl AdMetrics {
    /// Recompute everything from the conversion log.
    pub fn derive(conversions: &[ConversionEvent]) -> Self {
        let mut impressions = 0u64;
        let mut clicks = 0u64;
        let mut hovers = 0u64;
        let mut hover_time_ms = 0u64;

        for c in conversions {
            match c.kind {
                ConversionKind::Impression => impressions += 1,
                ConversionKind::Click => clicks += 1,
                ConversionKind::Hover => {
                    hovers += 1;
                    hover_time_ms += c.duration_ms.unwrap_or(0);
                }
            }
        }

        let click_through_rate = if impressions > 0 {
            clicks as f64 / impressions as f64 * 100.0
        } else {
            0.0
        };
        let average_hover_time_ms = if hovers > 0 {
            hover_time_ms as f64 / hovers as f64
        } else {
            0.0
        };

        Self {
            total_impressions: impressions,
            total_clicks: clicks,
            total_hover_time_ms: hover_time_ms,
            click_through_rate,
            average_hover_time_ms,
        }
    }
}
