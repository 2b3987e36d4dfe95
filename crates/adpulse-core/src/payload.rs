//! Tiered payload construction.
//!
//! The builder is a pure function of current state, configuration, and the
//! battery-saving flag. The essential tier carries identity and session
//! fields plus recent clicks; the non-essential tier carries down-sampled
//! mouse movement, the scroll tail, the conversion log, and freshly derived
//! metrics. Under battery saving only the essential tier is emitted; the two
//! tiers are otherwise flattened into one merged JSON object.

use serde::Serialize;
use uuid::Uuid;

use crate::config::CollectorConfig;
use crate::events::{ClickEvent, ConversionEvent, MouseMoveEvent, ScrollEvent};
use crate::metrics::AdMetrics;
use crate::state::{CollectorState, SessionData};

/// High-priority payload fields: identity, session summary, recent clicks.
#[derive(Debug, Clone, Serialize)]
pub struct EssentialPayload {
    pub collector_id: Uuid,
    pub ip: String,
    pub user_agent: String,
    pub device_fingerprint: Option<String>,
    pub start_time_ms: u64,
    pub session_data: SessionData,
    pub clicks: Vec<ClickEvent>,
}

/// Lower-priority analysis fields.
#[derive(Debug, Clone, Serialize)]
pub struct NonEssentialPayload {
    pub mouse_movements: Vec<MouseMoveEvent>,
    pub scroll_events: Vec<ScrollEvent>,
    pub conversions: Vec<ConversionEvent>,
    pub ad_metrics: AdMetrics,
}

/// The tiered payload. Serializes as one flat object: essential keys, and —
/// unless battery saving collapsed it — the non-essential keys merged in.
#[derive(Debug, Clone, Serialize)]
pub struct TieredPayload {
    #[serde(flatten)]
    pub essential: EssentialPayload,
    #[serde(flatten)]
    pub non_essential: Option<NonEssentialPayload>,
}

/// The untiered payload: the full state snapshot with the session duration
/// and metrics recomputed at build time.
#[derive(Debug, Clone, Serialize)]
pub struct FullPayload {
    pub collector_id: Uuid,
    pub ip: String,
    pub user_agent: String,
    pub device_fingerprint: Option<String>,
    pub start_time_ms: u64,
    pub session_data: SessionData,
    pub clicks: Vec<ClickEvent>,
    pub mouse_movements: Vec<MouseMoveEvent>,
    pub scroll_events: Vec<ScrollEvent>,
    pub conversions: Vec<ConversionEvent>,
    pub ad_metrics: AdMetrics,
}

/// Uniform stride reduction of the mouse-move series. Series under 10 points
/// pass through; otherwise every Nth point is kept, N = len / 10.
pub fn downsample_mouse(series: &[MouseMoveEvent]) -> Vec<MouseMoveEvent> {
    if series.len() < 10 {
        return series.to_vec();
    }
    let stride = (series.len() / 10).max(1);
    series.iter().step_by(stride).cloned().collect()
}

/// Keep the most recent `cap` entries of a log.
fn tail<T: Clone>(log: &[T], cap: usize) -> Vec<T> {
    log[log.len().saturating_sub(cap)..].to_vec()
}

/// Build the tiered payload. `battery_saving` collapses it to the essential
/// tier only.
pub fn build_tiered(
    state: &CollectorState,
    config: &CollectorConfig,
    now_ms: u64,
    metrics: AdMetrics,
    battery_saving: bool,
) -> TieredPayload {
    let window_start = now_ms.saturating_sub(config.essential_click_window_ms);
    let recent_clicks: Vec<ClickEvent> = state
        .clicks
        .iter()
        .filter(|c| c.timestamp_ms > window_start)
        .cloned()
        .collect();

    let essential = EssentialPayload {
        collector_id: state.collector_id,
        ip: state.ip.clone(),
        user_agent: state.user_agent.clone(),
        device_fingerprint: state.device_fingerprint.clone(),
        start_time_ms: state.start_time_ms,
        session_data: state.session_snapshot(now_ms),
        clicks: tail(&recent_clicks, config.max_events_per_batch),
    };

    let non_essential = (!battery_saving).then(|| NonEssentialPayload {
        mouse_movements: tail(
            &downsample_mouse(&state.mouse_movements),
            config.max_events_per_batch,
        ),
        scroll_events: tail(
            &state.scroll_events,
            config.scroll_tail.min(config.max_events_per_batch),
        ),
        conversions: tail(&state.conversions, config.max_events_per_batch),
        ad_metrics: metrics,
    });

    TieredPayload {
        essential,
        non_essential,
    }
}

/// Build the full snapshot payload with per-log batch ceilings applied.
pub fn build_full(
    state: &CollectorState,
    config: &CollectorConfig,
    now_ms: u64,
    metrics: AdMetrics,
) -> FullPayload {
    let cap = config.max_events_per_batch;
    FullPayload {
        collector_id: state.collector_id,
        ip: state.ip.clone(),
        user_agent: state.user_agent.clone(),
        device_fingerprint: state.device_fingerprint.clone(),
        start_time_ms: state.start_time_ms,
        session_data: state.session_snapshot(now_ms),
        clicks: tail(&state.clicks, cap),
        mouse_movements: tail(&state.mouse_movements, cap),
        scroll_events: tail(&state.scroll_events, cap),
        conversions: tail(&state.conversions, cap),
        ad_metrics: metrics,
    }
}
