//! The collector: event entry points, delivery pipeline, run loop.
//!
//! One `Collector` is explicitly constructed per page context with injected
//! collaborators (transport, snapshot store, IP resolver, device signals,
//! clock). The embedding dispatches interaction events into it; the run loop
//! wakes on an adaptive cadence and drives one delivery cycle per tick:
//!
//! ```text
//! prune by age → resolve IP (once) → derive metrics → build payload
//!   → send (fixed-delay retries) → on success clear delivered logs
//!                                → on exhaustion persist snapshot locally
//! ```
//!
//! No error from a cycle ever stops the loop; transport and storage failures
//! are logged and recovered, and only configuration problems are fatal — at
//! construction, never later.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::activity::ActivityTracker;
use crate::clock::Clock;
use crate::config::CollectorConfig;
use crate::error::ConfigError;
use crate::events::{ClickEvent, ConversionEvent, ConversionKind, MouseMoveEvent, ScrollEvent};
use crate::fingerprint::{fingerprint, DeviceSignals};
use crate::metrics::AdMetrics;
use crate::payload::{build_full, build_tiered};
use crate::recorder::{MouseThrottle, ScrollDebounce};
use crate::scheduler::{Cadence, Scheduler};
use crate::state::{merge_stored, CollectorState};
use crate::storage::SnapshotStore;
use crate::transport::{anonymize_ip, gzip, IpResolver, Transport};

/// Granularity of the run loop's interruptible sleep.
const SLEEP_SLICE: Duration = Duration::from_millis(200);

/// Client-side telemetry collector.
pub struct Collector {
    config: CollectorConfig,
    state: CollectorState,
    activity: ActivityTracker,
    scheduler: Scheduler,
    mouse_throttle: MouseThrottle,
    scroll_debounce: ScrollDebounce,
    battery_saving: bool,
    in_flight: bool,
    transport: Box<dyn Transport>,
    store: Box<dyn SnapshotStore>,
    resolver: Box<dyn IpResolver>,
    signals: Box<dyn DeviceSignals>,
    clock: Box<dyn Clock>,
}

impl Collector {
    /// Construct a collector. Validates the configuration (fatal on
    /// violation), computes the device fingerprint once, and seeds state
    /// from any snapshot a previous page load left behind.
    pub fn new(
        config: CollectorConfig,
        transport: Box<dyn Transport>,
        store: Box<dyn SnapshotStore>,
        resolver: Box<dyn IpResolver>,
        signals: Box<dyn DeviceSignals>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let now = clock.now_ms();
        let mut state = CollectorState::new(now, signals.user_agent());
        if config.collect_device_info {
            state.device_fingerprint = Some(fingerprint(signals.as_ref()));
        }

        // Merge back anything a failed delivery persisted. Best-effort: a
        // missing, unreadable, or corrupt snapshot just means a fresh start.
        match store.get(&config.storage_key) {
            Ok(Some(bytes)) => match serde_json::from_slice::<CollectorState>(&bytes) {
                Ok(stored) => {
                    info!(
                        "restored snapshot: {} clicks, {} conversions, {} interactions",
                        stored.clicks.len(),
                        stored.conversions.len(),
                        stored.session_data.interactions
                    );
                    state = merge_stored(state, stored);
                }
                Err(e) => warn!("ignoring corrupt stored snapshot: {e}"),
            },
            Ok(None) => {}
            Err(e) => warn!("could not read stored snapshot: {e}"),
        }

        Ok(Self {
            activity: ActivityTracker::new(now, config.active_threshold_ms),
            mouse_throttle: MouseThrottle::new(config.mouse_throttle_ms),
            scroll_debounce: ScrollDebounce::new(config.scroll_debounce_ms),
            battery_saving: config.battery_saving,
            in_flight: false,
            config,
            state,
            scheduler: Scheduler::new(),
            transport,
            store,
            resolver,
            signals,
            clock,
        })
    }

    // -----------------------------------------------------------------------
    // Event entry points
    // -----------------------------------------------------------------------

    /// Record a click at the current path. Excluded paths and disabled
    /// tracking are no-ops.
    pub fn record_click(&mut self, x: i32, y: i32, target: &str) {
        let now = self.clock.now_ms();
        self.activity.touch(now);
        self.flush_pending_scroll(now);

        if !self.config.track_clicks {
            return;
        }
        let path = self.signals.current_path();
        if self.config.is_excluded_path(&path) {
            return;
        }

        self.state.clicks.push(ClickEvent {
            timestamp_ms: now,
            x,
            y,
            target: target.to_string(),
            path,
        });
        self.state.session_data.interactions += 1;
        debug!("click recorded ({} total)", self.state.clicks.len());
    }

    /// Record a mouse movement. Throttled: samples inside the throttle
    /// window are dropped, not queued.
    pub fn record_mouse_move(&mut self, x: i32, y: i32) {
        let now = self.clock.now_ms();
        self.activity.touch(now);
        self.flush_pending_scroll(now);

        if !self.config.track_mouse {
            return;
        }
        let path = self.signals.current_path();
        if self.config.is_excluded_path(&path) {
            return;
        }
        if !self.mouse_throttle.admit(now) {
            return;
        }

        self.state.mouse_movements.push(MouseMoveEvent {
            timestamp_ms: now,
            x,
            y,
            path,
        });
    }

    /// Record a scroll position. Debounced: only the position still pending
    /// after a gap of scroll inactivity is retained, and that retention
    /// increments the interaction counter.
    pub fn record_scroll(&mut self, scroll_y: i64) {
        let now = self.clock.now_ms();
        self.activity.touch(now);
        self.flush_pending_scroll(now);

        if !self.config.track_scroll {
            return;
        }
        let path = self.signals.current_path();
        self.scroll_debounce.observe(now, scroll_y, path);
    }

    /// Record an ad-engagement signal, e.g. an impression or a hover with
    /// its dwell time.
    pub fn record_conversion(&mut self, kind: ConversionKind, duration_ms: Option<u64>) {
        let now = self.clock.now_ms();
        self.flush_pending_scroll(now);
        self.state.conversions.push(ConversionEvent {
            kind,
            timestamp_ms: now,
            duration_ms,
        });
        self.state.session_data.conversions += 1;
    }

    /// Record a non-recorded interaction (keydown, touchstart) purely for
    /// activity classification.
    pub fn record_activity(&mut self) {
        let now = self.clock.now_ms();
        self.activity.touch(now);
        self.flush_pending_scroll(now);
    }

    /// Retain the pending scroll sample once its debounce window elapsed.
    /// Timestamped at flush — the moment of retention.
    fn flush_pending_scroll(&mut self, now_ms: u64) {
        if let Some(pending) = self.scroll_debounce.poll(now_ms) {
            if self.config.is_excluded_path(&pending.path) {
                return;
            }
            self.state.scroll_events.push(ScrollEvent {
                timestamp_ms: now_ms,
                scroll_y: pending.scroll_y,
                path: pending.path,
            });
            self.state.session_data.interactions += 1;
        }
    }

    // -----------------------------------------------------------------------
    // Delivery cycle
    // -----------------------------------------------------------------------

    /// Run one delivery cycle. Skips (with a diagnostic) if a previous cycle
    /// is still in flight, so ticks never overlap sends.
    pub fn run_cycle(&mut self) {
        if self.in_flight {
            debug!("delivery cycle already in flight; skipping tick");
            return;
        }
        self.in_flight = true;
        let now = self.clock.now_ms();
        self.cycle(now);
        self.in_flight = false;
    }

    fn cycle(&mut self, now_ms: u64) {
        self.flush_pending_scroll(now_ms);
        self.state.prune(now_ms, self.config.max_event_age_ms);
        self.resolve_ip_once();

        let metrics = AdMetrics::derive(&self.state.conversions);
        self.state.ad_metrics = metrics.clone();

        let body = if self.config.tiered_payload {
            serde_json::to_vec(&build_tiered(
                &self.state,
                &self.config,
                now_ms,
                metrics,
                self.battery_saving,
            ))
        } else {
            serde_json::to_vec(&build_full(&self.state, &self.config, now_ms, metrics))
        };
        let body = match body {
            Ok(b) => b,
            Err(e) => {
                // Best-effort: a payload that cannot serialize is dropped.
                error!("payload serialization failed: {e}");
                return;
            }
        };

        let (body, gzipped) = if self.config.gzip_body {
            match gzip(&body) {
                Ok(z) => (z, true),
                Err(e) => {
                    warn!("gzip failed, sending uncompressed: {e}");
                    (body, false)
                }
            }
        } else {
            (body, false)
        };

        if self.deliver(&body, gzipped) {
            self.state.clear_delivered();
            debug!("payload delivered ({} bytes)", body.len());
        } else {
            // Exhausted. Keep the data: persist the full state so the next
            // page load merges it back in.
            self.persist();
        }
    }

    /// Send with up to `max_retries` attempts and a fixed delay between
    /// them. Never attempts beyond the configured count.
    fn deliver(&self, body: &[u8], gzipped: bool) -> bool {
        let retries = self.config.max_retries;
        for attempt in 1..=retries {
            match self
                .transport
                .send(&self.config.endpoint_url, body, gzipped)
            {
                Ok(()) => return true,
                Err(e) => {
                    warn!("delivery attempt {attempt}/{retries} failed: {e}");
                    if attempt < retries && self.config.retry_delay_ms > 0 {
                        std::thread::sleep(Duration::from_millis(self.config.retry_delay_ms));
                    }
                }
            }
        }
        false
    }

    /// Resolve the public IP on the first cycle that needs it. Cached
    /// forever once populated; lookup failure degrades to an empty field
    /// and collection continues.
    fn resolve_ip_once(&mut self) {
        if !self.state.ip.is_empty() {
            return;
        }
        match self.resolver.resolve() {
            Ok(ip) => {
                self.state.ip = if self.config.anonymize_ip {
                    anonymize_ip(&ip)
                } else {
                    ip
                };
                debug!("client ip resolved");
            }
            Err(e) => debug!("ip lookup failed, continuing without: {e}"),
        }
    }

    /// Serialize the full state to the durable store. Oversized snapshots
    /// are dropped with a diagnostic, never partially written.
    pub fn persist(&self) {
        let bytes = match serde_json::to_vec(&self.state) {
            Ok(b) => b,
            Err(e) => {
                error!("state serialization failed, snapshot dropped: {e}");
                return;
            }
        };
        if bytes.len() > self.config.max_storage_bytes {
            warn!(
                "snapshot of {} bytes exceeds cap of {} bytes, dropped",
                bytes.len(),
                self.config.max_storage_bytes
            );
            return;
        }
        if let Err(e) = self.store.put(&self.config.storage_key, &bytes) {
            warn!("snapshot write failed: {e}");
        }
    }

    // -----------------------------------------------------------------------
    // Run loop
    // -----------------------------------------------------------------------

    /// Blocking collection loop. Re-evaluates the cadence around every tick,
    /// arms exactly one sleep at a time, and keeps going through failed
    /// cycles. Returns when `stop` is set.
    pub fn run(&mut self, stop: &AtomicBool) {
        while !stop.load(Ordering::Relaxed) {
            let interval = self.next_interval();
            if !sleep_interruptible(interval, stop) {
                break;
            }
            self.run_cycle();
        }
        info!("collection loop stopped");
    }

    /// Re-evaluate the cadence from current activity and return the interval
    /// to wait before the next tick. For embeddings that own their own timer
    /// instead of using [`Collector::run`].
    pub fn next_interval(&mut self) -> Duration {
        let now = self.clock.now_ms();
        let cadence = self.scheduler.observe(self.activity.is_active(now));
        let interval = self.scheduler.interval(&self.config);
        debug!("next collection in {interval:?} (session {cadence})");
        interval
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Enable or disable battery saving. Takes effect from the next payload
    /// build: while set, payloads collapse to the essential tier.
    pub fn set_battery_saving(&mut self, on: bool) {
        if self.battery_saving != on {
            info!("battery saving {}", if on { "enabled" } else { "disabled" });
        }
        self.battery_saving = on;
    }

    pub fn battery_saving(&self) -> bool {
        self.battery_saving
    }

    pub fn state(&self) -> &CollectorState {
        &self.state
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    pub fn cadence(&self) -> Cadence {
        self.scheduler.cadence()
    }

    pub fn is_active(&self) -> bool {
        self.activity.is_active(self.clock.now_ms())
    }

    #[cfg(test)]
    fn force_in_flight(&mut self, v: bool) {
        self.in_flight = v;
    }
}

/// Sleep in short slices so a stop request interrupts promptly. Returns
/// false when interrupted.
fn sleep_interruptible(total: Duration, stop: &AtomicBool) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let slice = remaining.min(SLEEP_SLICE);
        std::thread::sleep(slice);
        remaining -= slice;
    }
    !stop.load(Ordering::Relaxed)
}
