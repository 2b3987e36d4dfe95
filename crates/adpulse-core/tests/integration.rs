//! Integration tests for adpulse-core.
//!
//! These tests drive the full collection pipeline end to end:
//! event recording → sampling policy → retention → metrics → tiered payload
//! → delivery with retries → local persistence and rehydration.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use adpulse_core::{
    Collector, CollectorConfig, ConversionKind, DeviceSignals, IpResolver, ManualClock,
    MemoryStore, SnapshotStore, StorageError, Transport, TransportError,
};

// ---------------------------------------------------------------------------
// Test collaborators
// ---------------------------------------------------------------------------

/// Transport that records bodies and fails the first `fail_first` attempts.
struct ScriptedTransport {
    sent: Rc<RefCell<Vec<serde_json::Value>>>,
    attempts: Rc<Cell<u32>>,
    fail_first: u32,
}

impl Transport for ScriptedTransport {
    fn send(&self, _url: &str, body: &[u8], _gzipped: bool) -> Result<(), TransportError> {
        let n = self.attempts.get() + 1;
        self.attempts.set(n);
        if n <= self.fail_first {
            return Err(TransportError::Network("unreachable".to_string()));
        }
        self.sent
            .borrow_mut()
            .push(serde_json::from_slice(body).expect("payload is JSON"));
        Ok(())
    }
}

struct FixedIp;

impl IpResolver for FixedIp {
    fn resolve(&self) -> Result<String, TransportError> {
        Ok("198.51.100.23".to_string())
    }
}

/// Device signals with a switchable current path.
struct PageSignals {
    path: Rc<RefCell<String>>,
}

impl DeviceSignals for PageSignals {
    fn current_path(&self) -> String {
        self.path.borrow().clone()
    }
    fn screen_properties(&self) -> String {
        "1920x1080x24".to_string()
    }
    fn timezone_offset_minutes(&self) -> i32 {
        -120
    }
    fn plugin_list(&self) -> Vec<String> {
        vec!["pdf-viewer".to_string()]
    }
    fn render_entropy(&self) -> Vec<u8> {
        vec![0xAB; 16]
    }
    fn user_agent(&self) -> String {
        "integration-agent/1.0".to_string()
    }
}

struct SharedStore(Rc<MemoryStore>);

impl SnapshotStore for SharedStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.0.get(key)
    }
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.0.put(key, bytes)
    }
}

struct World {
    collector: Collector,
    clock: ManualClock,
    path: Rc<RefCell<String>>,
    sent: Rc<RefCell<Vec<serde_json::Value>>>,
    attempts: Rc<Cell<u32>>,
    store: Rc<MemoryStore>,
}

fn config() -> CollectorConfig {
    CollectorConfig {
        endpoint_url: "https://ingest.example.com/api/traffic".to_string(),
        retry_delay_ms: 0,
        ..Default::default()
    }
}

fn world(config: CollectorConfig, fail_first: u32, store: Rc<MemoryStore>) -> World {
    let clock = ManualClock::new(1_700_000_000_000);
    let path = Rc::new(RefCell::new("/shop".to_string()));
    let sent = Rc::new(RefCell::new(Vec::new()));
    let attempts = Rc::new(Cell::new(0));
    let collector = Collector::new(
        config,
        Box::new(ScriptedTransport {
            sent: sent.clone(),
            attempts: attempts.clone(),
            fail_first,
        }),
        Box::new(SharedStore(store.clone())),
        Box::new(FixedIp),
        Box::new(PageSignals { path: path.clone() }),
        Box::new(clock.clone()),
    )
    .expect("valid config");
    World {
        collector,
        clock,
        path,
        sent,
        attempts,
        store,
    }
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[test]
fn full_session_produces_expected_payload() {
    let mut w = world(config(), 0, Rc::new(MemoryStore::new()));

    // A browsing burst: clicks, a mouse trail, a scroll that settles.
    w.collector.record_click(100, 200, "BUTTON");
    for _ in 0..50 {
        w.clock.advance(20);
        w.collector.record_mouse_move(5, 5);
    }
    w.collector.record_scroll(640);
    w.clock.advance(300);
    w.collector.record_conversion(ConversionKind::Impression, None);
    w.collector.record_conversion(ConversionKind::Click, None);
    w.collector.record_conversion(ConversionKind::Hover, Some(1_000));

    w.collector.run_cycle();

    let sent = w.sent.borrow();
    assert_eq!(sent.len(), 1);
    let obj = sent[0].as_object().unwrap();

    // Essential tier.
    assert_eq!(obj["ip"], "198.51.100.0"); // anonymized
    assert_eq!(obj["user_agent"], "integration-agent/1.0");
    assert_eq!(obj["clicks"].as_array().unwrap().len(), 1);
    assert!(obj["device_fingerprint"].as_str().unwrap().len() == 64);

    // Non-essential tier, merged flat.
    assert_eq!(obj["scroll_events"].as_array().unwrap().len(), 1);
    assert_eq!(obj["scroll_events"][0]["scroll_y"], 640);
    let metrics = obj["ad_metrics"].as_object().unwrap();
    assert_eq!(metrics["total_impressions"], 1);
    assert_eq!(metrics["total_clicks"], 1);
    assert_eq!(metrics["click_through_rate"], 100.0);
    assert_eq!(metrics["average_hover_time_ms"], 1000.0);

    // Interactions: one click + one retained scroll.
    assert_eq!(obj["session_data"]["interactions"], 2);

    // Mouse trail throttled at 100ms: 50 moves over 1s keep ~11 samples,
    // fewer than the raw series either way.
    let mice = obj["mouse_movements"].as_array().unwrap();
    assert!(!mice.is_empty());
    assert!(mice.len() < 50);
}

#[test]
fn navigation_to_excluded_path_stops_recording() {
    let mut w = world(config(), 0, Rc::new(MemoryStore::new()));
    w.collector.record_click(1, 1, "A");
    *w.path.borrow_mut() = "/privacy".to_string();
    w.clock.advance(1_000);
    w.collector.record_click(2, 2, "A");
    w.collector.record_mouse_move(3, 3);
    assert_eq!(w.collector.state().clicks.len(), 1);
    assert!(w.collector.state().mouse_movements.is_empty());
}

#[test]
fn outage_then_reload_loses_no_counters() {
    let store = Rc::new(MemoryStore::new());

    // First page life: ingestion is down the whole time.
    let mut w = world(config(), u32::MAX, store.clone());
    w.collector.record_click(1, 1, "A");
    w.clock.advance(200);
    w.collector.record_click(2, 2, "A");
    w.collector.record_conversion(ConversionKind::Impression, None);
    w.collector.run_cycle();
    assert_eq!(w.attempts.get(), 3, "exactly max_retries attempts");
    assert_eq!(w.store.len(), 1);
    let interactions = w.collector.state().session_data.interactions;

    // Page reload: new collector over the same store, ingestion is back.
    let mut w2 = world(config(), 0, store);
    assert_eq!(
        w2.collector.state().session_data.interactions,
        interactions
    );
    assert_eq!(w2.collector.state().clicks.len(), 2);

    w2.collector.run_cycle();
    let sent = w2.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["clicks"].as_array().unwrap().len(), 2);
    assert_eq!(sent[0]["session_data"]["interactions"], interactions);
}

#[test]
fn battery_saving_toggle_switches_tiers_between_cycles() {
    let mut w = world(config(), 0, Rc::new(MemoryStore::new()));
    w.collector.record_conversion(ConversionKind::Impression, None);

    w.collector.run_cycle();
    w.collector.set_battery_saving(true);
    w.collector.run_cycle();

    let sent = w.sent.borrow();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].as_object().unwrap().contains_key("ad_metrics"));
    assert!(!sent[1].as_object().unwrap().contains_key("ad_metrics"));
    // Essential fields survive the collapse.
    assert!(sent[1].as_object().unwrap().contains_key("session_data"));
}

#[test]
fn stale_events_never_reach_the_wire() {
    let mut w = world(config(), 0, Rc::new(MemoryStore::new()));
    w.collector.record_click(1, 1, "A");
    // Just over the 24h retention window.
    w.clock.advance(24 * 60 * 60 * 1000 + 1);
    w.collector.record_click(2, 2, "A");
    w.collector.run_cycle();

    let sent = w.sent.borrow();
    let clicks = sent[0]["clicks"].as_array().unwrap();
    assert_eq!(clicks.len(), 1, "aged-out click pruned before payload");
}

#[test]
fn session_duration_is_derived_at_build_time() {
    let mut w = world(config(), 0, Rc::new(MemoryStore::new()));
    w.clock.advance(90_000);
    w.collector.run_cycle();
    let sent = w.sent.borrow();
    assert_eq!(sent[0]["session_data"]["duration_secs"], 90.0);
}
