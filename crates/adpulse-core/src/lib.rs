//! # adpulse-core
//!
//! Embeddable client-side telemetry collector: it observes user interaction
//! events (clicks, mouse movement, scrolling), derives session and
//! ad-engagement metrics, and ships batches to a remote ingestion endpoint
//! under adaptive scheduling and resource constraints.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use adpulse_core::{
//!     Collector, CollectorConfig, FileStore, HttpIpResolver, HttpTransport,
//!     NullSignals, SystemClock,
//! };
//!
//! let config = CollectorConfig {
//!     endpoint_url: "https://ingest.example.com/api/traffic".to_string(),
//!     ..Default::default()
//! };
//! let mut collector = Collector::new(
//!     config,
//!     Box::new(HttpTransport::new(Duration::from_secs(10)).unwrap()),
//!     Box::new(FileStore::new(".adpulse")),
//!     Box::new(HttpIpResolver::new(
//!         HttpIpResolver::DEFAULT_URL,
//!         Duration::from_secs(5),
//!     ).unwrap()),
//!     Box::new(NullSignals::new("/", "my-embedding/1.0")),
//!     Box::new(SystemClock),
//! ).unwrap();
//!
//! // The embedding dispatches interaction events into the collector:
//! collector.record_click(120, 380, "BUTTON");
//! collector.record_scroll(1024);
//!
//! // ...and drives delivery, either per tick or via the blocking loop.
//! collector.run_cycle();
//! ```
//!
//! ## Architecture
//!
//! Recorders → state → (per tick) retention → metrics → payload → delivery
//!
//! - **Recorders** apply sampling policy at the edge: click path exclusion,
//!   mouse-move throttling, scroll debouncing.
//! - The **scheduler** picks the collection cadence from recent activity:
//!   a short interval while the session is active, a long one while idle.
//! - The **payload builder** emits a tiered snapshot (essential /
//!   non-essential) and collapses it to the essential tier under battery
//!   saving.
//! - The **delivery pipeline** retries with a fixed delay and, once
//!   exhausted, persists the full state to a local store so a later page
//!   load can merge it back in. Delivery is at-least-once, never exactly-
//!   once.
//!
//! All collaborators — transport, snapshot store, IP resolver, device
//! signals, clock — are injected traits, so the whole pipeline runs
//! deterministically under test.

pub mod activity;
pub mod clock;
pub mod collector;
pub mod config;
pub mod error;
pub mod events;
pub mod fingerprint;
pub mod metrics;
pub mod payload;
pub mod recorder;
pub mod retention;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod transport;

pub use activity::ActivityTracker;
pub use clock::{Clock, ManualClock, SystemClock};
pub use collector::Collector;
pub use config::CollectorConfig;
pub use error::{CollectorError, ConfigError, StorageError, TransportError};
pub use events::{
    ClickEvent, ConversionEvent, ConversionKind, MouseMoveEvent, ScrollEvent, Timestamped,
};
pub use fingerprint::{fingerprint, DeviceSignals, NullSignals};
pub use metrics::AdMetrics;
pub use payload::{
    build_full, build_tiered, downsample_mouse, EssentialPayload, FullPayload,
    NonEssentialPayload, TieredPayload,
};
pub use recorder::{MouseThrottle, PendingScroll, ScrollDebounce};
pub use retention::prune_older_than;
pub use scheduler::{Cadence, Scheduler};
pub use state::{merge_stored, CollectorState, SessionData};
pub use storage::{FileStore, MemoryStore, SnapshotStore};
pub use transport::{
    anonymize_ip, gzip, HttpIpResolver, HttpTransport, IpResolver, Transport,
};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
