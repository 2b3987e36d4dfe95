//! Collector configuration.
//!
//! The configuration is captured once at collector construction and treated
//! as an immutable snapshot from then on. The single runtime-mutable knob is
//! battery saving, changed through [`crate::Collector::set_battery_saving`]
//! rather than by ambient mutation of this struct.
//!
//! All durations are Unix-style millisecond counts so a config file is plain
//! JSON integers.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Immutable collector configuration snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Ingestion endpoint. Required; must be an absolute http(s) URL.
    pub endpoint_url: String,

    /// Collection interval while the session is active.
    pub base_interval_ms: u64,
    /// Collection interval while the session is idle. Must be >= base.
    pub idle_interval_ms: u64,
    /// A session is active iff an interaction occurred this recently.
    pub active_threshold_ms: u64,

    /// Minimum gap between two retained mouse-move samples.
    pub mouse_throttle_ms: u64,
    /// Scroll inactivity gap after which the pending position is retained.
    pub scroll_debounce_ms: u64,

    /// Entries older than this are pruned from every event log.
    pub max_event_age_ms: u64,
    /// Per-log ceiling on events placed in a single payload.
    pub max_events_per_batch: usize,
    /// Rolling window of clicks included in the essential tier.
    pub essential_click_window_ms: u64,
    /// Most-recent scroll events included in the non-essential tier.
    pub scroll_tail: usize,

    pub track_clicks: bool,
    pub track_mouse: bool,
    pub track_scroll: bool,
    /// Compute a device fingerprint at construction.
    pub collect_device_info: bool,
    /// Zero the trailing octet of the resolved client IP.
    pub anonymize_ip: bool,
    /// Send the tiered (essential/non-essential) payload instead of the
    /// full state snapshot.
    pub tiered_payload: bool,
    /// Gzip the serialized payload body before handing it to the transport.
    pub gzip_body: bool,
    /// Emit the essential tier only. Runtime-mutable via the collector.
    pub battery_saving: bool,

    /// Paths on which recorders are no-ops (prefix match).
    pub excluded_paths: Vec<String>,

    /// Delivery attempts per cycle (first try included).
    pub max_retries: u32,
    /// Fixed delay between delivery attempts. Not exponential.
    pub retry_delay_ms: u64,

    /// Key under which unsent state snapshots are persisted.
    pub storage_key: String,
    /// Snapshots larger than this are dropped instead of written.
    pub max_storage_bytes: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            base_interval_ms: 30_000,
            idle_interval_ms: 120_000,
            active_threshold_ms: 5_000,
            mouse_throttle_ms: 100,
            scroll_debounce_ms: 250,
            max_event_age_ms: 24 * 60 * 60 * 1000,
            max_events_per_batch: 100,
            essential_click_window_ms: 60 * 60 * 1000,
            scroll_tail: 10,
            track_clicks: true,
            track_mouse: true,
            track_scroll: true,
            collect_device_info: true,
            anonymize_ip: true,
            tiered_payload: true,
            gzip_body: false,
            battery_saving: false,
            excluded_paths: vec!["/privacy".to_string(), "/terms".to_string()],
            max_retries: 3,
            retry_delay_ms: 1_000,
            storage_key: "adpulse_state".to_string(),
            max_storage_bytes: 5 * 1024 * 1024,
        }
    }
}

impl CollectorConfig {
    /// Validate the snapshot. Fatal at startup: the collector refuses to
    /// construct on any violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint_url.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        let parsed = reqwest::Url::parse(&self.endpoint_url)
            .map_err(|_| ConfigError::InvalidEndpoint(self.endpoint_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
            return Err(ConfigError::InvalidEndpoint(self.endpoint_url.clone()));
        }
        if self.base_interval_ms < 1_000 {
            return Err(ConfigError::IntervalTooShort(self.base_interval_ms));
        }
        if self.idle_interval_ms < self.base_interval_ms {
            return Err(ConfigError::IdleShorterThanBase {
                idle_ms: self.idle_interval_ms,
                base_ms: self.base_interval_ms,
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::NoRetries);
        }
        if self.max_storage_bytes == 0 {
            return Err(ConfigError::ZeroStorageCap);
        }
        Ok(())
    }

    /// True when `path` starts with any excluded prefix.
    pub fn is_excluded_path(&self, path: &str) -> bool {
        self.excluded_paths.iter().any(|p| path.starts_with(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CollectorConfig {
        CollectorConfig {
            endpoint_url: "https://ingest.example.com/api/traffic".to_string(),
            ..Default::default()
        }
    }

    // -----------------------------------------------------------------------
    // Validation tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_default_config_missing_endpoint() {
        let err = CollectorConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingEndpoint));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        for bad in ["not a url", "ftp://example.com/x", "/relative/path"] {
            let cfg = CollectorConfig {
                endpoint_url: bad.to_string(),
                ..Default::default()
            };
            assert!(
                matches!(cfg.validate().unwrap_err(), ConfigError::InvalidEndpoint(_)),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn test_interval_below_minimum_rejected() {
        let cfg = CollectorConfig {
            base_interval_ms: 999,
            ..valid()
        };
        assert!(matches!(
            cfg.validate().unwrap_err(),
            ConfigError::IntervalTooShort(999)
        ));
    }

    #[test]
    fn test_idle_shorter_than_base_rejected() {
        let cfg = CollectorConfig {
            base_interval_ms: 30_000,
            idle_interval_ms: 10_000,
            ..valid()
        };
        assert!(matches!(
            cfg.validate().unwrap_err(),
            ConfigError::IdleShorterThanBase { .. }
        ));
    }

    #[test]
    fn test_zero_retries_rejected() {
        let cfg = CollectorConfig {
            max_retries: 0,
            ..valid()
        };
        assert!(matches!(cfg.validate().unwrap_err(), ConfigError::NoRetries));
    }

    #[test]
    fn test_zero_storage_cap_rejected() {
        let cfg = CollectorConfig {
            max_storage_bytes: 0,
            ..valid()
        };
        assert!(matches!(
            cfg.validate().unwrap_err(),
            ConfigError::ZeroStorageCap
        ));
    }

    // -----------------------------------------------------------------------
    // Path exclusion tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_excluded_path_prefix_match() {
        let cfg = valid();
        assert!(cfg.is_excluded_path("/privacy"));
        assert!(cfg.is_excluded_path("/privacy/policy"));
        assert!(cfg.is_excluded_path("/terms-of-service"));
        assert!(!cfg.is_excluded_path("/shop"));
        assert!(!cfg.is_excluded_path("/my/privacy"));
    }

    // -----------------------------------------------------------------------
    // Serde tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: CollectorConfig = serde_json::from_str(
            r#"{"endpoint_url": "https://ingest.example.com/t", "max_retries": 5}"#,
        )
        .unwrap();
        assert_eq!(cfg.max_retries, 5);
        assert_eq!(cfg.base_interval_ms, 30_000);
        assert_eq!(cfg.scroll_tail, 10);
        assert!(cfg.validate().is_ok());
    }
}
