//! Recorded event types.
//!
//! Interaction events (clicks, mouse moves, scrolls) are raw observations;
//! conversion events are ad-engagement signals and feed the metrics
//! aggregator. All timestamps are Unix epoch milliseconds captured at the
//! moment of retention, not at dispatch.

use serde::{Deserialize, Serialize};

/// Anything carrying a retention timestamp. Lets the retention manager prune
/// every log with one generic pass.
pub trait Timestamped {
    fn timestamp_ms(&self) -> u64;
}

/// A retained click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub timestamp_ms: u64,
    pub x: i32,
    pub y: i32,
    /// Tag name of the clicked element, as reported by the embedding.
    pub target: String,
    pub path: String,
}

/// A retained (throttled) mouse-move sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseMoveEvent {
    pub timestamp_ms: u64,
    pub x: i32,
    pub y: i32,
    pub path: String,
}

/// A retained (debounced) scroll position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollEvent {
    pub timestamp_ms: u64,
    pub scroll_y: i64,
    pub path: String,
}

/// Ad-engagement signal class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionKind {
    Impression,
    Click,
    Hover,
}

impl std::fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Impression => write!(f, "impression"),
            Self::Click => write!(f, "click"),
            Self::Hover => write!(f, "hover"),
        }
    }
}

/// A recorded ad-engagement event. `duration_ms` is only meaningful for
/// hovers and may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionEvent {
    #[serde(rename = "type")]
    pub kind: ConversionKind,
    pub timestamp_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl Timestamped for ClickEvent {
    fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }
}

impl Timestamped for MouseMoveEvent {
    fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }
}

impl Timestamped for ScrollEvent {
    fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }
}

impl Timestamped for ConversionEvent {
    fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_kind_serde_is_lowercase() {
        let json = serde_json::to_string(&ConversionKind::Impression).unwrap();
        assert_eq!(json, "\"impression\"");
        let parsed: ConversionKind = serde_json::from_str("\"hover\"").unwrap();
        assert_eq!(parsed, ConversionKind::Hover);
    }

    #[test]
    fn test_conversion_event_serde_roundtrip() {
        let ev = ConversionEvent {
            kind: ConversionKind::Hover,
            timestamp_ms: 42,
            duration_ms: Some(1_500),
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("\"type\":\"hover\""));
        let back: ConversionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }

    #[test]
    fn test_missing_duration_not_serialized() {
        let ev = ConversionEvent {
            kind: ConversionKind::Click,
            timestamp_ms: 1,
            duration_ms: None,
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(!json.contains("duration_ms"));
    }
}
