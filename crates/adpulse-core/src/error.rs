//! Collector error taxonomy.
//!
//! Only configuration problems are fatal, and only at construction time.
//! Transport and storage failures are recovered inside the delivery pipeline
//! (retry, then persist locally); signal-acquisition failures degrade to
//! missing fields. Nothing stops the collection loop once it is running.

/// Configuration problems. The collector refuses to construct on any of
/// these rather than run with undefined behavior.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("endpoint_url is required")]
    MissingEndpoint,

    #[error("endpoint_url is not an absolute http(s) URL: {0}")]
    InvalidEndpoint(String),

    #[error("base_interval must be at least 1s (got {0}ms)")]
    IntervalTooShort(u64),

    #[error("idle_interval ({idle_ms}ms) must not be shorter than base_interval ({base_ms}ms)")]
    IdleShorterThanBase { idle_ms: u64, base_ms: u64 },

    #[error("max_retries must be at least 1")]
    NoRetries,

    #[error("max_storage_bytes must be greater than zero")]
    ZeroStorageCap,
}

/// Transport failures. Any non-success — network error or HTTP error
/// status — is treated uniformly as retryable.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("network error: {0}")]
    Network(String),
}

/// Durable-store failures. Always best-effort: logged by the pipeline,
/// never fatal.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("snapshot of {size} bytes exceeds storage cap of {cap} bytes")]
    QuotaExceeded { size: usize, cap: usize },

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Aggregate error for callers that drive the pipeline directly.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = ConfigError::IdleShorterThanBase {
            idle_ms: 500,
            base_ms: 30_000,
        };
        assert!(e.to_string().contains("500ms"));
        assert!(e.to_string().contains("30000ms"));

        let e = TransportError::Http { status: 503 };
        assert_eq!(e.to_string(), "HTTP status 503");

        let e = StorageError::QuotaExceeded {
            size: 10,
            cap: 5,
        };
        assert!(e.to_string().contains("10 bytes"));
    }

    #[test]
    fn test_aggregate_from_conversions() {
        let e: CollectorError = ConfigError::NoRetries.into();
        assert!(matches!(e, CollectorError::Config(_)));
        let e: CollectorError = TransportError::Network("refused".into()).into();
        assert!(matches!(e, CollectorError::Transport(_)));
    }
}
