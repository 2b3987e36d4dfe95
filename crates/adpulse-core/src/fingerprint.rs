//! Device fingerprinting.
//!
//! The collector never inspects device signals itself; it consumes a
//! [`DeviceSignals`] capability and digests whatever the embedding provides
//! into one opaque string. SHA-256 is the single gateway for identity
//! material — raw screen properties and plugin lists never appear on the
//! wire.
//!
//! The fingerprint is computed once at collector construction and is
//! immutable thereafter (or absent when device collection is disabled).

use sha2::{Digest, Sha256};

/// Best-effort device signal provider, implemented by the embedding.
pub trait DeviceSignals {
    /// Current page path (e.g. `"/shop/item"`).
    fn current_path(&self) -> String;

    /// Screen geometry/color-depth string (e.g. `"1920x1080x24"`).
    fn screen_properties(&self) -> String;

    /// Timezone offset from UTC in minutes.
    fn timezone_offset_minutes(&self) -> i32;

    /// Installed plugin names.
    fn plugin_list(&self) -> Vec<String>;

    /// Rendering-based entropy bytes (canvas draw output or equivalent).
    /// May be empty when no renderer is available.
    fn render_entropy(&self) -> Vec<u8>;

    /// Browser/runtime identification string.
    fn user_agent(&self) -> String;
}

/// Combine all signals into an opaque, stable fingerprint string.
pub fn fingerprint(signals: &dyn DeviceSignals) -> String {
    let mut h = Sha256::new();
    h.update(signals.screen_properties().as_bytes());
    h.update(signals.timezone_offset_minutes().to_le_bytes());
    h.update(signals.plugin_list().join(",").as_bytes());
    h.update(signals.render_entropy());
    let digest = h.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Signal provider for headless embeddings: stable, featureless values.
#[derive(Debug, Default, Clone)]
pub struct NullSignals {
    pub path: String,
    pub user_agent: String,
}

impl NullSignals {
    pub fn new(path: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            user_agent: user_agent.into(),
        }
    }
}

impl DeviceSignals for NullSignals {
    fn current_path(&self) -> String {
        self.path.clone()
    }

    fn screen_properties(&self) -> String {
        "0x0x0".to_string()
    }

    fn timezone_offset_minutes(&self) -> i32 {
        0
    }

    fn plugin_list(&self) -> Vec<String> {
        Vec::new()
    }

    fn render_entropy(&self) -> Vec<u8> {
        Vec::new()
    }

    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }
}
