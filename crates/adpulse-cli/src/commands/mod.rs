pub mod check;
pub mod simulate;

use adpulse_core::CollectorConfig;

/// Load a configuration from a JSON file, falling back to defaults when no
/// path is given. Missing fields take their default values.
pub fn load_config(path: Option<&str>) -> Result<CollectorConfig, String> {
    match path {
        Some(p) => {
            let raw = std::fs::read_to_string(p).map_err(|e| format!("cannot read {p}: {e}"))?;
            serde_json::from_str(&raw).map_err(|e| format!("cannot parse {p}: {e}"))
        }
        None => Ok(CollectorConfig::default()),
    }
}
