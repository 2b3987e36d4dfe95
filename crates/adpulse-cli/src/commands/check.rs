use std::time::Duration;

use adpulse_core::{Clock, HttpTransport, SystemClock, Transport};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub fn run(config_path: Option<&str>, probe: bool) {
    let config = match super::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!("Collector configuration");
    println!("  Endpoint:       {}", config.endpoint_url);
    println!(
        "  Intervals:      {}ms active / {}ms idle",
        config.base_interval_ms, config.idle_interval_ms
    );
    println!(
        "  Retention:      {}ms, {} events/batch",
        config.max_event_age_ms, config.max_events_per_batch
    );
    println!(
        "  Delivery:       {} retries, {}ms apart{}",
        config.max_retries,
        config.retry_delay_ms,
        if config.gzip_body { ", gzip" } else { "" }
    );
    println!(
        "  Payload:        {}",
        if config.tiered_payload { "tiered" } else { "full" }
    );
    println!(
        "  Tracking:       clicks={} mouse={} scroll={}",
        config.track_clicks, config.track_mouse, config.track_scroll
    );
    println!("  Excluded paths: {}", config.excluded_paths.join(", "));
    println!();

    match config.validate() {
        Ok(()) => println!("Configuration is valid."),
        Err(e) => {
            eprintln!("Configuration is invalid: {e}");
            std::process::exit(1);
        }
    }

    if !probe {
        return;
    }

    println!();
    println!("Probing {} ...", config.endpoint_url);
    let transport = match HttpTransport::new(PROBE_TIMEOUT) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Cannot build HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let body = serde_json::json!({
        "probe": true,
        "timestamp": SystemClock.now_ms(),
    });
    let bytes = body.to_string().into_bytes();

    match transport.send(&config.endpoint_url, &bytes, false) {
        Ok(()) => println!("Endpoint accepted a {}-byte test payload.", bytes.len()),
        Err(e) => {
            eprintln!("Probe failed: {e}");
            std::process::exit(1);
        }
    }
}
