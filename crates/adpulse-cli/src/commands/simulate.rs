use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use adpulse_core::{
    Collector, ConversionKind, FileStore, HttpIpResolver, HttpTransport, IpResolver, NullSignals,
    SystemClock, Transport, TransportError,
};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const SLEEP_SLICE: Duration = Duration::from_millis(200);

/// Transport that prints payload sizes instead of sending them.
struct DryRunTransport;

impl Transport for DryRunTransport {
    fn send(&self, url: &str, body: &[u8], gzipped: bool) -> Result<(), TransportError> {
        println!(
            "  -> would POST {} bytes to {url}{}",
            body.len(),
            if gzipped { " (gzip)" } else { "" }
        );
        Ok(())
    }
}

/// Resolver returning a documentation address, so dry runs stay offline.
struct FixedIpResolver;

impl IpResolver for FixedIpResolver {
    fn resolve(&self) -> Result<String, TransportError> {
        Ok("203.0.113.7".to_string())
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    config_path: Option<&str>,
    endpoint: Option<String>,
    cycles: u64,
    seed: Option<u64>,
    dry_run: bool,
    state_dir: &str,
    battery_saving: bool,
) {
    let mut config = match super::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(url) = endpoint {
        config.endpoint_url = url;
    }
    config.battery_saving = battery_saving;

    let transport: Box<dyn Transport> = if dry_run {
        Box::new(DryRunTransport)
    } else {
        match HttpTransport::new(HTTP_TIMEOUT) {
            Ok(t) => Box::new(t),
            Err(e) => {
                eprintln!("Cannot build HTTP client: {e}");
                std::process::exit(1);
            }
        }
    };
    let resolver: Box<dyn IpResolver> = if dry_run {
        Box::new(FixedIpResolver)
    } else {
        match HttpIpResolver::new(HttpIpResolver::DEFAULT_URL, HTTP_TIMEOUT) {
            Ok(r) => Box::new(r),
            Err(e) => {
                eprintln!("Cannot build IP resolver: {e}");
                std::process::exit(1);
            }
        }
    };

    let user_agent = format!("adpulse-simulate/{}", adpulse_core::VERSION);
    let mut collector = match Collector::new(
        config,
        transport,
        Box::new(FileStore::new(state_dir)),
        resolver,
        Box::new(NullSignals::new("/home", user_agent)),
        Box::new(SystemClock),
    ) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)) {
        eprintln!("Cannot install Ctrl+C handler: {e}");
        std::process::exit(1);
    }

    println!("Simulated collection session");
    println!("  Endpoint: {}", collector.config().endpoint_url);
    println!("  Seed:     {seed}");
    println!("  Mode:     {}", if dry_run { "dry run" } else { "live" });
    if cycles > 0 {
        println!("  Cycles:   {cycles}");
    } else {
        println!("  Cycles:   until Ctrl+C");
    }
    println!();

    let mut completed = 0u64;
    while running.load(Ordering::SeqCst) {
        burst(&mut collector, &mut rng);

        let interval = collector.next_interval();
        println!(
            "cycle {}: {} session ({} interactions so far), next in {:.0}s",
            completed + 1,
            collector.cadence(),
            collector.state().session_data.interactions,
            interval.as_secs_f64()
        );
        if !sleep_interruptible(interval, &running) {
            break;
        }

        collector.run_cycle();
        completed += 1;
        if cycles > 0 && completed >= cycles {
            break;
        }
    }

    // Mirror a page unload: keep whatever the last cycle did not deliver.
    collector.persist();

    info!("simulation stopped after {completed} cycle(s)");
    let state = collector.state();
    println!();
    println!("Session summary");
    println!("  Duration:     {:.1}s", state.session_data.duration_secs);
    println!("  Interactions: {}", state.session_data.interactions);
    println!("  Conversions:  {}", state.session_data.conversions);
    println!(
        "  CTR:          {:.1}%  (avg hover {:.0}ms)",
        state.ad_metrics.click_through_rate, state.ad_metrics.average_hover_time_ms
    );
}

/// Emit a burst of synthetic user interaction ahead of the next cycle.
fn burst(collector: &mut Collector, rng: &mut StdRng) {
    // Sessions go quiet roughly a quarter of the time, exercising the idle
    // cadence.
    if rng.random_bool(0.25) {
        return;
    }

    for _ in 0..rng.random_range(5..40) {
        collector.record_mouse_move(rng.random_range(0..1920), rng.random_range(0..1080));
    }
    for _ in 0..rng.random_range(0..3) {
        collector.record_click(
            rng.random_range(0..1920),
            rng.random_range(0..1080),
            if rng.random_bool(0.5) { "button" } else { "a" },
        );
    }
    if rng.random_bool(0.6) {
        collector.record_scroll(rng.random_range(0..4000));
    }

    collector.record_conversion(ConversionKind::Impression, None);
    if rng.random_bool(0.3) {
        collector.record_conversion(
            ConversionKind::Hover,
            Some(rng.random_range(200..3_000)),
        );
    }
    if rng.random_bool(0.1) {
        collector.record_conversion(ConversionKind::Click, None);
    }
}

/// Sleep in short slices so Ctrl+C is honored promptly. Returns false when
/// interrupted.
fn sleep_interruptible(total: Duration, running: &AtomicBool) -> bool {
    let mut remaining = total;
    while remaining > Duration::ZERO {
        if !running.load(Ordering::SeqCst) {
            return false;
        }
        let slice = remaining.min(SLEEP_SLICE);
        std::thread::sleep(slice);
        remaining -= slice;
    }
    running.load(Ordering::SeqCst)
}
