//! CLI for adpulse — validate configs, probe endpoints, and drive a
//! simulated collection session from the terminal.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "adpulse")]
#[command(about = "adpulse — engagement telemetry collection toolkit")]
#[command(version = adpulse_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a collector configuration and optionally probe its endpoint
    Check {
        /// Path to a JSON configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<String>,

        /// Send a small test payload to the configured endpoint
        #[arg(long)]
        probe: bool,
    },

    /// Run a collector against a synthetic interaction stream.
    /// Events are delivered to the configured endpoint each cycle;
    /// use --dry-run to print payloads instead of sending them.
    Simulate {
        /// Path to a JSON configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<String>,

        /// Override the configured endpoint URL
        #[arg(long)]
        endpoint: Option<String>,

        /// Number of collection cycles to run (0 = until Ctrl+C)
        #[arg(long, default_value_t = 0)]
        cycles: u64,

        /// Seed for the synthetic event stream (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Print payloads instead of sending them over the network
        #[arg(long)]
        dry_run: bool,

        /// Directory for persisted snapshots
        #[arg(long, default_value = ".adpulse")]
        state_dir: String,

        /// Start in battery-saving mode (essential tier only)
        #[arg(long)]
        battery_saving: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config, probe } => commands::check::run(config.as_deref(), probe),
        Commands::Simulate {
            config,
            endpoint,
            cycles,
            seed,
            dry_run,
            state_dir,
            battery_saving,
        } => commands::simulate::run(
            config.as_deref(),
            endpoint,
            cycles,
            seed,
            dry_run,
            &state_dir,
            battery_saving,
        ),
    }
}
