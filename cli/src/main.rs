//! batch-reactor CLI - run a batch reactor against an unlimited fuel market

mod host;

use anyhow::Context;
use batch_reactor_core_rs::{BatchReactor, ReactorConfig};
use clap::{Parser, Subcommand};
use host::Host;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "batch-reactor")]
#[command(about = "Simulate a batch-refuelled reactor facility")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reactor for a number of steps
    Run {
        /// Path to the JSON facility configuration
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Steps to simulate
        #[arg(short, long, default_value_t = 100)]
        steps: usize,

        /// Override the configured lifetime
        #[arg(short, long)]
        lifetime: Option<usize>,

        /// Facility identifier
        #[arg(long, default_value = "BATCH_REACTOR")]
        id: String,

        /// Print the event log as JSON lines
        #[arg(long)]
        events: bool,
    },
    /// Validate a configuration without running it
    Check {
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },
}

fn load_config(path: &Path) -> anyhow::Result<ReactorConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    ReactorConfig::from_json(&json).with_context(|| format!("invalid config {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            steps,
            lifetime,
            id,
            events,
        } => {
            let mut reactor_config = load_config(&config)?;
            if lifetime.is_some() {
                reactor_config.lifetime = lifetime;
            }

            let reactor = BatchReactor::from_config(id, &reactor_config)?;
            info!("{}", reactor);

            let mut host = Host::new(reactor);
            host.run(steps)?;
            let summary = host.summary();
            let reactor = host.reactor();

            println!("Steps run:        {}", summary.steps_run);
            println!("Final phase:      {}", reactor.phase());
            println!("Refuels:          {}", summary.refuels);
            println!("Fuel received:    {:.3}", summary.fuel_received);
            println!("Fuel discharged:  {:.3}", summary.fuel_discharged);
            println!("In core:          {:.3}", reactor.in_core().quantity());
            match summary.decommissioned_at {
                Some(time) => println!("Decommissioned:   step {}", time),
                None => println!("Decommissioned:   no"),
            }
            println!("Events logged:    {}", reactor.event_log().len());

            if events {
                for event in reactor.event_log().events() {
                    println!("{}", serde_json::to_string(event)?);
                }
            }
        }
        Commands::Check { config } => {
            let reactor_config = load_config(&config)?;
            let reactor = BatchReactor::from_config("CHECK", &reactor_config)?;
            println!("{}", reactor);
            println!("Batch size: {:.3}", reactor.batch_size());
            for commodity in reactor.producer().commodities() {
                println!(
                    "Produces {}: capacity {:.3}, cost {:.3}",
                    commodity,
                    reactor.producer().capacity(commodity).unwrap_or_default(),
                    reactor.producer().cost(commodity).unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
