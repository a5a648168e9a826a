//! Fieldlab CLI - Main entry point
//!
//! Inspects and manipulates a JSON-backed sensor metadata store.

mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fieldlab_core::{SensorId, SensorSpec};
use fieldlab_store::{FileMetadataStore, MetadataStore};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "fieldlab")]
#[command(about = "Sensor and experiment metadata store tool")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "fieldlab.toml")]
    config: PathBuf,

    /// Path to the store snapshot (overrides configuration)
    #[arg(short, long)]
    store: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered external sensors
    Sensors,
    /// List experiments, most recently used first
    Experiments,
    /// Create a new experiment
    NewExperiment,
    /// Register an external sensor
    AddSensor {
        #[arg(long)]
        kind: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
    },
    /// Remove an external sensor by id
    RemoveSensor { id: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = config::load_config(&args.config)?;
    if let Some(store) = args.store {
        config.store.path = store;
    }

    let mut store = FileMetadataStore::load_or_create(&config.store.path)?;
    info!(path = %config.store.path, "Opened metadata store");

    match args.command {
        Command::Sensors => {
            let sensors = store.external_sensors();
            println!("{} sensors:", sensors.len());
            for (id, spec) in sensors {
                println!("  - {} ({} at {})", id, spec.kind, spec.address);
            }
        }
        Command::Experiments => {
            let experiments = store.experiments();
            println!("{} experiments:", experiments.len());
            for experiment in experiments {
                let marker = if experiment.archived { " [archived]" } else { "" };
                println!(
                    "  - {} created {}{}",
                    experiment.id,
                    experiment.created_at.format("%Y-%m-%d %H:%M:%S"),
                    marker
                );
            }
        }
        Command::NewExperiment => {
            let experiment = store.new_experiment();
            println!("Created experiment {}", experiment.id);
        }
        Command::AddSensor {
            kind,
            name,
            address,
        } => {
            let providers = config.provider_registry();
            let spec = SensorSpec::new(kind, name, address);
            let id = store.add_or_get_external_sensor(&spec, &providers)?;
            println!("Registered sensor {}", id);
        }
        Command::RemoveSensor { id } => {
            store.remove_external_sensor(&SensorId(id.clone()));
            println!("Removed sensor {}", id);
        }
    }

    Ok(())
}
