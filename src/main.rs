//! Minimum wage map - Main entry point
//!
//! Reads the Eurostat minimum wage table, country centres and world
//! boundaries, and writes a labelled choropleth of Europe as SVG.

use anyhow::{Context, Result};
use clap::Parser;
use minwage_map::config::MapConfig;
use minwage_map::data::PropertyReader;
use minwage_map::pipeline::{generate_map, write_map};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Overrides file picked up from the working directory when --config is absent
const DEFAULT_CONFIG_FILE: &str = "map_config.json";

/// Draw European minimum wages as a labelled choropleth map
#[derive(Parser, Debug)]
#[command(name = "minwage_map", version)]
#[command(about = "Render a choropleth map of European minimum wages", long_about = None)]
struct Cli {
    /// JSON object of property overrides (default: map_config.json if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output SVG path (overrides output.path)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already installed");
    }

    let cli = Cli::parse();
    info!("minwage_map v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&cli) {
        error!("Map generation failed: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let props = load_properties(cli.config.as_deref())?;
    let mut config = MapConfig::from_properties(&props);
    if let Some(output) = &cli.output {
        config.output_path = output.clone();
    }

    let map = generate_map(&config).context("failed to generate map")?;
    write_map(&map, &config.output_path)
        .with_context(|| format!("failed to save {}", config.output_path.display()))?;
    Ok(())
}

/// Explicit config file, else map_config.json when it exists, else defaults
fn load_properties(explicit: Option<&Path>) -> Result<PropertyReader> {
    match explicit {
        Some(path) => {
            info!("Loading properties from {}", path.display());
            PropertyReader::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))
        }
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            info!("Loading properties from {}", DEFAULT_CONFIG_FILE);
            PropertyReader::load(Path::new(DEFAULT_CONFIG_FILE))
                .with_context(|| format!("failed to load config {}", DEFAULT_CONFIG_FILE))
        }
        None => {
            info!("No config file, using defaults");
            Ok(PropertyReader::defaults())
        }
    }
}
