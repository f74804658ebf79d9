use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ml_grid_arena::config::AppConfig;
use ml_grid_arena::training::run;

/// Train grid-arena agents with DQN self-play.
#[derive(Parser)]
#[command(name = "ml-grid-arena", about = "Train grid-arena RL agents")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the total tick budget
    #[arg(long)]
    iterations: Option<u64>,

    /// Override the RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    // Load configuration
    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(iterations) = cli.iterations {
        config.training.iterations = iterations;
    }
    if let Some(seed) = cli.seed {
        config.training.seed = Some(seed);
    }
    config.validate().context("validating configuration")?;

    run::train(&config).context("training run failed")?;
    Ok(())
}
