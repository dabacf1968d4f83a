//! Softglow CLI - soft, bright, glow-accented photo enhancement.
//!
//! Every photo goes through the same fixed look: width normalized into a
//! working range, non-local-means denoise, skin smoothing, a bright low
//! contrast grade, texture-only sharpening and a soft bloom.
//!
//! # Usage
//!
//! ```bash
//! # Enhance one photo (writes ring_enhanced.jpg beside it)
//! softglow enhance ring.jpg
//!
//! # Enhance a directory into another directory, reports as a JSON array
//! softglow enhance ./shoot/ -o ./out/ --format json
//!
//! # Stronger glow, pre-rendered watermark text
//! softglow enhance ring.jpg --bloom-preset helper --watermark ~/marks/quilala.png
//!
//! # View configuration
//! softglow config show
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Softglow - deterministic soft-glow photo enhancement.
#[derive(Parser, Debug)]
#[command(name = "softglow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "SOFTGLOW_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Enhance a photo or a directory of photos
    Enhance(cli::enhance::EnhanceArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if cli.config.is_none() => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `softglow config path`."
            );
            softglow_core::Config::default()
        }
        Err(e) => return Err(e),
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("softglow v{}", softglow_core::VERSION);

    match cli.command {
        Commands::Enhance(args) => cli::enhance::execute(args, config),
        Commands::Config(args) => cli::config::execute(args, config, cli.config.as_deref()),
    }
}
