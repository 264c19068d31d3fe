//! Pacer CLI - pacer command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;
mod system_config;

/// Pacer - debounce and throttle bursts of calls
#[derive(Parser)]
#[command(name = "pacer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: $PACER_CONFIG or <config dir>/pacer/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Debounce label updates read from stdin, one value per line
    Demo {
        /// Interval between updates in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Update immediately when the last update is older than the interval
        #[arg(long)]
        fire_on_first: bool,
        /// Drop updates that cannot happen immediately
        #[arg(long)]
        ignore_delayed: bool,
        /// Update the label for every value
        #[arg(long)]
        no_debounce: bool,
    },
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print the config file location
    Path {
        /// Create the file with example contents if missing
        #[arg(long)]
        create: bool,
    },
    /// Print an example config file
    Example,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Demo { interval_ms, fire_on_first, ignore_delayed, no_debounce } => {
            cmd::demo::run(cmd::demo::DemoOptions {
                config: cli.config.clone(),
                interval_ms,
                fire_on_first,
                ignore_delayed,
                no_debounce,
            })
            .await
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Show => cmd::config::run_show(config).await,
            ConfigCommands::Path { create } => cmd::config::run_path(config, create).await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
    }
}
