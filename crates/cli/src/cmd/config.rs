//! Configuration management command
//!
//! Provides CLI interface to view the debounce configuration.

use crate::system_config;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

/// Print the effective configuration
pub async fn run_show(explicit: Option<&Path>) -> Result<()> {
    let config_path = system_config::config_file_path(explicit)?;
    let config = system_config::load_from(&config_path)?;
    let effective = config.debounce.to_config()?;

    println!("{}", "Debounce Configuration".bold());
    if config_path.exists() {
        println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());
    } else {
        println!(
            "{}: {} {}\n",
            "Location".dimmed(),
            config_path.display().dimmed(),
            "(not found, using defaults)".yellow()
        );
    }

    println!("{}", "[debounce]".yellow());
    println!(
        "  {} = {} {}",
        "interval_ms".cyan(),
        config.debounce.interval_ms,
        format!("({:?})", effective.interval()).dimmed()
    );
    println!(
        "  {} = {}",
        "fire_on_first".cyan(),
        config.debounce.fire_on_first
    );
    println!(
        "  {} = {}",
        "ignore_delayed".cyan(),
        config.debounce.ignore_delayed
    );

    println!("\n{} {}", "Mode:".bold(), describe_mode(&config.debounce));

    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(explicit: Option<&Path>, create: bool) -> Result<()> {
    let config_path = system_config::config_file_path(explicit)
        .context("Could not determine config file path")?;

    if create && system_config::init_if_missing(&config_path)? {
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    print!("{}", system_config::example_config());
    Ok(())
}

fn describe_mode(settings: &system_config::DebounceSettings) -> &'static str {
    match (settings.fire_on_first, settings.ignore_delayed) {
        (false, false) => "trailing-edge debounce (last value wins after a quiet period)",
        (true, false) => "leading edge, then trailing updates for bursts",
        (true, true) => "leading-edge throttle (values inside the interval are dropped)",
        (false, true) => "drop everything (no value can ever fire)",
    }
}
