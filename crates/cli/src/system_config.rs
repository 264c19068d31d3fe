//! Pacer configuration file
//!
//! Resolution order for the file location:
//! 1. `--config PATH`
//! 2. `$PACER_CONFIG`
//! 3. `<config dir>/pacer/config.toml`
//!
//! A missing file is not an error; defaults apply.

use anyhow::{Context, Result};
use pacer_core::DebounceConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "PACER_CONFIG";

/// Default debounce interval, matching the classic spin box demo
pub const DEFAULT_INTERVAL_MS: u64 = 200;

/// Upper bound accepted for `interval_ms` (one hour)
const MAX_INTERVAL_MS: u64 = 3_600_000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    pub debounce: DebounceSettings,
}

/// `[debounce]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebounceSettings {
    pub interval_ms: u64,
    pub fire_on_first: bool,
    pub ignore_delayed: bool,
}

impl Default for DebounceSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            fire_on_first: false,
            ignore_delayed: false,
        }
    }
}

impl DebounceSettings {
    /// Apply command line overrides; flags can only switch behavior on
    pub fn with_overrides(
        mut self,
        interval_ms: Option<u64>,
        fire_on_first: bool,
        ignore_delayed: bool,
    ) -> Self {
        if let Some(interval_ms) = interval_ms {
            self.interval_ms = interval_ms;
        }
        self.fire_on_first |= fire_on_first;
        self.ignore_delayed |= ignore_delayed;
        self
    }

    /// Build the validated binding configuration
    pub fn to_config(&self) -> Result<DebounceConfig> {
        if self.interval_ms > MAX_INTERVAL_MS {
            anyhow::bail!(
                "debounce.interval_ms must be at most {} (got {})",
                MAX_INTERVAL_MS,
                self.interval_ms
            );
        }

        Ok(DebounceConfig::from_millis(self.interval_ms)
            .context("Invalid debounce.interval_ms")?
            .fire_on_first(self.fire_on_first)
            .ignore_delayed(self.ignore_delayed))
    }
}

impl SystemConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        self.debounce.to_config()?;
        Ok(())
    }
}

/// Location of the config file
pub fn config_file_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    let dir = dirs::config_dir().context("Could not determine user config directory")?;
    Ok(dir.join("pacer").join("config.toml"))
}

/// Load and validate the config file, falling back to defaults if missing
pub fn load(explicit: Option<&Path>) -> Result<SystemConfig> {
    let path = config_file_path(explicit)?;
    load_from(&path)
}

/// Load and validate a specific config file
pub fn load_from(path: &Path) -> Result<SystemConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(SystemConfig::default());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: SystemConfig = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    Ok(config)
}

/// Write the example config to `path` unless a file already exists
///
/// Returns whether a file was created.
pub fn init_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, example_config())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(true)
}

/// Commented example config file
pub fn example_config() -> String {
    format!(
        r#"# Pacer configuration

[debounce]
# Minimum spacing between label updates, in milliseconds
interval_ms = {DEFAULT_INTERVAL_MS}

# Update immediately when the last update is older than interval_ms
fire_on_first = false

# Drop updates that cannot happen immediately instead of delaying them
ignore_delayed = false
"#
    )
}
