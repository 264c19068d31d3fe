//! Debounce binding configuration

use crate::error::ConfigError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Immutable configuration for one debounced binding
///
/// Built once when a callable is wrapped and shared read-only by every
/// controller created from that wrapper. On disk the interval is stored in
/// whole milliseconds, rounded up:
///
/// ```toml
/// interval_ms = 200
/// fire_on_first = false
/// ignore_delayed = false
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawConfig", into = "RawConfig")]
pub struct DebounceConfig {
    /// Minimum spacing between executions (always non-zero)
    interval: Duration,

    /// Fire immediately when the last execution is older than `interval`
    fire_on_first: bool,

    /// Drop calls that cannot fire immediately instead of deferring them
    ignore_delayed: bool,
}

impl DebounceConfig {
    /// Create a trailing-edge configuration with the given interval
    pub fn new(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        Ok(Self {
            interval,
            fire_on_first: false,
            ignore_delayed: false,
        })
    }

    /// Create a configuration from an interval in milliseconds
    pub fn from_millis(interval_ms: u64) -> Result<Self> {
        Self::new(Duration::from_millis(interval_ms))
    }

    /// Parse a configuration from a standalone TOML table
    ///
    /// Syntax errors are reported as [`ConfigError::Parse`]; a zero interval
    /// as [`ConfigError::ZeroInterval`], same as [`DebounceConfig::new`].
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(source)?;
        Self::try_from(raw)
    }

    /// Enable or disable leading-edge firing
    pub fn fire_on_first(mut self, enabled: bool) -> Self {
        self.fire_on_first = enabled;
        self
    }

    /// Enable or disable dropping of calls that cannot fire immediately
    pub fn ignore_delayed(mut self, enabled: bool) -> Self {
        self.ignore_delayed = enabled;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn fires_on_first(&self) -> bool {
        self.fire_on_first
    }

    pub fn ignores_delayed(&self) -> bool {
        self.ignore_delayed
    }
}

impl fmt::Display for DebounceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.interval)?;

        let flags: Vec<&str> = [
            (self.fire_on_first, "fire_on_first"),
            (self.ignore_delayed, "ignore_delayed"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();

        if !flags.is_empty() {
            write!(f, " ({})", flags.join(", "))?;
        }
        Ok(())
    }
}

const NANOS_PER_MILLI: u128 = 1_000_000;

/// Serialized form of [`DebounceConfig`]
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    interval_ms: u64,
    #[serde(default)]
    fire_on_first: bool,
    #[serde(default)]
    ignore_delayed: bool,
}

impl TryFrom<RawConfig> for DebounceConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self> {
        Ok(DebounceConfig::from_millis(raw.interval_ms)?
            .fire_on_first(raw.fire_on_first)
            .ignore_delayed(raw.ignore_delayed))
    }
}

impl From<DebounceConfig> for RawConfig {
    fn from(config: DebounceConfig) -> Self {
        Self {
            interval_ms: u64::try_from(config.interval.as_nanos().div_ceil(NANOS_PER_MILLI))
                .unwrap_or(u64::MAX),
            fire_on_first: config.fire_on_first,
            ignore_delayed: config.ignore_delayed,
        }
    }
}
