//! Configuration errors

use thiserror::Error;

/// Errors raised while building a [`DebounceConfig`](crate::DebounceConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The interval was zero
    #[error("debounce interval must be greater than zero")]
    ZeroInterval,

    /// The TOML source could not be parsed
    #[error("invalid debounce configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
