//! Runtime-agnostic debounce primitives for Pacer
//!
//! This crate provides:
//! - Binding configuration (`DebounceConfig`)
//! - The repeating timer abstraction controllers drive
//! - The debounce/throttle state machine (`DebounceController`)
//! - Failure reporting for calls fired outside their call site
//!
//! Nothing here reads a clock: every operation takes the current instant
//! explicitly, so hosts decide where time comes from.

pub mod config;
pub mod controller;
pub mod error;
pub mod report;
pub mod timer;

// Re-exports
pub use config::DebounceConfig;
pub use controller::{Admission, DebounceController, Invocation};
pub use error::ConfigError;
pub use report::Report;
pub use timer::{ManualTimer, RepeatingTimer};

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
