//! Debounced calls on the tokio runtime
//!
//! This crate binds the `pacer-core` state machine to tokio:
//! - Repeating timers backed by spawned interval tasks
//! - Owners that bound the lifetime of their bindings
//! - A registry holding one controller per (owner, callable) pair
//! - The `Debounced` wrapper, the public entry point
//!
//! ```ignore
//! let registry = BindingRegistry::new()?;
//! let label = Arc::new(Label { owner: registry.owner(), .. });
//!
//! let update = Debounced::new(
//!     DebounceConfig::from_millis(200)?,
//!     |label: &Label, value: u32| label.set_text(format!("Last updated value is {value}.")),
//! );
//!
//! for value in 0..10 {
//!     update.call(&label, value)?; // fires once, with 9, 200ms after the last call
//! }
//! ```

pub mod debounce;
pub mod error;
pub mod owner;
pub mod registry;
pub mod timer;

// Re-exports
pub use debounce::{debounce, Debounced};
pub use error::Error;
pub use owner::{HasOwner, Owner, OwnerId};
pub use registry::{Binding, BindingRegistry, CallableId, DeferredFailure};
pub use timer::TokioTimer;

pub use pacer_core::{DebounceConfig, Invocation, Report};

/// Result type for binding operations
pub type Result<T> = std::result::Result<T, Error>;
