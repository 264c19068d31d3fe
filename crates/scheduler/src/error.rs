//! Errors surfaced by the binding layer

use crate::owner::OwnerId;
use crate::registry::CallableId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The owner was destroyed; calling through it is a lifetime violation
    #[error("owner {0} was destroyed; its debounced bindings no longer exist")]
    OwnerDestroyed(OwnerId),

    /// The owner was minted by a different registry
    #[error("owner {0} belongs to a different binding registry")]
    ForeignOwner(OwnerId),

    /// An existing binding was created for a different call type
    #[error("binding {callable} of owner {owner} was created with a different call type")]
    BindingTypeMismatch {
        owner: OwnerId,
        callable: CallableId,
    },

    /// No tokio runtime to schedule timers on
    #[error("no tokio runtime is available to drive debounce timers")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    #[error(transparent)]
    Config(#[from] pacer_core::ConfigError),
}
