//! Binding owners
//!
//! An [`Owner`] bounds the lifetime of every binding created for it. Embed
//! one in the object whose methods are debounced; when the object is dropped
//! (or the owner is destroyed explicitly) all of its controllers and their
//! timers go with it.

use crate::registry::{BindingRegistry, RegistryInner};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_OWNER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an owner, unique for the life of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(u64);

impl OwnerId {
    fn next() -> Self {
        Self(NEXT_OWNER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner#{}", self.0)
    }
}

/// Lifetime anchor for debounced bindings
pub struct Owner {
    id: OwnerId,
    registry: Arc<RegistryInner>,
    destroyed: AtomicBool,
}

impl Owner {
    pub(crate) fn new(registry: Arc<RegistryInner>) -> Self {
        Self {
            id: OwnerId::next(),
            registry,
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> OwnerId {
        self.id
    }

    /// Registry this owner's bindings live in
    pub fn registry(&self) -> BindingRegistry {
        BindingRegistry::from_inner(Arc::clone(&self.registry))
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Tear down every binding of this owner
    ///
    /// Pending calls are discarded and timers cancelled. Later calls through
    /// a debounced wrapper fail with [`Error::OwnerDestroyed`](crate::Error).
    pub fn destroy(&self) {
        if !self.destroyed.swap(true, Ordering::AcqRel) {
            self.registry.release(self.id);
        }
    }

    pub(crate) fn belongs_to(&self, registry: &Arc<RegistryInner>) -> bool {
        Arc::ptr_eq(&self.registry, registry)
    }
}

impl Drop for Owner {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owner")
            .field("id", &self.id)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

/// Objects that own debounced bindings
pub trait HasOwner {
    fn owner(&self) -> &Owner;
}

impl HasOwner for Owner {
    fn owner(&self) -> &Owner {
        self
    }
}
