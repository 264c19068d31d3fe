//! Binding registry
//!
//! Maps each (owner, callable) pair to exactly one debounce controller,
//! created lazily on the first call. The registry entry owns the controller
//! and the controller owns its timer, so releasing an owner's entries is
//! what cancels its timers.

use crate::error::Error;
use crate::owner::{Owner, OwnerId};
use crate::timer::{now, TokioTimer};
use crate::Result;
use dashmap::DashMap;
use pacer_core::{DebounceConfig, DebounceController};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::{debug, error};

static NEXT_CALLABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a wrapped callable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallableId(u64);

impl CallableId {
    /// Mint a fresh identity
    pub fn next() -> Self {
        Self(NEXT_CALLABLE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CallableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "callable#{}", self.0)
    }
}

/// Controller type stored for every binding
pub type Controller<C> = DebounceController<C, TokioTimer>;

/// Shared handle to a binding's controller
pub type Binding<C> = Arc<Mutex<Controller<C>>>;

/// A deferred call that returned a failure from a timer tick
#[derive(Debug)]
pub struct DeferredFailure {
    pub owner: OwnerId,
    pub callable: CallableId,
    pub error: anyhow::Error,
}

type FailureHook = Arc<dyn Fn(DeferredFailure) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BindingKey {
    owner: OwnerId,
    callable: CallableId,
}

/// Type-erased view of a `Binding<C>`
trait BindingSlot: Send + Sync {
    /// Close the controller, dropping its pending call after unlocking
    fn shutdown(&self);

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<C: Send + 'static> BindingSlot for Mutex<Controller<C>> {
    fn shutdown(&self) {
        let discarded = self.lock().shutdown();
        drop(discarded);
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

pub(crate) struct RegistryInner {
    /// Type-erased `Binding<C>` per key
    bindings: DashMap<BindingKey, Arc<dyn BindingSlot>>,

    /// Runtime timers are spawned on
    handle: Handle,

    /// Receives failures of calls fired from ticks
    on_failure: RwLock<FailureHook>,
}

impl RegistryInner {
    /// Drop every binding of `owner`, cancelling their timers
    ///
    /// Each controller is closed as well, so a `Binding` handle still held
    /// by a caller can neither fire nor rearm.
    pub(crate) fn release(&self, owner: OwnerId) {
        let keys: Vec<BindingKey> = self
            .bindings
            .iter()
            .map(|entry| *entry.key())
            .filter(|key| key.owner == owner)
            .collect();

        let released: Vec<Arc<dyn BindingSlot>> = keys
            .iter()
            .filter_map(|key| self.bindings.remove(key))
            .map(|(_, binding)| binding)
            .collect();

        // Map shards are unlocked here
        for binding in &released {
            binding.shutdown();
        }

        if !released.is_empty() {
            debug!(%owner, released = released.len(), "released debounced bindings");
        }
    }

    fn report(&self, failure: DeferredFailure) {
        let hook = Arc::clone(&*self.on_failure.read());
        hook(failure);
    }
}

/// Registry of debounce bindings
///
/// Cheap to clone; clones share the same bindings.
#[derive(Clone)]
pub struct BindingRegistry {
    inner: Arc<RegistryInner>,
}

impl BindingRegistry {
    /// Create a registry on the current tokio runtime
    pub fn new() -> Result<Self> {
        Ok(Self::with_handle(Handle::try_current()?))
    }

    /// Create a registry whose timers run on `handle`
    pub fn with_handle(handle: Handle) -> Self {
        let on_failure: FailureHook = Arc::new(log_failure);

        Self {
            inner: Arc::new(RegistryInner {
                bindings: DashMap::new(),
                handle,
                on_failure: RwLock::new(on_failure),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<RegistryInner>) -> Self {
        Self { inner }
    }

    /// Replace the deferred-failure hook (builder form)
    pub fn with_failure_hook<F>(self, hook: F) -> Self
    where
        F: Fn(DeferredFailure) + Send + Sync + 'static,
    {
        self.set_failure_hook(hook);
        self
    }

    /// Replace the deferred-failure hook
    ///
    /// The default hook logs the failure at error level.
    pub fn set_failure_hook<F>(&self, hook: F)
    where
        F: Fn(DeferredFailure) + Send + Sync + 'static,
    {
        *self.inner.on_failure.write() = Arc::new(hook);
    }

    /// Mint a new owner whose bindings live in this registry
    pub fn owner(&self) -> Owner {
        Owner::new(Arc::clone(&self.inner))
    }

    /// Get the controller for (`owner`, `callable`), creating it if needed
    ///
    /// `config` and `run` are only used when the binding is created; an
    /// existing binding keeps the configuration it was created with. `run`
    /// executes calls that fire from a timer tick and returns their failure,
    /// if any.
    pub fn resolve<C, F>(
        &self,
        owner: &Owner,
        callable: CallableId,
        config: &Arc<DebounceConfig>,
        run: F,
    ) -> Result<Binding<C>>
    where
        C: Send + 'static,
        F: Fn(C) -> Option<anyhow::Error> + Send + Sync + 'static,
    {
        if !owner.belongs_to(&self.inner) {
            return Err(Error::ForeignOwner(owner.id()));
        }
        if owner.is_destroyed() {
            return Err(Error::OwnerDestroyed(owner.id()));
        }

        let key = BindingKey {
            owner: owner.id(),
            callable,
        };

        let entry = self.inner.bindings.entry(key).or_insert_with(|| {
            debug!(owner = %key.owner, callable = %key.callable, %config, "creating debounced binding");
            let binding: Arc<dyn BindingSlot> = self.create_binding(key, Arc::clone(config), run);
            binding
        });
        let binding = Arc::clone(entry.value());
        drop(entry);

        // Owner destroyed while the entry was being inserted
        if owner.is_destroyed() {
            self.inner.release(owner.id());
            return Err(Error::OwnerDestroyed(owner.id()));
        }

        binding
            .into_any()
            .downcast::<Mutex<Controller<C>>>()
            .map_err(|_| Error::BindingTypeMismatch {
                owner: key.owner,
                callable,
            })
    }

    /// Number of live bindings
    pub fn len(&self) -> usize {
        self.inner.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.bindings.is_empty()
    }

    /// Number of live bindings held by `owner`
    pub fn bindings_for(&self, owner: OwnerId) -> usize {
        self.inner
            .bindings
            .iter()
            .filter(|entry| entry.key().owner == owner)
            .count()
    }

    pub fn contains(&self, owner: OwnerId, callable: CallableId) -> bool {
        self.inner
            .bindings
            .contains_key(&BindingKey { owner, callable })
    }

    fn create_binding<C, F>(&self, key: BindingKey, config: Arc<DebounceConfig>, run: F) -> Binding<C>
    where
        C: Send + 'static,
        F: Fn(C) -> Option<anyhow::Error> + Send + Sync + 'static,
    {
        let registry = Arc::downgrade(&self.inner);
        let handle = self.inner.handle.clone();

        Arc::new_cyclic(|binding: &Weak<Mutex<Controller<C>>>| {
            let binding = binding.clone();
            let timer = TokioTimer::new(handle, move |epoch| {
                fire_due(&binding, epoch, &run, key, &registry);
            });
            Mutex::new(DebounceController::new(config, timer))
        })
    }
}

impl fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("bindings", &self.len())
            .finish()
    }
}

/// Timer tick handler for one binding
///
/// The pending call runs after the controller lock is released, so it may
/// call back into its own wrapper.
fn fire_due<C, F>(
    binding: &Weak<Mutex<Controller<C>>>,
    epoch: u64,
    run: &F,
    key: BindingKey,
    registry: &Weak<RegistryInner>,
) where
    F: Fn(C) -> Option<anyhow::Error>,
{
    let Some(binding) = binding.upgrade() else {
        return;
    };

    let due = {
        let mut controller = binding.lock();
        // Tick from an arm window a concurrent call already replaced
        if controller.timer().epoch() != epoch {
            return;
        }
        controller.take_due(now())
    };
    drop(binding);

    let Some(call) = due else {
        return;
    };

    if let Some(error) = run(call) {
        let failure = DeferredFailure {
            owner: key.owner,
            callable: key.callable,
            error,
        };
        match registry.upgrade() {
            Some(registry) => registry.report(failure),
            None => log_failure(failure),
        }
    }
}

fn log_failure(failure: DeferredFailure) {
    error!(
        owner = %failure.owner,
        callable = %failure.callable,
        "deferred call failed: {:#}",
        failure.error
    );
}
