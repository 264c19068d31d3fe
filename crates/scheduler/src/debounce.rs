//! Debounced callables
//!
//! [`Debounced`] is the wrapper form of a debounced method: it carries the
//! configuration and the wrapped function, and routes every call through the
//! controller bound to the call's owner.

use crate::owner::HasOwner;
use crate::registry::CallableId;
use crate::timer::now;
use crate::Result;
use pacer_core::{DebounceConfig, Invocation, Report};
use std::fmt;
use std::sync::{Arc, Weak};

type WrappedFn<O, A, R> = dyn Fn(&O, A) -> R + Send + Sync;

/// A callable whose calls are debounced per owner
///
/// The first argument of the wrapped function is the owner object. Deferred
/// calls keep only a weak reference to it, so a pending call never keeps its
/// owner alive.
///
/// ```ignore
/// let update = Debounced::new(config, |label: &Label, text: String| label.set(text));
/// update.call(&label, "42".into())?;
/// ```
pub struct Debounced<O, A, R> {
    /// Registry lookup key, shared by clones
    id: CallableId,
    config: Arc<DebounceConfig>,
    func: Arc<WrappedFn<O, A, R>>,
}

impl<O, A, R> Debounced<O, A, R>
where
    O: HasOwner + Send + Sync + 'static,
    A: Send + 'static,
    R: Report + 'static,
{
    /// Wrap `func` with the given configuration
    pub fn new<F>(config: DebounceConfig, func: F) -> Self
    where
        F: Fn(&O, A) -> R + Send + Sync + 'static,
    {
        Self {
            id: CallableId::next(),
            config: Arc::new(config),
            func: Arc::new(func),
        }
    }

    /// Call the wrapped function through `target`'s debounce controller
    ///
    /// Returns `Invocation::Fired` with the function's own return value when
    /// the call ran immediately. Calls that fire later from a timer tick
    /// report failures through the registry's failure hook.
    pub fn call(&self, target: &Arc<O>, args: A) -> Result<Invocation<R>> {
        let owner = target.owner();
        let func = Arc::clone(&self.func);

        let binding = owner.registry().resolve(
            owner,
            self.id,
            &self.config,
            move |(target, args): (Weak<O>, A)| {
                // Owner already gone: nothing left to update
                let target = target.upgrade()?;
                func(&*target, args).into_failure()
            },
        )?;

        let admission = binding.lock().admit(now(), (Arc::downgrade(target), args));
        Ok(admission.run(|(_, args)| (self.func)(&**target, args)))
    }

    pub fn id(&self) -> CallableId {
        self.id
    }

    pub fn config(&self) -> &DebounceConfig {
        &self.config
    }
}

impl<O, A, R> Clone for Debounced<O, A, R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            config: Arc::clone(&self.config),
            func: Arc::clone(&self.func),
        }
    }
}

impl<O, A, R> fmt::Debug for Debounced<O, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced")
            .field("id", &self.id)
            .field("config", &self.config)
            .finish()
    }
}

/// Wrap `func` so that its calls are debounced per owner
pub fn debounce<O, A, R, F>(config: DebounceConfig, func: F) -> Debounced<O, A, R>
where
    O: HasOwner + Send + Sync + 'static,
    A: Send + 'static,
    R: Report + 'static,
    F: Fn(&O, A) -> R + Send + Sync + 'static,
{
    Debounced::new(config, func)
}
