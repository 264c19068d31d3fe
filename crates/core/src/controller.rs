//! Debounce/throttle state machine
//!
//! Every call stops the timer, decides between firing now, deferring, or
//! dropping, then rearms the timer for a full interval. Bursts of calls
//! therefore collapse into a single trailing execution of the most recent
//! call, fired one interval after the burst ends.
//!
//! With `fire_on_first`, a call fires immediately when the previous actual
//! execution is more than one interval old. With `ignore_delayed`, calls that
//! cannot fire immediately are discarded instead of deferred.

use crate::config::DebounceConfig;
use crate::timer::RepeatingTimer;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::trace;

/// What the controller decided to do with a call, before running it
#[derive(Debug)]
pub enum Admission<C> {
    /// The call must run now, in the caller's context
    Fire(C),
    /// The call is now the pending call
    Deferred {
        /// Whether an earlier pending call was overwritten
        superseded: bool,
    },
    /// The call was discarded
    Dropped,
}

/// Outcome of a call routed through a controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation<R> {
    /// The call ran immediately and returned this value
    Fired(R),
    /// The call will run on a later tick unless superseded
    Deferred {
        /// Whether an earlier pending call was overwritten
        superseded: bool,
    },
    /// The call will never run
    Dropped,
}

impl<C> Admission<C> {
    /// Run a `Fire` admission, keeping the other outcomes as they are
    pub fn run<R>(self, exec: impl FnOnce(C) -> R) -> Invocation<R> {
        match self {
            Admission::Fire(call) => Invocation::Fired(exec(call)),
            Admission::Deferred { superseded } => Invocation::Deferred { superseded },
            Admission::Dropped => Invocation::Dropped,
        }
    }
}

impl<R> Invocation<R> {
    /// The return value, if the call ran immediately
    pub fn fired(self) -> Option<R> {
        match self {
            Invocation::Fired(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_fired(&self) -> bool {
        matches!(self, Invocation::Fired(_))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Invocation::Deferred { .. })
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, Invocation::Dropped)
    }
}

/// Debounce controller for one (owner, callable) binding
///
/// `C` is the captured call type and `T` the timer the controller drives. The
/// controller never reads a clock; callers pass the current instant.
pub struct DebounceController<C, T> {
    /// Shared binding configuration
    config: Arc<DebounceConfig>,

    /// Instant of the most recent actual execution (`None` until one happens)
    last_fire_time: Option<Instant>,

    /// Most recent deferred call
    pending: Option<C>,

    /// Rearm timer, armed for as long as the controller lives
    timer: T,

    /// Set by `shutdown`; a closed controller never arms its timer again
    closed: bool,
}

impl<C, T: RepeatingTimer> DebounceController<C, T> {
    /// Create a controller and arm its timer
    pub fn new(config: Arc<DebounceConfig>, mut timer: T) -> Self {
        timer.start(config.interval());

        Self {
            config,
            last_fire_time: None,
            pending: None,
            timer,
            closed: false,
        }
    }

    /// Decide what to do with `call` arriving at `now`
    ///
    /// Returns `Admission::Fire` when the call must run immediately; the
    /// caller is expected to run it. Deferred calls are kept until the next
    /// [`take_due`](Self::take_due).
    pub fn admit(&mut self, now: Instant, call: C) -> Admission<C> {
        if self.closed {
            trace!("debounce: dropping call on closed controller");
            return Admission::Dropped;
        }

        self.timer.stop();

        let admission = if self.leading_edge_open(now) {
            self.pending = None;
            self.mark_fired(now);
            trace!("debounce: firing immediately");
            Admission::Fire(call)
        } else if self.config.ignores_delayed() {
            trace!("debounce: dropping delayed call");
            Admission::Dropped
        } else {
            let superseded = self.pending.replace(call).is_some();
            trace!(superseded, "debounce: deferring call");
            Admission::Deferred { superseded }
        };

        self.timer.start(self.config.interval());
        admission
    }

    /// Handle a timer tick at `now`, returning the pending call if any
    ///
    /// The timer is rearmed whether or not a call was pending.
    pub fn take_due(&mut self, now: Instant) -> Option<C> {
        if self.closed {
            return None;
        }

        self.timer.stop();

        let due = self.pending.take();
        if due.is_some() {
            self.mark_fired(now);
            trace!("debounce: firing deferred call");
        }

        self.timer.start(self.config.interval());
        due
    }

    /// Route `call` through the controller, running it if it fires now
    pub fn invoke<R>(&mut self, now: Instant, call: C) -> Invocation<R>
    where
        C: FnOnce() -> R,
    {
        self.admit(now, call).run(|call| call())
    }

    /// Handle a timer tick, running the pending call if any
    pub fn on_tick<R>(&mut self, now: Instant) -> Option<R>
    where
        C: FnOnce() -> R,
    {
        self.take_due(now).map(|call| call())
    }

    /// Stop the timer for good and hand back the discarded pending call
    ///
    /// Later calls are dropped and ticks do nothing. The discarded call is
    /// returned so the caller can drop it outside any lock it holds.
    pub fn shutdown(&mut self) -> Option<C> {
        self.closed = true;
        self.timer.stop();
        self.pending.take()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn config(&self) -> &DebounceConfig {
        &self.config
    }

    pub fn last_fire_time(&self) -> Option<Instant> {
        self.last_fire_time
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Leading-edge firing is allowed only once the last execution is
    /// strictly more than one interval old
    fn leading_edge_open(&self, now: Instant) -> bool {
        if !self.config.fires_on_first() {
            return false;
        }

        match self.last_fire_time {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.config.interval(),
        }
    }

    fn mark_fired(&mut self, now: Instant) {
        // Never move backwards, even if a host hands us a stale instant
        self.last_fire_time = Some(match self.last_fire_time {
            Some(last) if last > now => last,
            _ => now,
        });
    }
}

impl<C, T> fmt::Debug for DebounceController<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebounceController")
            .field("config", &self.config)
            .field("last_fire_time", &self.last_fire_time)
            .field("has_pending", &self.pending.is_some())
            .field("closed", &self.closed)
            .finish()
    }
}
