//! Repeating timer abstraction
//!
//! A controller owns exactly one timer and rearms it on every call and every
//! tick. The host is responsible for invoking the controller's tick handler
//! when a full interval elapses after `start` without an intervening `stop`.

use std::time::Duration;

/// A host-provided repeating timer
///
/// Implementations must cancel any scheduled tick when dropped, since the
/// timer's lifetime is what bounds a binding to its owner.
pub trait RepeatingTimer {
    /// Arm the timer; the next tick is due `interval` from now
    ///
    /// Starting an already armed timer restarts the interval from zero.
    fn start(&mut self, interval: Duration);

    /// Disarm the timer, cancelling the next tick
    fn stop(&mut self);

    /// Whether a tick is currently scheduled
    fn is_active(&self) -> bool;
}

impl<T: RepeatingTimer + ?Sized> RepeatingTimer for Box<T> {
    fn start(&mut self, interval: Duration) {
        (**self).start(interval)
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}

/// Timer that never fires on its own
///
/// Records how it was driven so tests can assert on rearm behavior; ticks are
/// delivered by calling the controller directly.
#[derive(Debug, Default, Clone)]
pub struct ManualTimer {
    /// Interval of the current arm window, if armed
    armed: Option<Duration>,
    /// Number of `start` calls
    starts: usize,
    /// Number of `stop` calls
    stops: usize,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interval the timer is currently armed with
    pub fn interval(&self) -> Option<Duration> {
        self.armed
    }

    pub fn starts(&self) -> usize {
        self.starts
    }

    pub fn stops(&self) -> usize {
        self.stops
    }
}

impl RepeatingTimer for ManualTimer {
    fn start(&mut self, interval: Duration) {
        self.armed = Some(interval);
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.armed = None;
        self.stops += 1;
    }

    fn is_active(&self) -> bool {
        self.armed.is_some()
    }
}
