//! Tokio-backed repeating timer
//!
//! Each arm window is a spawned task ticking on a `tokio::time::Interval`.
//! Stopping aborts the task; dropping the timer stops it.

use pacer_core::RepeatingTimer;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

type TickFn = Arc<dyn Fn(u64) + Send + Sync>;

/// Longest period a tick task is scheduled with; longer intervals are clamped
/// so deadline arithmetic cannot overflow
const MAX_PERIOD: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

/// Repeating timer driven by a tokio runtime
///
/// The tick callback receives the epoch of the arm window that produced it.
/// Every `start` opens a new epoch, so a tick racing with a restart can be
/// recognised as stale by comparing against [`TokioTimer::epoch`].
pub struct TokioTimer {
    /// Runtime the tick tasks are spawned on
    handle: Handle,

    /// Tick callback
    on_tick: TickFn,

    /// Task of the current arm window
    task: Option<JoinHandle<()>>,

    /// Incremented on every `start`
    epoch: u64,
}

impl TokioTimer {
    /// Create a disarmed timer
    pub fn new<F>(handle: Handle, on_tick: F) -> Self
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        Self {
            handle,
            on_tick: Arc::new(on_tick),
            task: None,
            epoch: 0,
        }
    }

    /// Epoch of the current arm window
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl RepeatingTimer for TokioTimer {
    fn start(&mut self, interval: Duration) {
        self.stop();
        self.epoch += 1;

        let epoch = self.epoch;
        let on_tick = Arc::clone(&self.on_tick);
        let interval = interval.min(MAX_PERIOD);
        let first = Instant::now() + interval;

        self.task = Some(self.handle.spawn(async move {
            let mut ticks = interval_at(first, interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticks.tick().await;
                on_tick(epoch);
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Current instant on the runtime clock
///
/// Reads tokio's clock so paused test runtimes see virtual time.
pub(crate) fn now() -> std::time::Instant {
    Instant::now().into_std()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    fn counting_timer() -> (TokioTimer, Arc<AtomicUsize>) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let timer = TokioTimer::new(Handle::current(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (timer, ticks)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_repeat_until_stopped() {
        let (mut timer, ticks) = counting_timer();
        assert!(!timer.is_active());

        timer.start(Duration::from_millis(100));
        assert!(timer.is_active());

        sleep(Duration::from_millis(350)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        timer.stop();
        assert!(!timer.is_active());

        sleep(Duration::from_millis(500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_resets_phase() {
        let (mut timer, ticks) = counting_timer();

        timer.start(Duration::from_millis(100));
        sleep(Duration::from_millis(80)).await;
        timer.start(Duration::from_millis(100));
        sleep(Duration::from_millis(80)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(30)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_epoch_advances_on_start() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut timer = TokioTimer::new(Handle::current(), move |epoch| sink.lock().push(epoch));

        timer.start(Duration::from_millis(10));
        sleep(Duration::from_millis(15)).await;
        timer.start(Duration::from_millis(10));
        sleep(Duration::from_millis(15)).await;

        assert_eq!(timer.epoch(), 2);
        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_interval_is_clamped() {
        let (mut timer, ticks) = counting_timer();

        timer.start(Duration::MAX);
        assert!(timer.is_active());

        sleep(Duration::from_secs(24 * 60 * 60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        assert!(timer.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_tick() {
        let (mut timer, ticks) = counting_timer();
        timer.start(Duration::from_millis(50));
        drop(timer);

        sleep(Duration::from_millis(200)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }
}
