//! Wall-time driver for [`quiz_core::Countdown`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use quiz_core::{Countdown, TickOutcome};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

const TICK: Duration = Duration::from_secs(1);

/// Callback invoked when the countdown reaches zero.
pub type ExpiryHandler = Arc<dyn Fn() + Send + Sync>;

struct TimerState {
    countdown: Countdown,
    // Bumped on every start/pause/reset; a ticking task only acts while it matches.
    epoch: u64,
    on_expire: Option<ExpiryHandler>,
    task: Option<JoinHandle<()>>,
    // Running time already counted toward the next tick, kept across pauses.
    carried: Duration,
    // Start of the current run, or the last tick within it.
    since: Option<Instant>,
}

impl TimerState {
    fn cancel_pending(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn bank_elapsed(&mut self) {
        if let Some(since) = self.since.take() {
            self.carried = (self.carried + since.elapsed()).min(TICK);
        }
    }

    fn clear_carry(&mut self) {
        self.carried = Duration::ZERO;
        self.since = None;
    }
}

/// Countdown that ticks once per second on the tokio runtime.
///
/// The expiry handler is looked up when the countdown hits zero, not when it
/// was started, so replacing it mid-countdown takes effect. `pause` and
/// `reset` cancel the ticking task; a tick already in flight sees the changed
/// epoch and does nothing. Time run since the last tick survives a pause, so
/// many short runs still add up to whole seconds.
///
/// `start` spawns onto the current tokio runtime and must be called from
/// within one.
pub struct RoundTimer {
    state: Arc<Mutex<TimerState>>,
}

impl RoundTimer {
    #[must_use]
    pub fn new(budget: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState {
                countdown: Countdown::new(budget),
                epoch: 0,
                on_expire: None,
                task: None,
                carried: Duration::ZERO,
                since: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TimerState> {
        lock_state(&self.state)
    }

    /// Begin counting down. No-op while already running or when no time is left.
    pub fn start(&self) {
        let mut state = self.lock();
        if !state.countdown.start() {
            return;
        }
        state.cancel_pending();
        let epoch = state.epoch;
        let now = Instant::now();
        let first_tick = now + TICK.saturating_sub(state.carried);
        state.since = Some(now);
        let weak = Arc::downgrade(&self.state);
        state.task = Some(tokio::spawn(run_ticks(weak, epoch, first_tick)));
    }

    /// Stop counting. The part of a second already run is kept for the next `start`.
    pub fn pause(&self) {
        let mut state = self.lock();
        state.cancel_pending();
        if state.countdown.is_running() {
            state.bank_elapsed();
        }
        state.countdown.pause();
    }

    /// Stop and refill to `new_budget`, or to the current budget when `None`.
    pub fn reset(&self, new_budget: Option<u32>) {
        let mut state = self.lock();
        state.cancel_pending();
        state.clear_carry();
        state.countdown.reset(new_budget);
    }

    pub fn set_budget(&self, seconds: u32) {
        self.lock().countdown.set_budget(seconds);
    }

    pub fn set_on_expire(&self, handler: impl Fn() + Send + Sync + 'static) {
        self.lock().on_expire = Some(Arc::new(handler));
    }

    pub fn clear_on_expire(&self) {
        self.lock().on_expire = None;
    }

    #[must_use]
    pub fn time_left(&self) -> u32 {
        self.lock().countdown.time_left()
    }

    #[must_use]
    pub fn budget(&self) -> u32 {
        self.lock().countdown.budget()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock().countdown.is_running()
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        self.lock().cancel_pending();
    }
}

fn lock_state(state: &Mutex<TimerState>) -> MutexGuard<'_, TimerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_ticks(weak: Weak<Mutex<TimerState>>, epoch: u64, first_tick: Instant) {
    let mut ticker = time::interval_at(first_tick, TICK);
    loop {
        ticker.tick().await;
        let Some(state) = weak.upgrade() else {
            return;
        };
        let handler = {
            let mut guard = lock_state(&state);
            if guard.epoch != epoch {
                return;
            }
            guard.carried = Duration::ZERO;
            guard.since = Some(Instant::now());
            match guard.countdown.tick() {
                TickOutcome::Ticked { .. } => continue,
                TickOutcome::Idle => return,
                TickOutcome::Expired => {
                    guard.task = None;
                    guard.clear_carry();
                    guard.on_expire.clone()
                }
            }
        };
        // Called without the lock so the handler may drive the timer itself.
        if let Some(handler) = handler {
            handler();
        }
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let hits = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&hits);
        (hits, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn full_run_expires_exactly_once() {
        let timer = RoundTimer::new(3);
        let (hits, handler) = counter();
        timer.set_on_expire(handler);

        timer.start();
        assert!(timer.is_running());
        time::sleep(Duration::from_millis(3_500)).await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(timer.time_left(), 0);
        assert!(!timer.is_running());

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_does_not_double_tick() {
        let timer = RoundTimer::new(10);
        timer.start();
        timer.start();
        time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(timer.time_left(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_pending_expiry() {
        let timer = RoundTimer::new(3);
        let (hits, handler) = counter();
        timer.set_on_expire(handler);

        timer.start();
        time::sleep(Duration::from_millis(2_500)).await;
        timer.reset(None);
        time::sleep(Duration::from_secs(5)).await;

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(timer.time_left(), 3);
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn double_reset_without_start_fires_nothing() {
        let timer = RoundTimer::new(5);
        let (hits, handler) = counter();
        timer.set_on_expire(handler);

        timer.reset(None);
        timer.reset(None);
        time::sleep(Duration::from_secs(10)).await;

        assert_eq!(timer.time_left(), 5);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_then_resume_keeps_remaining_time() {
        let timer = RoundTimer::new(5);
        let (hits, handler) = counter();
        timer.set_on_expire(handler);

        timer.start();
        time::sleep(Duration::from_millis(2_500)).await;
        timer.pause();
        assert_eq!(timer.time_left(), 3);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(timer.time_left(), 3);

        timer.start();
        time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn short_runs_between_pauses_still_add_up() {
        let timer = RoundTimer::new(120);
        for _ in 0..10 {
            timer.start();
            time::sleep(Duration::from_millis(950)).await;
            timer.pause();
        }
        // 9.5 s of running time.
        assert_eq!(timer.time_left(), 111);

        timer.reset(None);
        timer.start();
        time::sleep(Duration::from_millis(950)).await;
        assert_eq!(timer.time_left(), 120);
    }

    #[tokio::test(start_paused = true)]
    async fn latest_handler_is_called() {
        let timer = RoundTimer::new(2);
        let (first, first_handler) = counter();
        let (second, second_handler) = counter();

        timer.set_on_expire(first_handler);
        timer.start();
        time::sleep(Duration::from_millis(1_500)).await;
        timer.set_on_expire(second_handler);
        time::sleep(Duration::from_secs(2)).await;

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_with_new_budget_applies_to_next_run() {
        let timer = RoundTimer::new(60);
        timer.reset(Some(20));
        assert_eq!(timer.time_left(), 20);
        assert_eq!(timer.budget(), 20);

        timer.set_budget(45);
        assert_eq!(timer.time_left(), 20);
        timer.reset(None);
        assert_eq!(timer.time_left(), 45);
    }
}
