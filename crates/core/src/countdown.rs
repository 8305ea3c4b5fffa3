/// Result of advancing a [`Countdown`] by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown was not running; nothing changed.
    Idle,
    /// One second elapsed and time remains.
    Ticked { time_left: u32 },
    /// The countdown just reached zero and stopped itself.
    Expired,
}

/// Second-granularity countdown with no notion of wall time.
///
/// A driver calls [`Countdown::tick`] once per elapsed second while running.
/// `Expired` is reported exactly once per start/reset cycle: the tick that
/// reaches zero also clears `running`, so later ticks are `Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    budget: u32,
    time_left: u32,
    running: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(budget: u32) -> Self {
        Self {
            budget,
            time_left: budget,
            running: false,
        }
    }

    #[must_use]
    pub fn budget(&self) -> u32 {
        self.budget
    }

    #[must_use]
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts the countdown. Returns `false` if it was already running or
    /// has no time left to count.
    pub fn start(&mut self) -> bool {
        if self.running || self.time_left == 0 {
            return false;
        }
        self.running = true;
        true
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Stops the countdown and refills it with `new_budget`, or with the
    /// current budget when `None`. A supplied budget becomes the new default.
    pub fn reset(&mut self, new_budget: Option<u32>) {
        if let Some(budget) = new_budget {
            self.budget = budget;
        }
        self.time_left = self.budget;
        self.running = false;
    }

    /// Changes the budget used by future resets without touching `time_left`.
    pub fn set_budget(&mut self, budget: u32) {
        self.budget = budget;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.running = false;
            TickOutcome::Expired
        } else {
            TickOutcome::Ticked {
                time_left: self.time_left,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_full_budget_expires_once() {
        let mut countdown = Countdown::new(3);
        assert!(countdown.start());

        assert_eq!(countdown.tick(), TickOutcome::Ticked { time_left: 2 });
        assert_eq!(countdown.tick(), TickOutcome::Ticked { time_left: 1 });
        assert_eq!(countdown.tick(), TickOutcome::Expired);
        assert_eq!(countdown.tick(), TickOutcome::Idle);

        assert_eq!(countdown.time_left(), 0);
        assert!(!countdown.is_running());
    }

    #[test]
    fn start_is_idempotent_while_running() {
        let mut countdown = Countdown::new(5);
        assert!(countdown.start());
        assert!(!countdown.start());
        assert!(countdown.is_running());
    }

    #[test]
    fn paused_countdown_does_not_tick() {
        let mut countdown = Countdown::new(5);
        countdown.start();
        countdown.tick();
        countdown.pause();
        assert_eq!(countdown.tick(), TickOutcome::Idle);
        assert_eq!(countdown.time_left(), 4);
    }

    #[test]
    fn double_reset_restores_budget_without_running() {
        let mut countdown = Countdown::new(10);
        countdown.start();
        countdown.tick();
        countdown.reset(None);
        countdown.reset(None);
        assert_eq!(countdown.time_left(), 10);
        assert!(!countdown.is_running());
        assert_eq!(countdown.tick(), TickOutcome::Idle);
    }

    #[test]
    fn reset_with_budget_replaces_default() {
        let mut countdown = Countdown::new(10);
        countdown.reset(Some(4));
        assert_eq!(countdown.time_left(), 4);
        countdown.reset(None);
        assert_eq!(countdown.budget(), 4);
    }

    #[test]
    fn expired_countdown_cannot_restart_until_reset() {
        let mut countdown = Countdown::new(1);
        countdown.start();
        assert_eq!(countdown.tick(), TickOutcome::Expired);
        assert!(!countdown.start());

        countdown.set_budget(2);
        countdown.reset(None);
        assert!(countdown.start());
        assert_eq!(countdown.time_left(), 2);
    }
}
