use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// How a round was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundOutcome {
    Pending,
    Correct,
    Incorrect,
    TimedOut,
}

impl RoundOutcome {
    #[must_use]
    pub fn is_resolved(self) -> bool {
        !matches!(self, RoundOutcome::Pending)
    }

    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, RoundOutcome::Correct)
    }
}

/// Upper bound on the number of rounds in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundLimit {
    Finite(NonZeroU32),
    Unbounded,
}

impl RoundLimit {
    /// Convenience constructor; `0` is treated as a single round.
    #[must_use]
    pub fn finite(rounds: u32) -> Self {
        Self::Finite(NonZeroU32::new(rounds).unwrap_or(NonZeroU32::MIN))
    }

    #[must_use]
    pub fn get(self) -> Option<u32> {
        match self {
            RoundLimit::Finite(n) => Some(n.get()),
            RoundLimit::Unbounded => None,
        }
    }

    #[must_use]
    pub fn is_unbounded(self) -> bool {
        matches!(self, RoundLimit::Unbounded)
    }
}

/// Inputs to a mode's scoring and continuation rules for one resolved round.
///
/// `streak` already includes the round being scored. For session-clock modes
/// `time_budget` is the session clock reading when the question appeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundContext {
    pub correct: bool,
    pub time_remaining: u32,
    pub time_budget: u32,
    pub hint_attempts_used: u32,
    pub streak: u32,
    pub round_index: u32,
}

impl RoundContext {
    /// Seconds spent on the question, clamped to the budget.
    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.time_budget.saturating_sub(self.time_remaining)
    }
}

/// Tracks the 1-based index of the current round against a [`RoundLimit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTracker {
    current: u32,
    limit: RoundLimit,
}

impl RoundTracker {
    #[must_use]
    pub fn new(limit: RoundLimit) -> Self {
        Self { current: 1, limit }
    }

    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub fn limit(&self) -> RoundLimit {
        self.limit
    }

    pub fn next(&mut self) {
        self.current = self.current.saturating_add(1);
    }

    /// True once a finite limit has been reached.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        match self.limit {
            RoundLimit::Finite(max) => self.current >= max.get(),
            RoundLimit::Unbounded => false,
        }
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }
}
