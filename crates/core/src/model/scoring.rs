//! Scoring policies for the built-in game modes.
//!
//! Every policy is a plain value with a `Default` matching the shipped game
//! balance; strategies hold one by value so tests and callers can override it.
//! All policies return 0 for an answer that was not correct.

use crate::model::RoundContext;

/// Bonus paid once the streak reaches `threshold`, growing by `step` per extra answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakBonus {
    pub threshold: u32,
    pub base: u32,
    pub step: u32,
}

impl StreakBonus {
    #[must_use]
    pub fn for_streak(&self, streak: u32) -> f64 {
        if streak < self.threshold {
            return 0.0;
        }
        f64::from(self.base) + f64::from(self.step) * f64::from(streak - self.threshold)
    }
}

/// Fixed-rounds ("classical") scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassicScoring {
    pub base: u32,
    pub time_penalty_scale: u32,
    pub hint_cost: u32,
    pub streak: StreakBonus,
}

impl Default for ClassicScoring {
    fn default() -> Self {
        Self {
            base: 1000,
            time_penalty_scale: 600,
            hint_cost: 100,
            streak: StreakBonus {
                threshold: 3,
                base: 100,
                step: 50,
            },
        }
    }
}

impl ClassicScoring {
    #[must_use]
    pub fn score(&self, ctx: &RoundContext) -> u32 {
        if !ctx.correct {
            return 0;
        }
        let time_penalty = proportional(ctx, f64::from(self.time_penalty_scale));
        let hint_penalty = f64::from(ctx.hint_attempts_used) * f64::from(self.hint_cost);
        let bonus = self.streak.for_streak(ctx.streak);
        clamp_score(f64::from(self.base) - time_penalty - hint_penalty + bonus)
    }
}

/// Survival ("sudden death") scoring: base and penalties grow with the round index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurvivalScoring {
    pub base: u32,
    pub time_penalty_scale: u32,
    pub hint_cost: u32,
    pub round_step: u32,
}

impl Default for SurvivalScoring {
    fn default() -> Self {
        Self {
            base: 1000,
            time_penalty_scale: 600,
            hint_cost: 100,
            round_step: 50,
        }
    }
}

impl SurvivalScoring {
    #[must_use]
    pub fn score(&self, ctx: &RoundContext) -> u32 {
        if !ctx.correct {
            return 0;
        }
        let round_bonus = f64::from(self.round_step) * f64::from(ctx.round_index.saturating_sub(1));
        let base = f64::from(self.base) + round_bonus;
        let time_penalty = proportional(ctx, f64::from(self.time_penalty_scale) + round_bonus);
        let hint_penalty =
            f64::from(ctx.hint_attempts_used) * (f64::from(self.hint_cost) + round_bonus / 3.0);
        clamp_score(base - time_penalty - hint_penalty)
    }
}

/// Total-time ("time trial") scoring: rewards answering each question quickly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeTrialScoring {
    pub base: u32,
    pub per_second: u32,
    pub speed_floor: u32,
    pub hint_cost: u32,
    pub streak: StreakBonus,
}

impl Default for TimeTrialScoring {
    fn default() -> Self {
        Self {
            base: 300,
            per_second: 10,
            speed_floor: 50,
            hint_cost: 50,
            streak: StreakBonus {
                threshold: 3,
                base: 50,
                step: 25,
            },
        }
    }
}

impl TimeTrialScoring {
    #[must_use]
    pub fn score(&self, ctx: &RoundContext) -> u32 {
        if !ctx.correct {
            return 0;
        }
        let speed = (f64::from(self.base) - f64::from(self.per_second) * f64::from(ctx.elapsed()))
            .max(f64::from(self.speed_floor));
        let hint_penalty = f64::from(ctx.hint_attempts_used) * f64::from(self.hint_cost);
        clamp_score(speed - hint_penalty + self.streak.for_streak(ctx.streak))
    }
}

/// Same points for every correct answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatScoring {
    pub points: u32,
}

impl FlatScoring {
    #[must_use]
    pub fn score(&self, ctx: &RoundContext) -> u32 {
        if ctx.correct { self.points } else { 0 }
    }
}

/// `scale` weighted by the fraction of the budget already spent.
fn proportional(ctx: &RoundContext, scale: f64) -> f64 {
    if ctx.time_budget == 0 {
        return 0.0;
    }
    f64::from(ctx.elapsed()) * scale / f64::from(ctx.time_budget)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(raw: f64) -> u32 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    raw.floor().min(f64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correct(time_remaining: u32, time_budget: u32) -> RoundContext {
        RoundContext {
            correct: true,
            time_remaining,
            time_budget,
            round_index: 1,
            ..RoundContext::default()
        }
    }

    #[test]
    fn classic_instant_answer_scores_base() {
        let ctx = correct(60, 60);
        assert_eq!(ClassicScoring::default().score(&ctx), 1000);
    }

    #[test]
    fn classic_applies_time_hint_and_streak() {
        let ctx = RoundContext {
            hint_attempts_used: 1,
            streak: 4,
            ..correct(30, 60)
        };
        // 1000 - 300 - 100 + (100 + 50)
        assert_eq!(ClassicScoring::default().score(&ctx), 750);
    }

    #[test]
    fn classic_streak_below_threshold_pays_nothing() {
        let policy = ClassicScoring::default();
        let two = RoundContext {
            streak: 2,
            ..correct(60, 60)
        };
        let three = RoundContext {
            streak: 3,
            ..correct(60, 60)
        };
        assert_eq!(policy.score(&two), 1000);
        assert_eq!(policy.score(&three), 1100);
    }

    #[test]
    fn classic_never_goes_negative() {
        let ctx = RoundContext {
            hint_attempts_used: 30,
            ..correct(0, 60)
        };
        assert_eq!(ClassicScoring::default().score(&ctx), 0);
    }

    #[test]
    fn survival_escalates_with_round() {
        let policy = SurvivalScoring::default();
        let ctx = RoundContext {
            hint_attempts_used: 1,
            round_index: 2,
            ..correct(20, 30)
        };
        // 1050 - 10 * 650 / 30 - (100 + 50 / 3)
        assert_eq!(policy.score(&ctx), 716);

        let first = correct(30, 30);
        let tenth = RoundContext {
            round_index: 10,
            ..correct(30, 30)
        };
        assert!(policy.score(&tenth) > policy.score(&first));
    }

    #[test]
    fn time_trial_rewards_speed_with_floor() {
        let policy = TimeTrialScoring::default();
        let fast = correct(118, 120);
        let slow = correct(20, 120);
        assert_eq!(policy.score(&fast), 280);
        assert_eq!(policy.score(&slow), 50);
    }

    #[test]
    fn every_policy_returns_zero_when_wrong() {
        let ctx = RoundContext {
            correct: false,
            streak: 9,
            round_index: 5,
            ..correct(60, 60)
        };
        assert_eq!(ClassicScoring::default().score(&ctx), 0);
        assert_eq!(SurvivalScoring::default().score(&ctx), 0);
        assert_eq!(TimeTrialScoring::default().score(&ctx), 0);
        assert_eq!(FlatScoring { points: 250 }.score(&ctx), 0);
    }

    #[test]
    fn zero_budget_means_no_time_penalty() {
        let ctx = correct(0, 0);
        assert_eq!(ClassicScoring::default().score(&ctx), 1000);
    }
}
