use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::scoring::{ClassicScoring, FlatScoring, SurvivalScoring, TimeTrialScoring};
use crate::model::{CustomModeDraft, CustomModeSettings, ModeConfigError, RoundContext, RoundLimit};

/// Game mode identifiers, serialized with the names the stats service stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameModeId {
    #[serde(rename = "classical")]
    FixedRounds,
    #[serde(rename = "suddenDeath")]
    Survival,
    #[serde(rename = "timeTrial")]
    TotalTime,
    #[serde(rename = "qod")]
    DailyQuestion,
    #[serde(rename = "custom")]
    Custom,
}

impl GameModeId {
    pub const ALL: [GameModeId; 5] = [
        GameModeId::FixedRounds,
        GameModeId::Survival,
        GameModeId::TotalTime,
        GameModeId::DailyQuestion,
        GameModeId::Custom,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GameModeId::FixedRounds => "classical",
            GameModeId::Survival => "suddenDeath",
            GameModeId::TotalTime => "timeTrial",
            GameModeId::DailyQuestion => "qod",
            GameModeId::Custom => "custom",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            GameModeId::FixedRounds => "Classical",
            GameModeId::Survival => "Sudden Death",
            GameModeId::TotalTime => "Time Trial",
            GameModeId::DailyQuestion => "Question of the Day",
            GameModeId::Custom => "Custom",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            GameModeId::FixedRounds => "10 rounds, 60 seconds per question",
            GameModeId::Survival => "30 seconds per question, one mistake ends the game",
            GameModeId::TotalTime => "2 minutes to answer as many as possible",
            GameModeId::DailyQuestion => "1 question, 30 seconds to answer",
            GameModeId::Custom => "Your own rounds, time and hints",
        }
    }
}

impl fmt::Display for GameModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameModeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameModeId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown game mode: {s}"))
    }
}

/// Whether the clock restarts for every question or runs once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingMode {
    PerQuestion,
    PerSession,
}

/// What the player picked on the mode screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSelection {
    FixedRounds,
    Survival,
    TotalTime,
    DailyQuestion,
    Custom(CustomModeDraft),
}

impl ModeSelection {
    #[must_use]
    pub fn id(&self) -> GameModeId {
        match self {
            ModeSelection::FixedRounds => GameModeId::FixedRounds,
            ModeSelection::Survival => GameModeId::Survival,
            ModeSelection::TotalTime => GameModeId::TotalTime,
            ModeSelection::DailyQuestion => GameModeId::DailyQuestion,
            ModeSelection::Custom(_) => GameModeId::Custom,
        }
    }
}

/// Timing, budgets and scoring for one game mode.
///
/// Every method is a pure function of the variant's data and its arguments,
/// so a strategy can be shared freely between rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeStrategy {
    FixedRounds {
        time_budget: u32,
        max_rounds: NonZeroU32,
        max_hints: u32,
        scoring: ClassicScoring,
    },
    Survival {
        time_budget: u32,
        max_hints: u32,
        scoring: SurvivalScoring,
    },
    TotalTime {
        session_budget: u32,
        max_hints: u32,
        scoring: TimeTrialScoring,
    },
    DailyQuestion {
        time_budget: u32,
        max_hints: u32,
        scoring: FlatScoring,
    },
    Custom {
        settings: CustomModeSettings,
        scoring: FlatScoring,
    },
}

impl ModeStrategy {
    /// Builds the strategy for a selection. Invalid custom settings fall back
    /// to defaults field by field.
    #[must_use]
    pub fn select(selection: ModeSelection) -> Self {
        match selection {
            ModeSelection::FixedRounds => Self::fixed_rounds(),
            ModeSelection::Survival => Self::survival(),
            ModeSelection::TotalTime => Self::total_time(),
            ModeSelection::DailyQuestion => Self::daily_question(),
            ModeSelection::Custom(draft) => Self::custom(draft.resolve()),
        }
    }

    /// Like [`ModeStrategy::select`] but rejects invalid custom settings.
    ///
    /// # Errors
    ///
    /// Returns `ModeConfigError` when a custom setting is not a positive integer.
    pub fn try_select(selection: ModeSelection) -> Result<Self, ModeConfigError> {
        match selection {
            ModeSelection::Custom(draft) => Ok(Self::custom(draft.validate()?)),
            other => Ok(Self::select(other)),
        }
    }

    #[must_use]
    pub fn fixed_rounds() -> Self {
        Self::FixedRounds {
            time_budget: 60,
            max_rounds: NonZeroU32::new(10).unwrap_or(NonZeroU32::MIN),
            max_hints: 3,
            scoring: ClassicScoring::default(),
        }
    }

    #[must_use]
    pub fn survival() -> Self {
        Self::Survival {
            time_budget: 30,
            max_hints: 3,
            scoring: SurvivalScoring::default(),
        }
    }

    #[must_use]
    pub fn total_time() -> Self {
        Self::TotalTime {
            session_budget: 120,
            max_hints: 3,
            scoring: TimeTrialScoring::default(),
        }
    }

    #[must_use]
    pub fn daily_question() -> Self {
        Self::DailyQuestion {
            time_budget: 30,
            max_hints: 3,
            scoring: FlatScoring { points: 250 },
        }
    }

    #[must_use]
    pub fn custom(settings: CustomModeSettings) -> Self {
        Self::Custom {
            settings,
            scoring: FlatScoring { points: 75 },
        }
    }

    #[must_use]
    pub fn id(&self) -> GameModeId {
        match self {
            ModeStrategy::FixedRounds { .. } => GameModeId::FixedRounds,
            ModeStrategy::Survival { .. } => GameModeId::Survival,
            ModeStrategy::TotalTime { .. } => GameModeId::TotalTime,
            ModeStrategy::DailyQuestion { .. } => GameModeId::DailyQuestion,
            ModeStrategy::Custom { .. } => GameModeId::Custom,
        }
    }

    #[must_use]
    pub fn timing_mode(&self) -> TimingMode {
        match self {
            ModeStrategy::TotalTime { .. } => TimingMode::PerSession,
            _ => TimingMode::PerQuestion,
        }
    }

    /// Per-question budget; `None` for session-clock modes.
    #[must_use]
    pub fn time_budget(&self) -> Option<u32> {
        match self {
            ModeStrategy::FixedRounds { time_budget, .. }
            | ModeStrategy::Survival { time_budget, .. }
            | ModeStrategy::DailyQuestion { time_budget, .. } => Some(*time_budget),
            ModeStrategy::Custom { settings, .. } => Some(settings.time_per_question()),
            ModeStrategy::TotalTime { .. } => None,
        }
    }

    /// Session-wide budget; `None` for per-question modes.
    #[must_use]
    pub fn session_budget(&self) -> Option<u32> {
        match self {
            ModeStrategy::TotalTime { session_budget, .. } => Some(*session_budget),
            _ => None,
        }
    }

    /// Seconds the clock is loaded with at the start of a round (or session).
    #[must_use]
    pub fn clock_budget(&self) -> u32 {
        self.time_budget()
            .or_else(|| self.session_budget())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn max_rounds(&self) -> RoundLimit {
        match self {
            ModeStrategy::FixedRounds { max_rounds, .. } => RoundLimit::Finite(*max_rounds),
            ModeStrategy::DailyQuestion { .. } => RoundLimit::Finite(NonZeroU32::MIN),
            ModeStrategy::Custom { settings, .. } => RoundLimit::finite(settings.rounds()),
            ModeStrategy::Survival { .. } | ModeStrategy::TotalTime { .. } => RoundLimit::Unbounded,
        }
    }

    #[must_use]
    pub fn max_hint_attempts(&self) -> u32 {
        match self {
            ModeStrategy::FixedRounds { max_hints, .. }
            | ModeStrategy::Survival { max_hints, .. }
            | ModeStrategy::TotalTime { max_hints, .. }
            | ModeStrategy::DailyQuestion { max_hints, .. } => *max_hints,
            ModeStrategy::Custom { settings, .. } => settings.hint_budget(),
        }
    }

    /// Points for a resolved round. Always 0 when the answer was not correct.
    #[must_use]
    pub fn score_round(&self, ctx: &RoundContext) -> u32 {
        match self {
            ModeStrategy::FixedRounds { scoring, .. } => scoring.score(ctx),
            ModeStrategy::Survival { scoring, .. } => scoring.score(ctx),
            ModeStrategy::TotalTime { scoring, .. } => scoring.score(ctx),
            ModeStrategy::DailyQuestion { scoring, .. } | ModeStrategy::Custom { scoring, .. } => {
                scoring.score(ctx)
            }
        }
    }

    /// Whether another round should follow the one described by `ctx`.
    #[must_use]
    pub fn should_continue(&self, ctx: &RoundContext) -> bool {
        match self {
            ModeStrategy::FixedRounds { .. }
            | ModeStrategy::DailyQuestion { .. }
            | ModeStrategy::Custom { .. } => self
                .max_rounds()
                .get()
                .is_some_and(|max| ctx.round_index < max),
            ModeStrategy::Survival { .. } => ctx.correct,
            ModeStrategy::TotalTime { .. } => ctx.time_remaining > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(correct: bool, round_index: u32) -> RoundContext {
        RoundContext {
            correct,
            time_remaining: 10,
            time_budget: 60,
            hint_attempts_used: 0,
            streak: if correct { 1 } else { 0 },
            round_index,
        }
    }

    fn all_strategies() -> Vec<ModeStrategy> {
        vec![
            ModeStrategy::fixed_rounds(),
            ModeStrategy::survival(),
            ModeStrategy::total_time(),
            ModeStrategy::daily_question(),
            ModeStrategy::custom(CustomModeSettings::default()),
        ]
    }

    #[test]
    fn wire_names_round_trip() {
        for id in GameModeId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
            assert_eq!(id.as_str().parse::<GameModeId>().unwrap(), id);
        }
        assert!("arcade".parse::<GameModeId>().is_err());
    }

    #[test]
    fn factory_selects_matching_variant() {
        let selections = [
            ModeSelection::FixedRounds,
            ModeSelection::Survival,
            ModeSelection::TotalTime,
            ModeSelection::DailyQuestion,
            ModeSelection::Custom(CustomModeDraft::default()),
        ];
        for selection in selections {
            assert_eq!(ModeStrategy::select(selection).id(), selection.id());
        }
    }

    #[test]
    fn fixed_rounds_stops_after_ten_rounds_regardless_of_answer() {
        let strategy = ModeStrategy::fixed_rounds();
        assert_eq!(strategy.max_rounds().get(), Some(10));
        for round in 1..10 {
            assert!(strategy.should_continue(&ctx(true, round)));
            assert!(strategy.should_continue(&ctx(false, round)));
        }
        assert!(!strategy.should_continue(&ctx(true, 10)));
        assert!(!strategy.should_continue(&ctx(false, 10)));
        assert!(!strategy.should_continue(&ctx(true, 11)));
    }

    #[test]
    fn survival_ends_on_first_miss() {
        let strategy = ModeStrategy::survival();
        assert!(strategy.max_rounds().is_unbounded());
        for round in 1..=50 {
            assert!(strategy.should_continue(&ctx(true, round)));
        }
        for round in [1, 7, 42] {
            assert!(!strategy.should_continue(&ctx(false, round)));
        }
    }

    #[test]
    fn total_time_uses_session_clock() {
        let strategy = ModeStrategy::total_time();
        assert_eq!(strategy.timing_mode(), TimingMode::PerSession);
        assert_eq!(strategy.time_budget(), None);
        assert_eq!(strategy.session_budget(), Some(120));
        assert_eq!(strategy.clock_budget(), 120);
        assert!(strategy.should_continue(&ctx(false, 30)));

        let out_of_time = RoundContext {
            time_remaining: 0,
            ..ctx(true, 3)
        };
        assert!(!strategy.should_continue(&out_of_time));
    }

    #[test]
    fn daily_question_is_a_single_flat_round() {
        let strategy = ModeStrategy::daily_question();
        assert_eq!(strategy.max_rounds().get(), Some(1));
        assert!(!strategy.should_continue(&ctx(true, 1)));
        assert_eq!(strategy.score_round(&ctx(true, 1)), 250);
        assert_eq!(strategy.score_round(&ctx(false, 1)), 0);
    }

    #[test]
    fn custom_mode_uses_supplied_budgets() {
        let strategy = ModeStrategy::select(ModeSelection::Custom(CustomModeDraft::new(5, 20, 2)));
        assert_eq!(strategy.time_budget(), Some(20));
        assert_eq!(strategy.max_rounds().get(), Some(5));
        assert_eq!(strategy.max_hint_attempts(), 2);
        assert!(strategy.should_continue(&ctx(true, 3)));
        assert!(!strategy.should_continue(&ctx(true, 5)));
        assert_eq!(strategy.score_round(&ctx(true, 1)), 75);
    }

    #[test]
    fn custom_mode_falls_back_or_rejects_bad_settings() {
        let draft = CustomModeDraft::new(0, -1, 2);
        let lenient = ModeStrategy::select(ModeSelection::Custom(draft));
        assert_eq!(lenient.max_rounds().get(), Some(10));
        assert_eq!(lenient.time_budget(), Some(30));

        assert!(ModeStrategy::try_select(ModeSelection::Custom(draft)).is_err());
        assert!(ModeStrategy::try_select(ModeSelection::Survival).is_ok());
    }

    #[test]
    fn scores_are_zero_for_wrong_answers_in_every_mode() {
        for strategy in all_strategies() {
            for round in 1..=12 {
                let wrong = RoundContext {
                    hint_attempts_used: round % 4,
                    time_remaining: round,
                    ..ctx(false, round)
                };
                assert_eq!(strategy.score_round(&wrong), 0, "{:?}", strategy.id());
            }
        }
    }
}
