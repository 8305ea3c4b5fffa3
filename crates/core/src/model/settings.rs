use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModeConfigError {
    #[error("custom setting `{field}` must be a positive integer, got {value}")]
    NotPositive { field: &'static str, value: i64 },

    #[error("custom setting `{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },
}

/// Validated budgets for the user-configured mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomModeSettings {
    rounds: NonZeroU32,
    time_per_question: NonZeroU32,
    hint_budget: NonZeroU32,
}

impl CustomModeSettings {
    pub const DEFAULT_ROUNDS: u32 = 10;
    pub const DEFAULT_TIME_PER_QUESTION: u32 = 30;
    pub const DEFAULT_HINT_BUDGET: u32 = 3;

    #[must_use]
    pub fn rounds(&self) -> u32 {
        self.rounds.get()
    }

    #[must_use]
    pub fn time_per_question(&self) -> u32 {
        self.time_per_question.get()
    }

    #[must_use]
    pub fn hint_budget(&self) -> u32 {
        self.hint_budget.get()
    }
}

impl Default for CustomModeSettings {
    fn default() -> Self {
        Self {
            rounds: default_value(Self::DEFAULT_ROUNDS),
            time_per_question: default_value(Self::DEFAULT_TIME_PER_QUESTION),
            hint_budget: default_value(Self::DEFAULT_HINT_BUDGET),
        }
    }
}

/// Custom-mode settings as supplied by an external settings source.
///
/// Fields are raw integers because the source does not guarantee validity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomModeDraft {
    pub rounds: Option<i64>,
    pub time_per_question: Option<i64>,
    pub hint_budget: Option<i64>,
}

impl CustomModeDraft {
    #[must_use]
    pub fn new(rounds: i64, time_per_question: i64, hint_budget: i64) -> Self {
        Self {
            rounds: Some(rounds),
            time_per_question: Some(time_per_question),
            hint_budget: Some(hint_budget),
        }
    }

    /// Strict validation: every supplied field must be a positive integer.
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the first `ModeConfigError` encountered.
    pub fn validate(self) -> Result<CustomModeSettings, ModeConfigError> {
        let defaults = CustomModeSettings::default();
        Ok(CustomModeSettings {
            rounds: positive("rounds", self.rounds, defaults.rounds)?,
            time_per_question: positive(
                "time_per_question",
                self.time_per_question,
                defaults.time_per_question,
            )?,
            hint_budget: positive("hint_budget", self.hint_budget, defaults.hint_budget)?,
        })
    }

    /// Lenient validation: each invalid field falls back to its default.
    #[must_use]
    pub fn resolve(self) -> CustomModeSettings {
        let defaults = CustomModeSettings::default();
        let pick = |field, value, default| {
            positive(field, value, default).unwrap_or_else(|err| {
                warn!(error = %err, "invalid custom mode setting, using default");
                default
            })
        };
        CustomModeSettings {
            rounds: pick("rounds", self.rounds, defaults.rounds),
            time_per_question: pick(
                "time_per_question",
                self.time_per_question,
                defaults.time_per_question,
            ),
            hint_budget: pick("hint_budget", self.hint_budget, defaults.hint_budget),
        }
    }
}

fn positive(
    field: &'static str,
    value: Option<i64>,
    default: NonZeroU32,
) -> Result<NonZeroU32, ModeConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    if value <= 0 {
        return Err(ModeConfigError::NotPositive { field, value });
    }
    u32::try_from(value)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or(ModeConfigError::OutOfRange { field, value })
}

fn default_value(v: u32) -> NonZeroU32 {
    NonZeroU32::new(v).unwrap_or(NonZeroU32::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_uses_defaults() {
        let settings = CustomModeDraft::default().validate().unwrap();
        assert_eq!(settings.rounds(), 10);
        assert_eq!(settings.time_per_question(), 30);
        assert_eq!(settings.hint_budget(), 3);
    }

    #[test]
    fn supplied_values_override_defaults() {
        let settings = CustomModeDraft::new(5, 20, 2).validate().unwrap();
        assert_eq!(settings.rounds(), 5);
        assert_eq!(settings.time_per_question(), 20);
        assert_eq!(settings.hint_budget(), 2);
    }

    #[test]
    fn strict_validation_rejects_non_positive() {
        let err = CustomModeDraft::new(0, 20, 2).validate().unwrap_err();
        assert_eq!(
            err,
            ModeConfigError::NotPositive {
                field: "rounds",
                value: 0
            }
        );
        let err = CustomModeDraft::new(3, 20, i64::MAX).validate().unwrap_err();
        assert!(matches!(
            err,
            ModeConfigError::OutOfRange {
                field: "hint_budget",
                ..
            }
        ));
    }

    #[test]
    fn lenient_resolution_replaces_only_bad_fields() {
        let settings = CustomModeDraft::new(-4, 15, 0).resolve();
        assert_eq!(settings.rounds(), 10);
        assert_eq!(settings.time_per_question(), 15);
        assert_eq!(settings.hint_budget(), 3);
    }

    #[test]
    fn draft_deserializes_from_settings_json() {
        let draft: CustomModeDraft =
            serde_json::from_str(r#"{"rounds":7,"timePerQuestion":45}"#).unwrap();
        assert_eq!(draft.rounds, Some(7));
        assert_eq!(draft.time_per_question, Some(45));
        assert_eq!(draft.hint_budget, None);
    }
}
