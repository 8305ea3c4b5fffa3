use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::GameModeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameRecordError {
    #[error("ended_at is before started_at")]
    InvalidTimeRange,

    #[error("questions answered ({answered}) does not match correct + incorrect ({sum})")]
    CountMismatch { answered: u32, sum: u32 },
}

/// Final result of one session, in the shape the stats sink records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    game_type: GameModeId,
    score: u64,
    questions_answered: u32,
    correct_answers: u32,
    incorrect_answers: u32,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
}

impl GameRecord {
    /// # Errors
    ///
    /// Returns `GameRecordError::InvalidTimeRange` if `ended_at < started_at` and
    /// `GameRecordError::CountMismatch` if the answer counts do not add up.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        game_type: GameModeId,
        score: u64,
        questions_answered: u32,
        correct_answers: u32,
        incorrect_answers: u32,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> Result<Self, GameRecordError> {
        if ended_at < started_at {
            return Err(GameRecordError::InvalidTimeRange);
        }
        let sum = correct_answers.saturating_add(incorrect_answers);
        if sum != questions_answered {
            return Err(GameRecordError::CountMismatch {
                answered: questions_answered,
                sum,
            });
        }
        Ok(Self {
            game_type,
            score,
            questions_answered,
            correct_answers,
            incorrect_answers,
            started_at,
            ended_at,
        })
    }

    #[must_use]
    pub fn game_type(&self) -> GameModeId {
        self.game_type
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn incorrect_answers(&self) -> u32 {
        self.incorrect_answers
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> DateTime<Utc> {
        self.ended_at
    }
}
