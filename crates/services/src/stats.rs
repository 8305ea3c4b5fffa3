use chrono::{DateTime, Utc};
use quiz_core::Clock;
use quiz_core::model::{GameModeId, GameRecord};
use tracing::{info, warn};

use crate::error::StatsError;
use crate::providers::{CredentialProvider, StatsSink};

/// Per-session answer counters plus the one-shot flush to the stats sink.
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    clock: Clock,
    game_type: GameModeId,
    score: u64,
    questions_answered: u32,
    correct_answers: u32,
    incorrect_answers: u32,
    started_at: DateTime<Utc>,
    finalized: Option<GameRecord>,
}

impl StatsAccumulator {
    #[must_use]
    pub fn new(game_type: GameModeId, clock: Clock) -> Self {
        Self {
            clock,
            game_type,
            score: 0,
            questions_answered: 0,
            correct_answers: 0,
            incorrect_answers: 0,
            started_at: clock.now(),
            finalized: None,
        }
    }

    /// Clear all counters and stamp a fresh start time.
    pub fn new_session(&mut self, game_type: GameModeId) {
        *self = Self::new(game_type, self.clock);
    }

    pub fn record_correct(&mut self, score: u32) {
        self.correct_answers = self.correct_answers.saturating_add(1);
        self.questions_answered = self.questions_answered.saturating_add(1);
        self.score = self.score.saturating_add(u64::from(score));
    }

    pub fn record_incorrect(&mut self) {
        self.incorrect_answers = self.incorrect_answers.saturating_add(1);
        self.questions_answered = self.questions_answered.saturating_add(1);
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

    /// The record produced by the last `finalize`, whether or not its flush succeeded.
    #[must_use]
    pub fn finalized(&self) -> Option<&GameRecord> {
        self.finalized.as_ref()
    }

    /// Stamp the end time, keep the resulting record, and send it to `sink`.
    ///
    /// The record is retained even when flushing fails.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::AlreadyFinalized` on a second call for the same session,
    /// `StatsError::MissingCredential` when no credential is available, and
    /// `StatsError::Flush` when the sink rejects or cannot receive the record.
    pub async fn finalize(
        &mut self,
        sink: &dyn StatsSink,
        credentials: &dyn CredentialProvider,
    ) -> Result<GameRecord, StatsError> {
        if self.finalized.is_some() {
            return Err(StatsError::AlreadyFinalized);
        }

        let ended_at = self.clock.now().max(self.started_at);
        let record = GameRecord::from_parts(
            self.game_type,
            self.score,
            self.questions_answered,
            self.correct_answers,
            self.incorrect_answers,
            self.started_at,
            ended_at,
        )?;
        self.finalized = Some(record.clone());

        let Some(credential) = credentials.credential() else {
            warn!(game_type = %self.game_type, "no credential, game not recorded");
            return Err(StatsError::MissingCredential);
        };

        sink.record_game(&record, &credential).await.map_err(|err| {
            warn!(game_type = %self.game_type, error = %err, "failed to record game");
            StatsError::Flush(err)
        })?;

        info!(
            game_type = %self.game_type,
            score = record.score(),
            answered = record.questions_answered(),
            "game recorded"
        );
        Ok(record)
    }
}
