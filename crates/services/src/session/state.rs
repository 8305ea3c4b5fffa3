use quiz_core::model::{GameModeId, GameRecord, Question, RoundOutcome, SessionId};

use crate::hints::HintExchange;

/// Where the session is in its round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created or reset, not yet started.
    Idle,
    /// A question fetch is in flight.
    Loading,
    /// The last fetch failed; the caller may retry with `load_question`.
    FetchFailed,
    AwaitingAnswer,
    /// An answer was submitted and is being checked.
    Validating,
    /// Showing the round result before the next question.
    RoundTransition,
    Ended,
}

impl Phase {
    #[must_use]
    pub fn is_ended(self) -> bool {
        matches!(self, Phase::Ended)
    }
}

/// Outcome of one resolved round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResolution {
    pub round: u32,
    pub outcome: RoundOutcome,
    pub score: u32,
    pub total_score: u64,
    pub streak: u32,
    pub continues: bool,
}

/// What changed as a result of handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    QuestionReady { round: u32, question: Question },
    RoundResolved(RoundResolution),
    NextRoundLoading { round: u32 },
    HintReady(HintExchange),
    GameEnded {
        resolution: RoundResolution,
        record: GameRecord,
    },
}

/// Read-only view of the session for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub mode: GameModeId,
    pub phase: Phase,
    pub round: u32,
    pub max_rounds: Option<u32>,
    pub time_left: u32,
    pub clock_running: bool,
    pub score: u64,
    pub streak: u32,
    pub hints_used: u32,
    pub hints_remaining: u32,
    pub outcome: RoundOutcome,
    pub question: Option<Question>,
}
