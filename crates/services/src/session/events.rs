use quiz_core::model::{AnswerOption, Question};

use crate::error::ProviderError;
use crate::providers::AnswerVerdict;

/// Identifies the session epoch and round an asynchronous completion belongs to.
///
/// The epoch changes on every restart or mode switch, the round on every
/// resolution, so a ticket from an earlier round or session never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoundTicket {
    pub epoch: u64,
    pub round: u32,
}

/// Completions delivered back to `GameSession::handle_event`.
#[derive(Debug)]
pub enum SessionEvent {
    QuestionFetched {
        ticket: RoundTicket,
        result: Result<Question, ProviderError>,
    },
    AnswerChecked {
        ticket: RoundTicket,
        choice: AnswerOption,
        result: Result<AnswerVerdict, ProviderError>,
    },
    HintReceived {
        ticket: RoundTicket,
        message: String,
        result: Result<String, ProviderError>,
    },
    ClockExpired {
        ticket: RoundTicket,
    },
    TransitionElapsed {
        ticket: RoundTicket,
    },
}

impl SessionEvent {
    #[must_use]
    pub fn ticket(&self) -> RoundTicket {
        match self {
            SessionEvent::QuestionFetched { ticket, .. }
            | SessionEvent::AnswerChecked { ticket, .. }
            | SessionEvent::HintReceived { ticket, .. }
            | SessionEvent::ClockExpired { ticket }
            | SessionEvent::TransitionElapsed { ticket } => *ticket,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::QuestionFetched { .. } => "question_fetched",
            SessionEvent::AnswerChecked { .. } => "answer_checked",
            SessionEvent::HintReceived { .. } => "hint_received",
            SessionEvent::ClockExpired { .. } => "clock_expired",
            SessionEvent::TransitionElapsed { .. } => "transition_elapsed",
        }
    }
}
