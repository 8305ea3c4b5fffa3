//! Shared error types for the services crate.

use quiz_core::model::GameRecordError;
use thiserror::Error;

/// Failure reported by an external collaborator (question, hint or stats service).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("service returned status {0}")]
    Status(u16),
    #[error("credential rejected by service")]
    Unauthorized,
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::Status(status.as_u16())
        } else {
            ProviderError::Unavailable(err.to_string())
        }
    }
}

/// Errors emitted while flushing a finished game to the stats sink.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsError {
    #[error("no credential available to record the game")]
    MissingCredential,
    #[error("game already finalized")]
    AlreadyFinalized,
    #[error("failed to record game: {0}")]
    Flush(#[source] ProviderError),
    #[error(transparent)]
    Record(#[from] GameRecordError),
}

/// Errors emitted while building the HTTP gateway client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayConfigError {
    #[error("invalid gateway URL: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

/// Errors surfaced to callers of `GameSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GameError {
    #[error("failed to fetch question: {0}")]
    Fetch(#[source] ProviderError),
    #[error("failed to check answer: {0}")]
    Validation(#[source] ProviderError),
    #[error("hint budget of {max} exhausted for this round")]
    HintBudgetExhausted { max: u32 },
    #[error("hint request failed: {0}")]
    Hint(#[source] ProviderError),
    #[error("no question is awaiting an answer")]
    NoActiveQuestion,
    #[error("answer is not one of the offered options")]
    UnknownOption,
    #[error("session has ended")]
    SessionEnded,
    #[error(transparent)]
    Stats(#[from] StatsError),
}
