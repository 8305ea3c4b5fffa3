//! Contracts for the collaborators the game engine talks to.

use std::fmt;

use async_trait::async_trait;
use quiz_core::model::{AnswerOption, GameRecord, Question, QuestionId};

use crate::error::ProviderError;
use crate::hints::HintRequest;

/// Verdict returned by the question provider for a submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerVerdict {
    pub correct: bool,
}

/// Source of questions and the authority on answer correctness.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Fetch the next question, optionally restricted to a category.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the provider is unreachable or replies with garbage.
    async fn fetch_question(&self, category: Option<&str>) -> Result<Question, ProviderError>;

    /// Ask the provider whether `choice` answers `question_id`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the check could not be performed.
    async fn submit_answer(
        &self,
        question_id: &QuestionId,
        choice: &AnswerOption,
    ) -> Result<AnswerVerdict, ProviderError>;
}

/// Source of clues for the current question.
#[async_trait]
pub trait HintProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `ProviderError` if no hint could be produced.
    async fn request_hint(&self, request: &HintRequest) -> Result<String, ProviderError>;
}

/// Destination for finished games.
#[async_trait]
pub trait StatsSink: Send + Sync {
    /// # Errors
    ///
    /// Returns `ProviderError::Unauthorized` when the credential is rejected and
    /// other variants for transport failures.
    async fn record_game(
        &self,
        record: &GameRecord,
        credential: &Credential,
    ) -> Result<(), ProviderError>;
}

/// Supplies the player's auth credential, if they are signed in.
pub trait CredentialProvider: Send + Sync {
    fn credential(&self) -> Option<Credential>;
}

/// Bearer token for the stats sink. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_is_redacted() {
        let credential = Credential::new("secret-token");
        assert_eq!(format!("{credential:?}"), "Credential(<redacted>)");
        assert_eq!(credential.token(), "secret-token");
    }
}
