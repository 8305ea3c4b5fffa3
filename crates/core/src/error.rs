use thiserror::Error;

use crate::model::{GameRecordError, ModeConfigError, QuestionError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    ModeConfig(#[from] ModeConfigError),
    #[error(transparent)]
    Record(#[from] GameRecordError),
}
