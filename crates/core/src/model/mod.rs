mod ids;
mod mode;
mod question;
mod record;
mod round;
pub mod scoring;
mod settings;

pub use ids::{QuestionId, SessionId};
pub use mode::{GameModeId, ModeSelection, ModeStrategy, TimingMode};
pub use question::{AnswerOption, Question, QuestionError};
pub use record::{GameRecord, GameRecordError};
pub use round::{RoundContext, RoundLimit, RoundOutcome, RoundTracker};
pub use settings::{CustomModeDraft, CustomModeSettings, ModeConfigError};
