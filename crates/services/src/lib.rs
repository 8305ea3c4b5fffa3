#![forbid(unsafe_code)]

pub mod error;
pub mod gateway;
pub mod hints;
pub mod providers;
pub mod session;
pub mod stats;
pub mod timer;

pub use quiz_core::Clock;

pub use error::{GameError, GatewayConfigError, ProviderError, StatsError};
pub use gateway::{GatewayClient, GatewayConfig};
pub use hints::{HintExchange, HintRequest};
pub use providers::{
    AnswerVerdict, Credential, CredentialProvider, HintProvider, QuestionProvider, StatsSink,
};
pub use session::{
    GameSession, Phase, RoundResolution, RoundTicket, SessionConfig, SessionDeps, SessionEvent,
    SessionSnapshot, SessionUpdate,
};
pub use stats::StatsAccumulator;
pub use timer::RoundTimer;
