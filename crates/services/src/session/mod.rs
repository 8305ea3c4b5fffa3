mod events;
mod game;
mod state;

// Public API of the session subsystem.
pub use events::{RoundTicket, SessionEvent};
pub use game::{GameSession, SessionConfig, SessionDeps};
pub use state::{Phase, RoundResolution, SessionSnapshot, SessionUpdate};
