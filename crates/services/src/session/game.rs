use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use quiz_core::Clock;
use quiz_core::model::{
    AnswerOption, GameRecord, ModeSelection, ModeStrategy, Question, RoundContext, RoundOutcome,
    RoundTracker, SessionId, TimingMode,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::events::{RoundTicket, SessionEvent};
use super::state::{Phase, RoundResolution, SessionSnapshot, SessionUpdate};
use crate::error::GameError;
use crate::hints::{HintExchange, HintRequest};
use crate::providers::{CredentialProvider, HintProvider, QuestionProvider, StatsSink};
use crate::stats::StatsAccumulator;
use crate::timer::RoundTimer;

/// External collaborators a session talks to.
#[derive(Clone)]
pub struct SessionDeps {
    pub questions: Arc<dyn QuestionProvider>,
    pub hints: Arc<dyn HintProvider>,
    pub stats: Arc<dyn StatsSink>,
    pub credentials: Arc<dyn CredentialProvider>,
}

/// Tunables that are not part of a game mode.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub category: Option<String>,
    /// Pause between a resolved round and the next fetch, for result feedback.
    pub transition_delay: Duration,
    pub clock: Clock,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            category: None,
            transition_delay: Duration::from_secs(2),
            clock: Clock::System,
        }
    }
}

/// Drives one play-through: fetch, await answer or timeout, score, advance.
///
/// User actions (`start`, `select_answer`, `request_hint`, ...) validate the
/// current phase and spawn any network work; they never wait on it. Every
/// completion, including clock expiry and the between-rounds delay, comes
/// back as a [`SessionEvent`] on the channel returned by [`GameSession::new`]
/// and must be passed to [`GameSession::handle_event`]. Events whose ticket
/// or phase no longer match are dropped, so exactly one of answer and timeout
/// resolves a round, and nothing from before a restart leaks into the next
/// session.
///
/// Must be used from within a tokio runtime.
pub struct GameSession {
    id: SessionId,
    deps: SessionDeps,
    config: SessionConfig,
    strategy: ModeStrategy,
    events: mpsc::UnboundedSender<SessionEvent>,
    timer: RoundTimer,
    rounds: RoundTracker,
    stats: StatsAccumulator,
    epoch: u64,
    phase: Phase,
    question: Option<Question>,
    outcome: RoundOutcome,
    hint_attempts_used: u32,
    hints: Vec<HintExchange>,
    streak: u32,
    // Clock reading when the current question appeared.
    round_clock_start: u32,
    last_resolution: Option<RoundResolution>,
}

impl GameSession {
    #[must_use]
    pub fn new(
        deps: SessionDeps,
        config: SessionConfig,
        selection: ModeSelection,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let strategy = ModeStrategy::select(selection);
        let session = Self {
            id: SessionId::random(),
            timer: RoundTimer::new(strategy.clock_budget()),
            rounds: RoundTracker::new(strategy.max_rounds()),
            stats: StatsAccumulator::new(strategy.id(), config.clock),
            round_clock_start: strategy.clock_budget(),
            deps,
            config,
            strategy,
            events,
            epoch: 0,
            phase: Phase::Idle,
            question: None,
            outcome: RoundOutcome::Pending,
            hint_attempts_used: 0,
            hints: Vec::new(),
            streak: 0,
            last_resolution: None,
        };
        (session, receiver)
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn strategy(&self) -> &ModeStrategy {
        &self.strategy
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn rounds(&self) -> &RoundTracker {
        &self.rounds
    }

    #[must_use]
    pub fn stats(&self) -> &StatsAccumulator {
        &self.stats
    }

    #[must_use]
    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    #[must_use]
    pub fn outcome(&self) -> RoundOutcome {
        self.outcome
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn hint_attempts_used(&self) -> u32 {
        self.hint_attempts_used
    }

    /// Hint exchanges for the current round.
    #[must_use]
    pub fn hints(&self) -> &[HintExchange] {
        &self.hints
    }

    #[must_use]
    pub fn last_resolution(&self) -> Option<&RoundResolution> {
        self.last_resolution.as_ref()
    }

    /// The finished game's record, kept even if flushing it failed.
    #[must_use]
    pub fn final_record(&self) -> Option<&GameRecord> {
        self.stats.finalized()
    }

    #[must_use]
    pub fn time_left(&self) -> u32 {
        self.timer.time_left()
    }

    /// Ticket that completions for the current round must carry.
    #[must_use]
    pub fn ticket(&self) -> RoundTicket {
        RoundTicket {
            epoch: self.epoch,
            round: self.rounds.current(),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let max_hints = self.strategy.max_hint_attempts();
        SessionSnapshot {
            session_id: self.id,
            mode: self.strategy.id(),
            phase: self.phase,
            round: self.rounds.current(),
            max_rounds: self.rounds.limit().get(),
            time_left: self.timer.time_left(),
            clock_running: self.timer.is_running(),
            score: self.stats.score(),
            streak: self.streak,
            hints_used: self.hint_attempts_used,
            hints_remaining: max_hints.saturating_sub(self.hint_attempts_used),
            outcome: self.outcome,
            question: self.question.clone(),
        }
    }

    /// Begin the session and fetch the first question. No-op unless idle.
    ///
    /// # Errors
    ///
    /// Returns `GameError::SessionEnded` if the session already finished.
    pub fn start(&mut self) -> Result<(), GameError> {
        match self.phase {
            Phase::Idle => {}
            Phase::Ended => return Err(GameError::SessionEnded),
            _ => return Ok(()),
        }
        self.stats.new_session(self.strategy.id());
        self.timer.reset(Some(self.strategy.clock_budget()));
        info!(
            session.id = %self.id,
            mode = %self.strategy.id(),
            max_rounds = ?self.rounds.limit().get(),
            "session started"
        );
        self.begin_loading();
        Ok(())
    }

    /// Discard all progress and start over in the current mode.
    ///
    /// Completions still in flight from the previous session are ignored.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`GameSession::start`].
    pub fn restart(&mut self) -> Result<(), GameError> {
        self.reset_state();
        self.start()
    }

    /// Discard all progress and start over in a different mode.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`GameSession::start`].
    pub fn switch_mode(&mut self, selection: ModeSelection) -> Result<(), GameError> {
        self.strategy = ModeStrategy::select(selection);
        self.restart()
    }

    /// Re-trigger loading after a failed fetch, or skip the rest of the
    /// between-rounds delay.
    ///
    /// # Errors
    ///
    /// Returns `GameError::SessionEnded` after the game finished.
    pub fn load_question(&mut self) -> Result<(), GameError> {
        match self.phase {
            Phase::FetchFailed | Phase::RoundTransition => {
                self.begin_loading();
                Ok(())
            }
            Phase::Idle => self.start(),
            Phase::Ended => Err(GameError::SessionEnded),
            Phase::Loading | Phase::AwaitingAnswer | Phase::Validating => Ok(()),
        }
    }

    /// Submit the player's choice for checking. Ignored once the round is
    /// already being resolved.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoActiveQuestion` if no question is on screen,
    /// `GameError::UnknownOption` if `choice` is not one of its options, and
    /// `GameError::SessionEnded` after the game finished.
    pub fn select_answer(&mut self, choice: AnswerOption) -> Result<(), GameError> {
        match self.phase {
            Phase::AwaitingAnswer => {}
            Phase::Validating | Phase::RoundTransition => {
                debug!(session.id = %self.id, phase = ?self.phase, "answer ignored");
                return Ok(());
            }
            Phase::Ended => return Err(GameError::SessionEnded),
            Phase::Idle | Phase::Loading | Phase::FetchFailed => {
                return Err(GameError::NoActiveQuestion);
            }
        }
        let Some(question) = self.question.as_ref() else {
            return Err(GameError::NoActiveQuestion);
        };
        if !question.has_option(&choice) {
            return Err(GameError::UnknownOption);
        }

        self.timer.pause();
        self.phase = Phase::Validating;

        let ticket = self.ticket();
        let question_id = question.id().clone();
        let questions = Arc::clone(&self.deps.questions);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = questions.submit_answer(&question_id, &choice).await;
            let _ = events.send(SessionEvent::AnswerChecked {
                ticket,
                choice,
                result,
            });
        });
        Ok(())
    }

    /// Ask the hint provider for a clue. Does not touch the clock.
    ///
    /// # Errors
    ///
    /// Returns `GameError::HintBudgetExhausted` without contacting the provider
    /// once this round's hints are used up, and `GameError::NoActiveQuestion`
    /// when no question is awaiting an answer, including after one was submitted.
    pub fn request_hint(&mut self, message: impl Into<String>) -> Result<(), GameError> {
        match self.phase {
            Phase::AwaitingAnswer => {}
            Phase::Ended => return Err(GameError::SessionEnded),
            _ => return Err(GameError::NoActiveQuestion),
        }
        let Some(question) = self.question.as_ref() else {
            return Err(GameError::NoActiveQuestion);
        };
        let max = self.strategy.max_hint_attempts();
        if self.hint_attempts_used >= max {
            return Err(GameError::HintBudgetExhausted { max });
        }
        self.hint_attempts_used += 1;

        let request = HintRequest::new(question, message);
        let ticket = self.ticket();
        let hints = Arc::clone(&self.deps.hints);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = hints.request_hint(&request).await;
            let _ = events.send(SessionEvent::HintReceived {
                ticket,
                message: request.user_message().to_owned(),
                result,
            });
        });
        Ok(())
    }

    /// Apply one completion. Returns `Ok(None)` for events that no longer apply.
    ///
    /// # Errors
    ///
    /// Surfaces `Fetch`, `Validation` and `Hint` failures from the providers and
    /// `Stats` failures from the final flush. The session stays consistent in
    /// every case: a failed fetch can be retried, a failed check leaves the
    /// round pending, and a failed flush leaves the game ended.
    pub async fn handle_event(
        &mut self,
        event: SessionEvent,
    ) -> Result<Option<SessionUpdate>, GameError> {
        if event.ticket() != self.ticket() {
            debug!(
                session.id = %self.id,
                event = event.kind(),
                ticket = ?event.ticket(),
                current = ?self.ticket(),
                "stale event dropped"
            );
            return Ok(None);
        }

        match event {
            SessionEvent::QuestionFetched { result, .. } => self.on_question_fetched(result),
            SessionEvent::AnswerChecked { result, choice, .. } => match result {
                Ok(verdict) if self.phase == Phase::Validating => {
                    debug!(
                        session.id = %self.id,
                        choice = choice.as_str(),
                        correct = verdict.correct,
                        "answer checked"
                    );
                    let outcome = if verdict.correct {
                        RoundOutcome::Correct
                    } else {
                        RoundOutcome::Incorrect
                    };
                    self.resolve(outcome).await
                }
                Err(err) if self.phase == Phase::Validating => {
                    warn!(session.id = %self.id, error = %err, "answer check failed");
                    // The expiry raced the submission and was ignored while validating.
                    if self.timer.time_left() == 0 {
                        return self.resolve(RoundOutcome::TimedOut).await;
                    }
                    self.phase = Phase::AwaitingAnswer;
                    self.timer.start();
                    Err(GameError::Validation(err))
                }
                _ => Ok(None),
            },
            SessionEvent::ClockExpired { .. } if self.phase == Phase::AwaitingAnswer => {
                self.resolve(RoundOutcome::TimedOut).await
            }
            SessionEvent::TransitionElapsed { .. } if self.phase == Phase::RoundTransition => {
                self.begin_loading();
                Ok(Some(SessionUpdate::NextRoundLoading {
                    round: self.rounds.current(),
                }))
            }
            SessionEvent::HintReceived {
                message, result, ..
            } if !self.phase.is_ended() => match result {
                Ok(reply) => {
                    let exchange = HintExchange { message, reply };
                    self.hints.push(exchange.clone());
                    Ok(Some(SessionUpdate::HintReady(exchange)))
                }
                Err(err) => {
                    warn!(session.id = %self.id, error = %err, "hint request failed");
                    Err(GameError::Hint(err))
                }
            },
            other => {
                debug!(session.id = %self.id, event = other.kind(), phase = ?self.phase, "event ignored in phase");
                Ok(None)
            }
        }
    }

    /// Wait for the next event that produces an update or an error.
    ///
    /// Returns `None` only when the channel is closed.
    pub async fn next_update(
        &mut self,
        events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    ) -> Option<Result<SessionUpdate, GameError>> {
        while let Some(event) = events.recv().await {
            match self.handle_event(event).await {
                Ok(Some(update)) => return Some(Ok(update)),
                Ok(None) => {}
                Err(err) => return Some(Err(err)),
            }
        }
        None
    }

    fn reset_state(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.id = SessionId::random();
        self.timer.clear_on_expire();
        self.timer.reset(Some(self.strategy.clock_budget()));
        self.rounds = RoundTracker::new(self.strategy.max_rounds());
        self.stats.new_session(self.strategy.id());
        self.phase = Phase::Idle;
        self.question = None;
        self.outcome = RoundOutcome::Pending;
        self.hint_attempts_used = 0;
        self.hints.clear();
        self.streak = 0;
        self.round_clock_start = self.strategy.clock_budget();
        self.last_resolution = None;
    }

    fn begin_loading(&mut self) {
        self.timer.pause();
        self.phase = Phase::Loading;
        self.question = None;
        self.outcome = RoundOutcome::Pending;
        self.hint_attempts_used = 0;
        self.hints.clear();

        let ticket = self.ticket();
        let questions = Arc::clone(&self.deps.questions);
        let category = self.config.category.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = questions.fetch_question(category.as_deref()).await;
            let _ = events.send(SessionEvent::QuestionFetched { ticket, result });
        });
    }

    fn on_question_fetched(
        &mut self,
        result: Result<Question, crate::error::ProviderError>,
    ) -> Result<Option<SessionUpdate>, GameError> {
        if self.phase != Phase::Loading {
            return Ok(None);
        }
        match result {
            Ok(question) => {
                let round = self.rounds.current();
                info!(session.id = %self.id, round, question.id = %question.id(), "question loaded");
                self.question = Some(question.clone());
                self.phase = Phase::AwaitingAnswer;
                self.arm_clock();
                Ok(Some(SessionUpdate::QuestionReady { round, question }))
            }
            Err(err) => {
                warn!(session.id = %self.id, error = %err, "question fetch failed");
                self.phase = Phase::FetchFailed;
                Err(GameError::Fetch(err))
            }
        }
    }

    fn arm_clock(&mut self) {
        let ticket = self.ticket();
        let events = self.events.clone();
        self.timer.set_on_expire(move || {
            let _ = events.send(SessionEvent::ClockExpired { ticket });
        });
        if self.strategy.timing_mode() == TimingMode::PerQuestion {
            self.timer.reset(Some(self.strategy.clock_budget()));
        }
        self.round_clock_start = self.timer.time_left();
        self.timer.start();
    }

    async fn resolve(
        &mut self,
        outcome: RoundOutcome,
    ) -> Result<Option<SessionUpdate>, GameError> {
        self.timer.pause();
        self.outcome = outcome;

        let correct = outcome.is_correct();
        self.streak = if correct { self.streak.saturating_add(1) } else { 0 };
        let ctx = RoundContext {
            correct,
            time_remaining: self.timer.time_left(),
            time_budget: self.round_clock_start,
            hint_attempts_used: self.hint_attempts_used,
            streak: self.streak,
            round_index: self.rounds.current(),
        };
        let score = self.strategy.score_round(&ctx);
        if correct {
            self.stats.record_correct(score);
        } else {
            self.stats.record_incorrect();
        }

        let session_clock_out =
            self.strategy.timing_mode() == TimingMode::PerSession && outcome == RoundOutcome::TimedOut;
        let continues = !self.rounds.is_exhausted()
            && !session_clock_out
            && self.strategy.should_continue(&ctx);

        self.hint_attempts_used = 0;
        self.rounds.next();

        let resolution = RoundResolution {
            round: ctx.round_index,
            outcome,
            score,
            total_score: self.stats.score(),
            streak: self.streak,
            continues,
        };
        self.last_resolution = Some(resolution.clone());
        info!(
            session.id = %self.id,
            round = resolution.round,
            outcome = ?outcome,
            score,
            total = resolution.total_score,
            continues,
            "round resolved"
        );

        if continues {
            self.phase = Phase::RoundTransition;
            self.schedule_transition();
            return Ok(Some(SessionUpdate::RoundResolved(resolution)));
        }
        self.end_game(resolution).await
    }

    fn schedule_transition(&self) {
        let ticket = self.ticket();
        let delay = self.config.transition_delay;
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(SessionEvent::TransitionElapsed { ticket });
        });
    }

    async fn end_game(
        &mut self,
        resolution: RoundResolution,
    ) -> Result<Option<SessionUpdate>, GameError> {
        self.phase = Phase::Ended;
        self.timer.pause();
        self.timer.clear_on_expire();
        info!(
            session.id = %self.id,
            score = self.stats.score(),
            answered = self.stats.questions_answered(),
            "game ended"
        );

        let record = self
            .stats
            .finalize(self.deps.stats.as_ref(), self.deps.credentials.as_ref())
            .await?;
        Ok(Some(SessionUpdate::GameEnded { resolution, record }))
    }
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("mode", &self.strategy.id())
            .field("epoch", &self.epoch)
            .field("phase", &self.phase)
            .field("round", &self.rounds.current())
            .field("outcome", &self.outcome)
            .field("streak", &self.streak)
            .field("hint_attempts_used", &self.hint_attempts_used)
            .finish_non_exhaustive()
    }
}
