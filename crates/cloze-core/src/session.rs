//! Exercise session state machine.
//!
//! `SessionState` owns the card batch, the card pointer, the phase, the
//! filters and every answer. It performs no I/O: fetches are represented by
//! tickets that the caller resolves with [`SessionState::fetch_succeeded`] or
//! [`SessionState::fetch_failed`]. Only the most recently issued ticket is
//! ever applied.

use crate::answers::AnswerStore;
use crate::error::{InvalidCommand, SessionError};
use crate::model::{AnswerKey, Card, Category, Difficulty, Direction, Filters, Phase, Segment};
use crate::traits::{FetchRequest, DEFAULT_CARD_COUNT};

/// Result of applying one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    Ignored(InvalidCommand),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }
}

/// A fetch the session is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    pub request: FetchRequest,
}

impl FetchTicket {
    /// Issue order; later tickets supersede earlier ones.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// The single source of truth for one exercise session.
#[derive(Debug, Clone)]
pub struct SessionState {
    cards: Vec<Card>,
    current_index: usize,
    phase: Phase,
    filters: Filters,
    answers: AnswerStore,
    last_error: Option<SessionError>,
    batch_size: u32,
    issued: u64,
    in_flight: bool,
    version: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Filters::default(), DEFAULT_CARD_COUNT)
    }
}

impl SessionState {
    /// A fresh session in `Loading` with nothing fetched yet.
    pub fn new(filters: Filters, batch_size: u32) -> Self {
        Self {
            cards: Vec::new(),
            current_index: 0,
            phase: Phase::Loading,
            filters,
            answers: AnswerStore::new(),
            last_error: None,
            batch_size: batch_size.max(1),
            issued: 0,
            in_flight: false,
            version: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// `None` while the deck is empty.
    pub fn current_index(&self) -> Option<usize> {
        (!self.cards.is_empty()).then_some(self.current_index)
    }

    pub fn current_card(&self) -> Option<&Card> {
        self.cards.get(self.current_index)
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    /// Whether a fetch has been issued and not yet resolved.
    pub fn is_fetching(&self) -> bool {
        self.in_flight
    }

    /// Bumped on every applied change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Issue the first fetch. Only valid once per session.
    pub fn load_initial(&mut self) -> Result<FetchTicket, InvalidCommand> {
        if self.issued > 0 {
            return Err(InvalidCommand::AlreadyLoaded);
        }
        Ok(self.issue_fetch())
    }

    /// Drop back to `Loading` and issue a fetch with the current filters.
    ///
    /// Accepted from every phase: from `Loading` it supersedes whatever fetch
    /// is outstanding, which is also how a failed load is retried.
    pub fn reload(&mut self) -> FetchTicket {
        self.issue_fetch()
    }

    fn issue_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.in_flight = true;
        // Loading never shows the previous batch, even if this fetch fails.
        self.cards.clear();
        self.answers.reset_all();
        self.current_index = 0;
        self.phase = Phase::Loading;
        self.last_error = None;
        self.touch();
        FetchTicket {
            seq: self.issued,
            request: FetchRequest::new(&self.filters, self.batch_size),
        }
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.in_flight && seq == self.issued
    }

    /// Apply a fetched batch. Stale tickets are ignored; an empty or
    /// malformed batch is rejected as a whole and recorded as the session
    /// error, leaving the session in `Loading`.
    pub fn fetch_succeeded(&mut self, seq: u64, cards: Vec<Card>) -> CommandOutcome {
        if !self.is_latest(seq) {
            return CommandOutcome::Ignored(InvalidCommand::StaleFetch);
        }
        self.in_flight = false;

        if let Err(err) = validate_batch(&cards) {
            self.last_error = Some(err);
            self.touch();
            return CommandOutcome::Applied;
        }

        self.cards = cards;
        self.answers.reset_all();
        self.current_index = 0;
        self.phase = Phase::Answering;
        self.last_error = None;
        self.touch();
        CommandOutcome::Applied
    }

    /// Record a failed fetch. The session stays in `Loading` with no cards.
    pub fn fetch_failed(&mut self, seq: u64, error: SessionError) -> CommandOutcome {
        if !self.is_latest(seq) {
            return CommandOutcome::Ignored(InvalidCommand::StaleFetch);
        }
        self.in_flight = false;
        self.last_error = Some(error);
        self.touch();
        CommandOutcome::Applied
    }

    pub fn set_answer(&mut self, key: AnswerKey, value: impl Into<String>) -> CommandOutcome {
        if self.phase != Phase::Answering {
            return CommandOutcome::Ignored(InvalidCommand::NotAnswering);
        }
        let Some(card) = self.cards.get(key.card_index) else {
            return CommandOutcome::Ignored(InvalidCommand::CardOutOfRange {
                card_index: key.card_index,
                len: self.cards.len(),
            });
        };
        let slots = card.blank_count();
        if key.slot_index >= slots {
            return CommandOutcome::Ignored(InvalidCommand::SlotOutOfRange {
                slot_index: key.slot_index,
                slots,
            });
        }
        self.answers.set(key, value);
        self.touch();
        CommandOutcome::Applied
    }

    /// Freeze answers and reveal the originals.
    pub fn check(&mut self) -> CommandOutcome {
        if self.phase != Phase::Answering {
            return CommandOutcome::Ignored(InvalidCommand::NotAnswering);
        }
        self.phase = Phase::Revealed;
        self.touch();
        CommandOutcome::Applied
    }

    /// Move one card back or forward. Never wraps; the edges are no-ops.
    pub fn navigate(&mut self, direction: Direction) -> CommandOutcome {
        if self.phase == Phase::Loading || self.cards.is_empty() {
            return CommandOutcome::Ignored(InvalidCommand::NoCards);
        }
        let target = match direction {
            Direction::Prev => self.current_index.checked_sub(1),
            Direction::Next => Some(self.current_index + 1).filter(|i| *i < self.cards.len()),
        };
        match target {
            Some(index) => {
                self.current_index = index;
                self.touch();
                CommandOutcome::Applied
            }
            None => CommandOutcome::Ignored(InvalidCommand::AtDeckEdge),
        }
    }

    /// Update filters for the next fetch. Does not fetch by itself.
    pub fn set_filter(
        &mut self,
        category: Option<Category>,
        difficulty: Option<Difficulty>,
    ) -> CommandOutcome {
        let mut filters = self.filters.clone();
        if let Some(category) = category {
            filters.category = category;
        }
        if let Some(difficulty) = difficulty {
            filters.difficulty = difficulty;
        }
        if filters == self.filters {
            return CommandOutcome::Ignored(InvalidCommand::FiltersUnchanged);
        }
        self.filters = filters;
        self.touch();
        CommandOutcome::Applied
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    /// Immutable copy of everything an observer needs to render.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            version: self.version,
            phase: self.phase,
            cards: self.cards.clone(),
            current_index: self.current_index(),
            filters: self.filters.clone(),
            answers: self.answers.clone(),
            error: self.last_error.clone(),
            fetching: self.in_flight,
        }
    }
}

/// Reject the whole batch if any card would leave answer keys inconsistent.
pub fn validate_batch(cards: &[Card]) -> Result<(), SessionError> {
    if cards.is_empty() {
        return Err(SessionError::FetchFailure {
            message: "service returned an empty batch".to_string(),
            retryable: true,
        });
    }
    for (card_index, card) in cards.iter().enumerate() {
        card.validate()
            .map_err(|reason| SessionError::MalformedCard { card_index, reason })?;
    }
    Ok(())
}

/// Point-in-time view of a session, handed to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub version: u64,
    pub phase: Phase,
    pub cards: Vec<Card>,
    pub current_index: Option<usize>,
    pub filters: Filters,
    pub answers: AnswerStore,
    pub error: Option<SessionError>,
    pub fetching: bool,
}

impl SessionSnapshot {
    pub fn current_card(&self) -> Option<&Card> {
        self.current_index.and_then(|i| self.cards.get(i))
    }

    pub fn current_segments(&self) -> Vec<Segment> {
        self.current_card().map(Card::segments).unwrap_or_default()
    }

    pub fn answer(&self, card_index: usize, slot_index: usize) -> &str {
        self.answers.get(AnswerKey::new(card_index, slot_index))
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        SessionState::default().snapshot()
    }
}
