//! Session actor.
//!
//! One tokio task owns the [`SessionState`] and applies commands strictly in
//! arrival order. Fetches run as separate tasks and post their results back
//! to the actor, so the state is never touched from two places at once.
//! Observers read snapshots from a `watch` channel.

use std::sync::Arc;

use futures::Stream;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::model::{AnswerKey, Card, Category, Difficulty, Direction, Filters};
use crate::session::{CommandOutcome, FetchTicket, SessionSnapshot, SessionState};
use crate::traits::{ExerciseService, DEFAULT_CARD_COUNT};

/// Configuration for a spawned session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Filters used for the first fetch.
    pub filters: Filters,
    /// Cards requested per fetch.
    pub batch_size: u32,
    /// Capacity of the command queue.
    pub queue_depth: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            filters: Filters::default(),
            batch_size: DEFAULT_CARD_COUNT,
            queue_depth: 32,
        }
    }
}

/// The session actor is gone (its task ended or panicked).
#[derive(Debug, Clone, Copy, Error)]
#[error("session has shut down")]
pub struct SessionClosed;

#[derive(Debug)]
enum Command {
    LoadInitial,
    SetAnswer { key: AnswerKey, value: String },
    Check,
    Navigate(Direction),
    SetFilter {
        category: Option<Category>,
        difficulty: Option<Difficulty>,
    },
    Reload,
}

struct Request {
    command: Command,
    reply: oneshot::Sender<SessionSnapshot>,
}

struct FetchDone {
    seq: u64,
    result: anyhow::Result<Vec<Card>>,
}

/// Cheap, cloneable front door to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    requests: mpsc::Sender<Request>,
    snapshots: watch::Receiver<SessionSnapshot>,
    service: Arc<dyn ExerciseService>,
}

/// Start a session actor on the current tokio runtime.
///
/// The actor stops once every handle has been dropped.
pub fn spawn_session(service: Arc<dyn ExerciseService>, config: SessionConfig) -> SessionHandle {
    let (requests, inbox) = mpsc::channel(config.queue_depth.max(1));
    let (fetch_tx, fetch_rx) = mpsc::channel(config.queue_depth.max(1));
    let state = SessionState::new(config.filters, config.batch_size);
    let (publisher, snapshots) = watch::channel(state.snapshot());

    let actor = SessionActor {
        state,
        service: Arc::clone(&service),
        inbox,
        fetch_tx,
        fetch_rx,
        publisher,
        in_flight: None,
    };
    tokio::spawn(actor.run());

    SessionHandle {
        requests,
        snapshots,
        service,
    }
}

impl SessionHandle {
    async fn send(&self, command: Command) -> Result<SessionSnapshot, SessionClosed> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request { command, reply })
            .await
            .map_err(|_| SessionClosed)?;
        response.await.map_err(|_| SessionClosed)
    }

    /// Issue the first fetch. Later calls are ignored; use [`reload`](Self::reload).
    pub async fn load_initial(&self) -> Result<SessionSnapshot, SessionClosed> {
        self.send(Command::LoadInitial).await
    }

    pub async fn set_answer(
        &self,
        card_index: usize,
        slot_index: usize,
        value: impl Into<String>,
    ) -> Result<SessionSnapshot, SessionClosed> {
        self.send(Command::SetAnswer {
            key: AnswerKey::new(card_index, slot_index),
            value: value.into(),
        })
        .await
    }

    pub async fn check(&self) -> Result<SessionSnapshot, SessionClosed> {
        self.send(Command::Check).await
    }

    pub async fn navigate(&self, direction: Direction) -> Result<SessionSnapshot, SessionClosed> {
        self.send(Command::Navigate(direction)).await
    }

    pub async fn set_filter(
        &self,
        category: Option<Category>,
        difficulty: Option<Difficulty>,
    ) -> Result<SessionSnapshot, SessionClosed> {
        self.send(Command::SetFilter {
            category,
            difficulty,
        })
        .await
    }

    pub async fn reload(&self) -> Result<SessionSnapshot, SessionClosed> {
        self.send(Command::Reload).await
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A raw receiver for callers that want `watch` semantics directly.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Stream of snapshots, one per published change. Intermediate states
    /// may be skipped if the consumer falls behind.
    pub fn updates(&self) -> impl Stream<Item = SessionSnapshot> + Send + 'static {
        futures::stream::unfold(self.snapshots.clone(), |mut rx| async move {
            rx.changed().await.ok()?;
            let snapshot = rx.borrow_and_update().clone();
            Some((snapshot, rx))
        })
    }

    /// Wait until no fetch is outstanding and return that snapshot.
    pub async fn settled(&self) -> Result<SessionSnapshot, SessionClosed> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|s| !s.fetching)
            .await
            .map_err(|_| SessionClosed)?;
        Ok(snapshot.clone())
    }

    /// Advisory reachability check; bypasses the session state.
    pub async fn check_health(&self) -> bool {
        self.service.check_health().await
    }
}

struct SessionActor {
    state: SessionState,
    service: Arc<dyn ExerciseService>,
    inbox: mpsc::Receiver<Request>,
    fetch_tx: mpsc::Sender<FetchDone>,
    fetch_rx: mpsc::Receiver<FetchDone>,
    publisher: watch::Sender<SessionSnapshot>,
    in_flight: Option<JoinHandle<()>>,
}

impl SessionActor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                request = self.inbox.recv() => {
                    let Some(Request { command, reply }) = request else {
                        break;
                    };
                    self.apply(command);
                    let _ = reply.send(self.state.snapshot());
                }
                Some(done) = self.fetch_rx.recv() => {
                    self.resolve(done);
                }
            }
        }

        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        debug!("session actor stopped");
    }

    fn apply(&mut self, command: Command) {
        let before = self.state.version();
        match command {
            Command::LoadInitial => match self.state.load_initial() {
                Ok(ticket) => self.start_fetch(ticket),
                Err(reason) => debug!(%reason, "load_initial ignored"),
            },
            Command::Reload => {
                let ticket = self.state.reload();
                self.start_fetch(ticket);
            }
            Command::SetAnswer { key, value } => {
                let outcome = self.state.set_answer(key, value);
                log_ignored("set_answer", outcome);
            }
            Command::Check => log_ignored("check", self.state.check()),
            Command::Navigate(direction) => {
                log_ignored("navigate", self.state.navigate(direction));
            }
            Command::SetFilter {
                category,
                difficulty,
            } => {
                log_ignored("set_filter", self.state.set_filter(category, difficulty));
            }
        }
        self.publish_if_changed(before);
    }

    fn start_fetch(&mut self, ticket: FetchTicket) {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        debug!(
            seq = ticket.seq(),
            category = %ticket.request.category,
            difficulty = %ticket.request.difficulty,
            count = ticket.request.count,
            "fetching cards"
        );

        let service = Arc::clone(&self.service);
        let results = self.fetch_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = service.fetch_cards(&ticket.request).await;
            let _ = results
                .send(FetchDone {
                    seq: ticket.seq(),
                    result,
                })
                .await;
        }));
    }

    fn resolve(&mut self, done: FetchDone) {
        let before = self.state.version();
        let outcome = match done.result {
            Ok(cards) => {
                let count = cards.len();
                let outcome = self.state.fetch_succeeded(done.seq, cards);
                if outcome.is_applied() {
                    match self.state.last_error() {
                        Some(err) => warn!(seq = done.seq, error = %err, "rejected card batch"),
                        None => info!(seq = done.seq, count, "loaded card batch"),
                    }
                }
                outcome
            }
            Err(err) => {
                let session_err = SessionError::from_fetch_error(&err);
                let outcome = self.state.fetch_failed(done.seq, session_err);
                if outcome.is_applied() {
                    warn!(seq = done.seq, error = %format!("{err:#}"), "fetch failed");
                }
                outcome
            }
        };
        if !outcome.is_applied() {
            debug!(seq = done.seq, "discarded superseded fetch result");
        }
        self.publish_if_changed(before);
    }

    fn publish_if_changed(&self, before: u64) {
        if self.state.version() != before {
            self.publisher.send_replace(self.state.snapshot());
        }
    }
}

fn log_ignored(command: &str, outcome: CommandOutcome) {
    if let CommandOutcome::Ignored(reason) = outcome {
        debug!(command, %reason, "command ignored");
    }
}
