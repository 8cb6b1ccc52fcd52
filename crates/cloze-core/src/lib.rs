//! cloze-core: masked-text parsing and the exercise session engine.
//!
//! This crate defines the card model, the `[MASK]` parser, the per-slot
//! answer store, and the session state machine with its async actor. It
//! talks to the outside world only through the [`traits::ExerciseService`]
//! trait.

pub mod answers;
pub mod controller;
pub mod deck;
pub mod error;
pub mod model;
pub mod parser;
pub mod session;
pub mod traits;

pub use answers::AnswerStore;
pub use controller::{spawn_session, SessionClosed, SessionConfig, SessionHandle};
pub use error::{InvalidCommand, ServiceError, SessionError};
pub use model::{AnswerKey, Card, Category, Difficulty, Direction, Filters, Phase, Segment};
pub use session::{CommandOutcome, SessionSnapshot, SessionState};
pub use traits::{ExerciseService, FetchRequest};
