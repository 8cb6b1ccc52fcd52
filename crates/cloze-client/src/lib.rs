//! cloze-client: exercise service implementations.
//!
//! Implements the `ExerciseService` trait for the remote card generation
//! server, for local TOML decks, and for scripted tests. Also loads the
//! `cloze.toml` configuration that picks between them.

pub mod config;
pub mod deck;
pub mod http;
pub mod mock;

pub use config::{
    create_service, http_service, load_config, load_config_from, ClozeConfig, ServiceConfig,
};
pub use deck::DeckService;
pub use http::{GeneratedBlanks, HttpExerciseService};
pub use mock::MockService;
