//! Trait definition for the exercise service the session depends on.
//!
//! Implemented by the `cloze-client` crate; the session only ever calls it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{Card, Category, Difficulty, Filters};

/// Number of cards requested per batch unless configured otherwise.
pub const DEFAULT_CARD_COUNT: u32 = 5;

/// A source of exercise cards.
#[async_trait]
pub trait ExerciseService: Send + Sync {
    /// Human-readable service name (e.g. "http").
    fn name(&self) -> &str;

    /// Fetch a batch of cards. Resolves with the whole batch or fails.
    async fn fetch_cards(&self, request: &FetchRequest) -> anyhow::Result<Vec<Card>>;

    /// Advisory reachability check. Never errors.
    async fn check_health(&self) -> bool;
}

/// Request for one batch of cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub category: Category,
    pub difficulty: Difficulty,
    /// Number of cards wanted.
    #[serde(rename = "num_cards")]
    pub count: u32,
}

impl FetchRequest {
    pub fn new(filters: &Filters, count: u32) -> Self {
        Self {
            category: filters.category.clone(),
            difficulty: filters.difficulty,
            count,
        }
    }
}
