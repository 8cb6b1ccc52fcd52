//! Exercise service backed by a local deck file.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use cloze_core::deck::{parse_deck, Deck};
use cloze_core::error::ServiceError;
use cloze_core::model::Card;
use cloze_core::traits::{ExerciseService, FetchRequest};

/// Serves cards from a fixed deck, in file order.
pub struct DeckService {
    deck: Deck,
}

impl DeckService {
    pub fn new(deck: Deck) -> Self {
        Self { deck }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::new(parse_deck(path)?))
    }
}

#[async_trait]
impl ExerciseService for DeckService {
    fn name(&self) -> &str {
        "deck"
    }

    async fn fetch_cards(&self, request: &FetchRequest) -> anyhow::Result<Vec<Card>> {
        let cards: Vec<Card> = self
            .deck
            .cards
            .iter()
            .filter(|entry| request.category.matches(entry.category.as_deref()))
            .filter(|entry| entry.difficulty.is_none_or(|d| d == request.difficulty))
            .take(request.count as usize)
            .map(|entry| entry.card.clone())
            .collect();

        if cards.is_empty() {
            return Err(ServiceError::NoCards {
                category: request.category.to_string(),
                difficulty: request.difficulty.to_string(),
            }
            .into());
        }

        debug!(deck = %self.deck.id, served = cards.len(), "served cards from deck");
        Ok(cards)
    }

    async fn check_health(&self) -> bool {
        true
    }
}
