//! TOML deck files.
//!
//! A deck is a fixed list of cards on disk, tagged with optional category and
//! difficulty. Decks feed the deck-backed exercise service and are checked
//! by `cloze validate`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Card, Difficulty};

/// Intermediate TOML structure for parsing deck files.
#[derive(Debug, Deserialize)]
struct TomlDeckFile {
    deck: TomlDeckHeader,
    #[serde(default)]
    cards: Vec<TomlDeckCard>,
}

#[derive(Debug, Deserialize)]
struct TomlDeckHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlDeckCard {
    masked_text: String,
    original_text: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
}

/// A card as stored in a deck, with its selection tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckCard {
    pub card: Card,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
}

/// A named collection of cards.
#[derive(Debug, Clone)]
pub struct Deck {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cards: Vec<DeckCard>,
}

/// Parse a single deck file.
pub fn parse_deck(path: &Path) -> Result<Deck> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read deck file: {}", path.display()))?;

    parse_deck_str(&content, path)
}

/// Parse deck TOML from a string; `source_path` is only used in errors.
pub fn parse_deck_str(content: &str, source_path: &Path) -> Result<Deck> {
    let parsed: TomlDeckFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let cards = parsed
        .cards
        .into_iter()
        .map(|c| {
            let difficulty = c
                .difficulty
                .map(|d| d.parse().map_err(|e: String| anyhow::anyhow!("{}", e)))
                .transpose()?;

            Ok(DeckCard {
                card: Card::new(c.masked_text, c.original_text),
                category: c.category.map(|s| s.trim().to_lowercase()),
                difficulty,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Deck {
        id: parsed.deck.id,
        name: parsed.deck.name,
        description: parsed.deck.description,
        cards,
    })
}

/// A warning from deck validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 0-based card position, if the warning is about one card.
    pub card_index: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a deck for cards the session would reject.
pub fn validate_deck(deck: &Deck) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if deck.cards.is_empty() {
        warnings.push(ValidationWarning {
            card_index: None,
            message: "deck has no cards".into(),
        });
    }

    for (index, entry) in deck.cards.iter().enumerate() {
        if let Err(reason) = entry.card.validate() {
            warnings.push(ValidationWarning {
                card_index: Some(index),
                message: reason,
            });
        }
    }

    let mut seen = std::collections::HashSet::new();
    for (index, entry) in deck.cards.iter().enumerate() {
        if !seen.insert(entry.card.masked_text.as_str()) {
            warnings.push(ValidationWarning {
                card_index: Some(index),
                message: format!("duplicate masked text: {}", entry.card.masked_text),
            });
        }
    }

    warnings
}
