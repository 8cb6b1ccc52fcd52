//! Core data model types for cloze.
//!
//! Cards come off the wire from the exercise service; segments are derived
//! from a card's masked text on demand and never stored.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::parser::{self, BLANK_MARKER};

/// One exercise unit: a masked prompt paired with its ground-truth original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Text with zero or more blank markers.
    pub masked_text: String,
    /// The same text with every blank filled in.
    pub original_text: String,
}

impl Card {
    pub fn new(masked_text: impl Into<String>, original_text: impl Into<String>) -> Self {
        Self {
            masked_text: masked_text.into(),
            original_text: original_text.into(),
        }
    }

    /// Parse the masked text into segments.
    pub fn segments(&self) -> Vec<Segment> {
        parser::parse(&self.masked_text)
    }

    /// Number of blank slots in this card.
    pub fn blank_count(&self) -> usize {
        parser::blank_count(&self.masked_text, BLANK_MARKER)
    }

    /// Expected fill for each blank, if the original text aligns with the
    /// masked text. Display only; nothing scores against this.
    pub fn expected_answers(&self) -> Option<Vec<String>> {
        parser::align_answers(&self.masked_text, &self.original_text, BLANK_MARKER)
    }

    /// Check that the card has at least one blank and that its original text
    /// lines up with the masked text.
    pub fn validate(&self) -> Result<(), String> {
        if self.blank_count() == 0 {
            return Err(format!("no {BLANK_MARKER} markers in masked text"));
        }
        if self.expected_answers().is_none() {
            return Err("original text does not align with masked text".to_string());
        }
        Ok(())
    }
}

/// A parsed unit of masked text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    Literal { text: String },
    Blank { slot_index: usize },
}

impl Segment {
    pub fn literal(text: impl Into<String>) -> Self {
        Segment::Literal { text: text.into() }
    }

    pub fn blank(slot_index: usize) -> Self {
        Segment::Blank { slot_index }
    }
}

/// Identifies one editable blank across the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnswerKey {
    pub card_index: usize,
    pub slot_index: usize,
}

impl AnswerKey {
    pub fn new(card_index: usize, slot_index: usize) -> Self {
        Self {
            card_index,
            slot_index,
        }
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.card_index, self.slot_index)
    }
}

/// Exercise difficulty requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Card category. The set is open-ended; `all` matches every category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub const ALL: &'static str = "all";

    /// Categories the service is known to offer.
    pub const KNOWN: [&'static str; 4] = ["all", "greeting", "food", "travel"];

    pub fn all() -> Self {
        Category(Self::ALL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_all(&self) -> bool {
        self.0 == Self::ALL
    }

    /// Whether a card tagged with `other` belongs to this category.
    pub fn matches(&self, other: Option<&str>) -> bool {
        self.is_all() || other.is_some_and(|c| c.eq_ignore_ascii_case(&self.0))
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::all()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        if name.is_empty() {
            return Err("category must not be empty".to_string());
        }
        if name.chars().any(char::is_whitespace) {
            return Err(format!("invalid category: {name}"));
        }
        Ok(Category(name))
    }
}

/// The category/difficulty pair sent with every fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Filters {
    pub category: Category,
    pub difficulty: Difficulty,
}

impl Filters {
    pub fn new(category: Category, difficulty: Difficulty) -> Self {
        Self {
            category,
            difficulty,
        }
    }
}

/// Navigation direction through the card deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prev" | "previous" | "back" => Ok(Direction::Prev),
            "next" | "forward" => Ok(Direction::Next),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// Session-wide mode gating whether answers are editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Loading,
    Answering,
    Revealed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Loading => write!(f, "loading"),
            Phase::Answering => write!(f, "answering"),
            Phase::Revealed => write!(f, "revealed"),
        }
    }
}
