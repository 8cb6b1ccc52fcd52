//! Per-slot answer storage.

use std::collections::BTreeMap;

use crate::model::AnswerKey;

/// Sparse mapping from answer key to the user's text. Absent keys read as
/// the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    entries: BTreeMap<AnswerKey, String>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: AnswerKey) -> &str {
        self.entries.get(&key).map(String::as_str).unwrap_or("")
    }

    /// Insert or overwrite. Content is free text and is not validated.
    pub fn set(&mut self, key: AnswerKey, value: impl Into<String>) {
        self.entries.insert(key, value.into());
    }

    pub fn reset_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Answers for one card, one entry per slot in `0..slots`.
    pub fn answers_for_card(&self, card_index: usize, slots: usize) -> Vec<&str> {
        (0..slots)
            .map(|slot| self.get(AnswerKey::new(card_index, slot)))
            .collect()
    }
}
