//! The `cloze validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(deck_path: PathBuf) -> Result<()> {
    let deck = cloze_core::deck::parse_deck(&deck_path)?;

    println!("Deck: {} ({} cards)", deck.name, deck.cards.len());

    let warnings = cloze_core::deck::validate_deck(&deck);
    for w in &warnings {
        let prefix = w
            .card_index
            .map(|i| format!("  [card {}]", i + 1))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Deck valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
