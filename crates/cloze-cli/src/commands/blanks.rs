//! The `cloze blanks` command.

use std::path::PathBuf;

use anyhow::Result;

use cloze_client::config::{http_service, load_config_from};
use cloze_core::model::Difficulty;

pub async fn execute(
    text: String,
    difficulty: String,
    num_blanks: u32,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(!text.trim().is_empty(), "text must not be empty");
    anyhow::ensure!(num_blanks >= 1, "num-blanks must be at least 1");
    let difficulty: Difficulty = difficulty.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let config = load_config_from(config_path.as_deref())?;
    let service = http_service(&config)?;
    let generated = service
        .generate_blanks(&text, difficulty, num_blanks)
        .await?;

    println!("Masked:   {}", super::practice::render_masked(&generated.card));
    println!("Original: {}", generated.card.original_text);

    let answers = if generated.answers.is_empty() {
        generated.card.expected_answers().unwrap_or_default()
    } else {
        generated.answers
    };
    for (slot, answer) in answers.iter().enumerate() {
        println!("  {}: {answer}", slot + 1);
    }

    Ok(())
}
