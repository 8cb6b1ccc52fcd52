//! The `cloze init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("cloze.toml").exists() {
        println!("cloze.toml already exists, skipping.");
    } else {
        std::fs::write("cloze.toml", SAMPLE_CONFIG)?;
        println!("Created cloze.toml");
    }

    std::fs::create_dir_all("decks")?;
    let example_path = std::path::Path::new("decks/example.toml");
    if example_path.exists() {
        println!("decks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DECK)?;
        println!("Created decks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point base_url in cloze.toml at your card server");
    println!("  2. Run: cloze validate --deck decks/example.toml");
    println!("  3. Run: cloze practice --deck decks/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# cloze configuration

default_category = "all"
default_difficulty = "medium"
cards_per_batch = 5

[service]
type = "http"
base_url = "http://localhost:8000/api"
timeout_secs = 30
max_retries = 2
retry_delay_ms = 500

# To practice offline from a deck file instead:
# [service]
# type = "deck"
# path = "decks/example.toml"
"#;

const EXAMPLE_DECK: &str = r#"[deck]
id = "example"
name = "Example Deck"
description = "A few everyday phrases to get started"

[[cards]]
masked_text = "你[MASK]！"
original_text = "你好！"
category = "greeting"
difficulty = "easy"

[[cards]]
masked_text = "[MASK]天见。"
original_text = "明天见。"
category = "greeting"
difficulty = "medium"

[[cards]]
masked_text = "我想吃[MASK]和[MASK]。"
original_text = "我想吃米饭和青菜。"
category = "food"
difficulty = "medium"

[[cards]]
masked_text = "请问[MASK]在哪里？"
original_text = "请问火车站在哪里？"
category = "travel"
"#;
