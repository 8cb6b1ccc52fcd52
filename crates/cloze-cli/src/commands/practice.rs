//! The `cloze practice` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use cloze_client::config::{create_service, load_config_from};
use cloze_core::controller::{spawn_session, SessionConfig, SessionHandle};
use cloze_core::model::{Card, Category, Difficulty, Direction, Phase, Segment};
use cloze_core::session::SessionSnapshot;

const HELP: &str = "\
Commands:
  a <slot> <text>                 fill blank <slot> (numbered from 1) on this card
  check                           reveal the original text
  next | prev                     move between cards
  filter <category|-> <level|->   change filters (- keeps the current value)
  reload                          fetch a fresh batch with the current filters
  show                            print the current card again
  help                            this message
  quit                            leave the session";

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Answer { slot: usize, text: String },
    Check,
    Navigate(Direction),
    Filter {
        category: Option<Category>,
        difficulty: Option<Difficulty>,
    },
    Reload,
    Show,
    Help,
    Quit,
}

/// Parse a command line. Blank lines yield `None`.
fn parse_input(line: &str) -> Result<Option<Input>, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let input = match word {
        "" => return Ok(None),
        "a" | "answer" => {
            let (slot, text) = rest
                .split_once(char::is_whitespace)
                .map(|(slot, text)| (slot, text.trim()))
                .unwrap_or((rest, ""));
            let slot: usize = slot
                .parse()
                .map_err(|_| format!("invalid slot: '{slot}'"))?;
            if slot == 0 {
                return Err("slots are numbered from 1".into());
            }
            Input::Answer {
                slot: slot - 1,
                text: text.to_string(),
            }
        }
        "check" => Input::Check,
        "next" | "prev" => Input::Navigate(word.parse()?),
        "filter" => {
            let mut parts = rest.split_whitespace();
            let category = match parts.next() {
                None | Some("-") => None,
                Some(c) => Some(c.parse::<Category>()?),
            };
            let difficulty = match parts.next() {
                None | Some("-") => None,
                Some(d) => Some(d.parse::<Difficulty>()?),
            };
            if category.is_none() && difficulty.is_none() {
                return Err("usage: filter <category|-> <difficulty|->".into());
            }
            Input::Filter {
                category,
                difficulty,
            }
        }
        "reload" => Input::Reload,
        "show" => Input::Show,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => return Err(format!("unknown command: '{other}' (try 'help')")),
    };
    Ok(Some(input))
}

pub async fn execute(
    category: Option<String>,
    difficulty: Option<String>,
    count: Option<u32>,
    deck: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut filters = config.filters()?;
    if let Some(c) = category {
        filters.category = c.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    }
    if let Some(d) = difficulty {
        filters.difficulty = d.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    }
    let batch_size = count.unwrap_or(config.cards_per_batch);
    anyhow::ensure!(batch_size >= 1, "count must be at least 1");

    let service = create_service(&config, deck.as_deref())?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        service = service.name(),
        category = %filters.category,
        difficulty = %filters.difficulty,
        batch_size,
        "starting practice session"
    );

    let session = spawn_session(
        service,
        SessionConfig {
            filters,
            batch_size,
            ..SessionConfig::default()
        },
    );

    session.load_initial().await?;
    render(&session.settled().await?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = match parse_input(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        if input == Input::Quit {
            break;
        }
        apply(&session, input).await?;
    }

    println!("Bye.");
    Ok(())
}

async fn apply(session: &SessionHandle, input: Input) -> Result<()> {
    let before = session.snapshot();
    let is_show = input == Input::Show;

    let after = match input {
        Input::Answer { slot, text } => {
            let Some(card_index) = before.current_index else {
                println!("No card to answer.");
                return Ok(());
            };
            session.set_answer(card_index, slot, text).await?
        }
        Input::Check => session.check().await?,
        Input::Navigate(direction) => session.navigate(direction).await?,
        Input::Filter {
            category,
            difficulty,
        } => {
            let after = session.set_filter(category, difficulty).await?;
            println!(
                "Filters: category '{}', difficulty '{}'. Use 'reload' to fetch new cards.",
                after.filters.category, after.filters.difficulty
            );
            return Ok(());
        }
        Input::Reload => {
            session.reload().await?;
            session.settled().await?
        }
        Input::Show => before.clone(),
        Input::Help => {
            println!("{HELP}");
            println!("Known categories: {}", Category::KNOWN.join(", "));
            return Ok(());
        }
        Input::Quit => return Ok(()),
    };

    if after.version == before.version && !is_show {
        println!("(ignored: not allowed in the {} phase or out of range)", after.phase);
    }
    render(&after);
    Ok(())
}

/// The masked text with each blank drawn as `[__n__]`.
pub fn render_masked(card: &Card) -> String {
    card.segments()
        .iter()
        .map(|segment| match segment {
            Segment::Literal { text } => text.clone(),
            Segment::Blank { slot_index } => format!("[__{}__]", slot_index + 1),
        })
        .collect()
}

fn render(snapshot: &SessionSnapshot) {
    if let Some(err) = &snapshot.error {
        println!("! {err}");
        if err.is_retryable() {
            println!("  Type 'reload' to try again.");
        }
    }

    let (Some(index), Some(card)) = (snapshot.current_index, snapshot.current_card()) else {
        println!("No cards loaded.");
        return;
    };

    println!(
        "\nCard {}/{} [{} / {}] ({})",
        index + 1,
        snapshot.cards.len(),
        snapshot.filters.category,
        snapshot.filters.difficulty,
        snapshot.phase
    );
    println!("  {}", render_masked(card));

    let answers = snapshot.answers.answers_for_card(index, card.blank_count());
    if snapshot.phase == Phase::Revealed {
        println!("  Original: {}", card.original_text);
        let expected = card.expected_answers().unwrap_or_default();

        let mut table = Table::new();
        table.set_header(vec!["Slot", "Your answer", "Expected"]);
        for (slot, answer) in answers.iter().enumerate() {
            table.add_row(vec![
                Cell::new(slot + 1),
                Cell::new(answer),
                Cell::new(expected.get(slot).map(String::as_str).unwrap_or("")),
            ]);
        }
        println!("{table}");
    } else {
        for (slot, answer) in answers.iter().enumerate() {
            println!("  {}: {answer}", slot + 1);
        }
    }
}
