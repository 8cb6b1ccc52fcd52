//! cloze CLI: practice fill-in-the-blank cards from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cloze", version, about = "Fill-in-the-blank exercise sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive practice session (commands are read from stdin)
    Practice {
        /// Card category (e.g. greeting, food, travel, all)
        #[arg(long)]
        category: Option<String>,

        /// Difficulty: easy, medium, hard
        #[arg(long)]
        difficulty: Option<String>,

        /// Cards per batch
        #[arg(long)]
        count: Option<u32>,

        /// Serve cards from a local deck file instead of the server
        #[arg(long)]
        deck: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check whether the exercise service is reachable
    Health {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Ask the server to blank out words in your own text
    Blanks {
        /// Text to mask
        #[arg(long)]
        text: String,

        /// Difficulty: easy, medium, hard
        #[arg(long, default_value = "medium")]
        difficulty: String,

        /// Number of blanks to generate
        #[arg(long, default_value = "3")]
        num_blanks: u32,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a deck file
    Validate {
        /// Path to deck TOML file
        #[arg(long)]
        deck: PathBuf,
    },

    /// Create starter config and example deck
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "cloze=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Practice {
            category,
            difficulty,
            count,
            deck,
            config,
        } => commands::practice::execute(category, difficulty, count, deck, config).await,
        Commands::Health { config } => commands::health::execute(config).await,
        Commands::Blanks {
            text,
            difficulty,
            num_blanks,
            config,
        } => commands::blanks::execute(text, difficulty, num_blanks, config).await,
        Commands::Validate { deck } => commands::validate::execute(deck),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
