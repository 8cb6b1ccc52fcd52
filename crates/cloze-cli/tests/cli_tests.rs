//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const DECK: &str = r#"[deck]
id = "test"
name = "Test Deck"

[[cards]]
masked_text = "我[MASK]你"
original_text = "我爱你"
category = "greeting"
difficulty = "easy"

[[cards]]
masked_text = "我想吃[MASK]和[MASK]。"
original_text = "我想吃米饭和青菜。"
category = "food"
"#;

/// A command isolated from any config in the working directory or home.
fn cloze(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("cloze").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("CLOZE_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn write_deck(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("deck.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn validate_valid_deck() {
    let dir = TempDir::new().unwrap();
    let deck = write_deck(&dir, DECK);

    cloze(dir.path())
        .arg("validate")
        .arg("--deck")
        .arg(&deck)
        .assert()
        .success()
        .stdout(predicate::str::contains("Test Deck (2 cards)"))
        .stdout(predicate::str::contains("Deck valid."));
}

#[test]
fn validate_reports_bad_cards() {
    let dir = TempDir::new().unwrap();
    let deck = write_deck(
        &dir,
        r#"[deck]
id = "bad"
name = "Bad"

[[cards]]
masked_text = "no blanks here"
original_text = "no blanks here"
"#,
    );

    cloze(dir.path())
        .arg("validate")
        .arg("--deck")
        .arg(&deck)
        .assert()
        .success()
        .stdout(predicate::str::contains("[card 1] WARNING"))
        .stdout(predicate::str::contains("1 warning(s) found."));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();

    cloze(dir.path())
        .arg("validate")
        .arg("--deck")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    cloze(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created cloze.toml"))
        .stdout(predicate::str::contains("Created decks/example.toml"));

    assert!(dir.path().join("cloze.toml").exists());
    assert!(dir.path().join("decks/example.toml").exists());

    // The generated deck passes validation.
    cloze(dir.path())
        .arg("validate")
        .arg("--deck")
        .arg("decks/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deck valid."));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    cloze(dir.path()).arg("init").assert().success();

    cloze(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn practice_answer_and_check() {
    let dir = TempDir::new().unwrap();
    let deck = write_deck(&dir, DECK);

    cloze(dir.path())
        .arg("practice")
        .arg("--deck")
        .arg(&deck)
        .arg("--difficulty")
        .arg("easy")
        .write_stdin("a 1 爱\ncheck\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("我[__1__]你"))
        .stdout(predicate::str::contains("Card 1/2"))
        .stdout(predicate::str::contains("Original: 我爱你"))
        .stdout(predicate::str::contains("Bye."));
}

#[test]
fn practice_logs_start_and_lists_categories() {
    let dir = TempDir::new().unwrap();
    let deck = write_deck(&dir, DECK);

    cloze(dir.path())
        .arg("practice")
        .arg("--deck")
        .arg(&deck)
        .write_stdin("help\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("starting practice session"))
        .stdout(predicate::str::contains("Known categories: all, greeting, food, travel"));
}

#[test]
fn practice_navigation_and_ignored_commands() {
    let dir = TempDir::new().unwrap();
    let deck = write_deck(&dir, DECK);

    cloze(dir.path())
        .arg("practice")
        .arg("--deck")
        .arg(&deck)
        .arg("--difficulty")
        .arg("easy")
        .write_stdin("prev\nnext\na 2 青菜\nbogus\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("(ignored"))
        .stdout(predicate::str::contains("Card 2/2"))
        .stdout(predicate::str::contains("我想吃[__1__]和[__2__]。"))
        .stdout(predicate::str::contains("2: 青菜"))
        .stdout(predicate::str::contains("unknown command: 'bogus'"));
}

#[test]
fn practice_filter_and_reload() {
    let dir = TempDir::new().unwrap();
    let deck = write_deck(&dir, DECK);

    cloze(dir.path())
        .arg("practice")
        .arg("--deck")
        .arg(&deck)
        .arg("--category")
        .arg("greeting")
        .arg("--difficulty")
        .arg("easy")
        .write_stdin("filter food medium\nreload\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Filters: category 'food', difficulty 'medium'"))
        .stdout(predicate::str::contains("我想吃[__1__]和[__2__]。"));
}

#[test]
fn practice_reports_empty_selection() {
    let dir = TempDir::new().unwrap();
    let deck = write_deck(&dir, DECK);

    cloze(dir.path())
        .arg("practice")
        .arg("--deck")
        .arg(&deck)
        .arg("--category")
        .arg("travel")
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("failed to load cards"))
        .stdout(predicate::str::contains("No cards loaded."));
}

#[test]
fn practice_rejects_bad_difficulty() {
    let dir = TempDir::new().unwrap();
    let deck = write_deck(&dir, DECK);

    cloze(dir.path())
        .arg("practice")
        .arg("--deck")
        .arg(&deck)
        .arg("--difficulty")
        .arg("extreme")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown difficulty"));
}

#[test]
fn health_with_deck_config() {
    let dir = TempDir::new().unwrap();
    let deck = write_deck(&dir, DECK);
    std::fs::write(
        dir.path().join("cloze.toml"),
        format!("[service]\ntype = \"deck\"\npath = {:?}\n", deck.display().to_string()),
    )
    .unwrap();

    cloze(dir.path())
        .arg("health")
        .assert()
        .success()
        .stdout(predicate::str::contains("Service 'deck' is reachable."));
}

#[test]
fn health_unreachable_server_still_succeeds() {
    let dir = TempDir::new().unwrap();

    cloze(dir.path())
        .arg("health")
        .env("CLOZE_BASE_URL", "http://127.0.0.1:9/api")
        .assert()
        .success()
        .stdout(predicate::str::contains("NOT reachable"));
}

#[test]
fn blanks_rejects_empty_text() {
    let dir = TempDir::new().unwrap();

    cloze(dir.path())
        .arg("blanks")
        .arg("--text")
        .arg("  ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("text must not be empty"));
}

#[test]
fn blanks_requires_http_service() {
    let dir = TempDir::new().unwrap();
    let deck = write_deck(&dir, DECK);
    std::fs::write(
        dir.path().join("cloze.toml"),
        format!("[service]\ntype = \"deck\"\npath = {:?}\n", deck.display().to_string()),
    )
    .unwrap();

    cloze(dir.path())
        .arg("blanks")
        .arg("--text")
        .arg("我今天去超市买水果")
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs an HTTP service"));
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();

    cloze(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fill-in-the-blank exercise sessions"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();

    cloze(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cloze"));
}
