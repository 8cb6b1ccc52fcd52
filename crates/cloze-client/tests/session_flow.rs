//! Sessions driven end to end through the client-side services.

use std::path::PathBuf;
use std::sync::Arc;

use cloze_client::{DeckService, MockService};
use cloze_core::deck::parse_deck_str;
use cloze_core::{
    spawn_session, Card, Difficulty, Direction, Filters, Phase, SessionConfig, SessionError,
};

fn cards() -> Vec<Card> {
    vec![
        Card::new("我[MASK]你", "我爱你"),
        Card::new("[MASK]天见", "明天见"),
    ]
}

#[tokio::test]
async fn failed_fetch_then_reload_recovers() {
    let mock = Arc::new(MockService::with_cards(cards()).then_failure("connection refused"));
    let session = spawn_session(mock.clone(), SessionConfig::default());

    session.load_initial().await.unwrap();
    let failed = session.settled().await.unwrap();
    assert_eq!(failed.phase, Phase::Loading);
    assert!(failed.cards.is_empty());
    assert!(matches!(
        failed.error,
        Some(SessionError::FetchFailure {
            retryable: true,
            ..
        })
    ));

    session.reload().await.unwrap();
    let loaded = session.settled().await.unwrap();
    assert_eq!(loaded.phase, Phase::Answering);
    assert_eq!(loaded.cards, cards());
    assert_eq!(loaded.error, None);
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn batch_with_malformed_card_is_rejected() {
    let mock = Arc::new(
        MockService::with_cards(cards())
            .then_cards(vec![Card::new("我[MASK]你", "我爱你"), Card::new("无空", "无空")]),
    );
    let session = spawn_session(mock, SessionConfig::default());

    session.load_initial().await.unwrap();
    let snapshot = session.settled().await.unwrap();
    assert_eq!(snapshot.phase, Phase::Loading);
    assert!(snapshot.cards.is_empty());
    assert!(matches!(
        snapshot.error,
        Some(SessionError::MalformedCard { card_index: 1, .. })
    ));
}

#[tokio::test]
async fn filters_reach_the_service() {
    let mock = Arc::new(MockService::with_cards(cards()));
    let session = spawn_session(
        mock.clone(),
        SessionConfig {
            filters: Filters::new("food".parse().unwrap(), Difficulty::Hard),
            batch_size: 1,
            ..SessionConfig::default()
        },
    );

    session.load_initial().await.unwrap();
    let snapshot = session.settled().await.unwrap();
    assert_eq!(snapshot.cards.len(), 1);

    let request = mock.last_request().unwrap();
    assert_eq!(request.category.as_str(), "food");
    assert_eq!(request.difficulty, Difficulty::Hard);
    assert_eq!(request.count, 1);
}

#[tokio::test]
async fn deck_session_practice_round() {
    let deck = parse_deck_str(
        r#"
[deck]
id = "d"
name = "D"

[[cards]]
masked_text = "我[MASK]你"
original_text = "我爱你"
category = "greeting"

[[cards]]
masked_text = "[MASK]天见"
original_text = "明天见"
category = "greeting"

[[cards]]
masked_text = "[MASK]饭"
original_text = "米饭"
category = "food"
"#,
        &PathBuf::from("d.toml"),
    )
    .unwrap();

    let session = spawn_session(
        Arc::new(DeckService::new(deck)),
        SessionConfig {
            filters: Filters::new("greeting".parse().unwrap(), Difficulty::Medium),
            ..SessionConfig::default()
        },
    );

    session.load_initial().await.unwrap();
    let snapshot = session.settled().await.unwrap();
    assert_eq!(snapshot.cards.len(), 2);

    session.set_answer(0, 0, "爱").await.unwrap();
    session.navigate(Direction::Next).await.unwrap();
    session.set_answer(1, 0, "后").await.unwrap();
    let revealed = session.check().await.unwrap();

    assert_eq!(revealed.phase, Phase::Revealed);
    assert_eq!(revealed.answer(0, 0), "爱");
    assert_eq!(revealed.answer(1, 0), "后");
    assert_eq!(
        revealed.current_card().and_then(Card::expected_answers),
        Some(vec!["明".to_string()])
    );

    // Answers are frozen once revealed.
    let unchanged = session.set_answer(1, 0, "明").await.unwrap();
    assert_eq!(unchanged.version, revealed.version);

    // Reload clears everything and returns to answering.
    session.set_filter(Some("food".parse().unwrap()), None).await.unwrap();
    session.reload().await.unwrap();
    let fresh = session.settled().await.unwrap();
    assert_eq!(fresh.phase, Phase::Answering);
    assert_eq!(fresh.current_index, Some(0));
    assert!(fresh.answers.is_empty());
    assert_eq!(fresh.cards[0].original_text, "米饭");
}
