//! Tests for the SQLite game repository.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::NamedTempFile;

use pictionary::{
    FixedWord, GameEngine, GameError, GameId, GameRepository, GameSession, GameSettings, GameStatus,
    GameStore, GameUpdate, GuessEntry, ManualClock, PlaceholderDrawing, Rendering, StoreError,
    UpdateOutcome,
};

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and a ready repository.
fn setup_test_db() -> (NamedTempFile, GameRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let repo = GameRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");
    (db_file, repo)
}

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53)
        .single()
        .expect("valid time")
}

fn new_session(id: &str) -> GameSession {
    GameSession::start(
        GameId::from(id),
        "ice cream".to_string(),
        Rendering::from("<svg/>".to_string()),
        GameSettings::default(),
        start_time(),
    )
}

fn guess_update(text: &str, attempts: u32, secs: i64) -> GameUpdate {
    GameUpdate::default()
        .with_attempts(attempts)
        .with_append_guess(GuessEntry::new(
            text.to_string(),
            start_time() + Duration::seconds(secs),
            false,
        ))
}

#[test]
fn test_insert_and_find_game() {
    let (_db, repo) = setup_test_db();
    let session = new_session("game-1");
    repo.insert_game(&session).expect("Insert failed");

    let found = repo
        .find_game(&GameId::from("game-1"))
        .expect("Query failed")
        .expect("Game missing");
    assert_eq!(found, session);
}

#[test]
fn test_find_unknown_game() {
    let (_db, repo) = setup_test_db();
    let found = repo.find_game(&GameId::from("nope")).expect("Query failed");
    assert!(found.is_none());
}

#[test]
fn test_duplicate_insert_fails() {
    let (_db, repo) = setup_test_db();
    repo.insert_game(&new_session("dup")).expect("First insert failed");
    let result = repo.insert_game(&new_session("dup"));
    assert!(result.is_err(), "Duplicate id should fail");
}

#[test]
fn test_update_bumps_version_and_appends_guess() {
    let (_db, repo) = setup_test_db();
    repo.insert_game(&new_session("g")).expect("Insert failed");
    let id = GameId::from("g");

    let outcome = repo
        .update_game(&id, 0, &guess_update("cake", 1, 5))
        .expect("Update failed");
    assert_eq!(outcome, UpdateOutcome::Applied { version: 1 });

    let found = repo.find_game(&id).expect("Query failed").expect("Game missing");
    assert_eq!(*found.version(), 1);
    assert_eq!(*found.attempts(), 1);
    assert_eq!(*found.status(), GameStatus::Active);
    assert_eq!(found.guesses().len(), 1);
    assert_eq!(found.guesses()[0].text(), "cake");
}

#[test]
fn test_stale_update_writes_nothing() {
    let (_db, repo) = setup_test_db();
    repo.insert_game(&new_session("g")).expect("Insert failed");
    let id = GameId::from("g");

    repo.update_game(&id, 0, &guess_update("cake", 1, 5))
        .expect("First update failed");
    let outcome = repo
        .update_game(&id, 0, &guess_update("pizza", 1, 6))
        .expect("Second update failed");
    assert_eq!(outcome, UpdateOutcome::Stale);

    let found = repo.find_game(&id).expect("Query failed").expect("Game missing");
    assert_eq!(found.guesses().len(), 1);
    assert_eq!(*found.attempts(), 1);
}

#[test]
fn test_update_unknown_game() {
    let (_db, repo) = setup_test_db();
    let outcome = repo
        .update_game(&GameId::from("ghost"), 0, &guess_update("cake", 1, 5))
        .expect("Update failed");
    assert_eq!(outcome, UpdateOutcome::Missing);
}

#[test]
fn test_guesses_kept_in_submission_order() {
    let (_db, repo) = setup_test_db();
    repo.insert_game(&new_session("g")).expect("Insert failed");
    let id = GameId::from("g");

    for (n, text) in ["zebra", "apple", "moon"].iter().enumerate() {
        let version = n as u64;
        repo.update_game(&id, version, &guess_update(text, version as u32 + 1, n as i64))
            .expect("Update failed");
    }

    let found = repo.find_game(&id).expect("Query failed").expect("Game missing");
    let texts: Vec<&str> = found.guesses().iter().map(|g| g.text().as_str()).collect();
    assert_eq!(texts, vec!["zebra", "apple", "moon"]);
    assert_eq!(*found.version(), 3);
}

#[test]
fn test_status_and_score_persist() {
    let (_db, repo) = setup_test_db();
    repo.insert_game(&new_session("g")).expect("Insert failed");
    let id = GameId::from("g");

    let update = GameUpdate::default()
        .with_status(GameStatus::Won)
        .with_score(96);
    repo.update_game(&id, 0, &update).expect("Update failed");

    let found = repo.find_game(&id).expect("Query failed").expect("Game missing");
    assert_eq!(*found.status(), GameStatus::Won);
    assert_eq!(*found.score(), 96);
    assert_eq!(found.revealed_word(), Some("ice cream"));
}

#[test]
fn test_empty_path_rejected() {
    assert!(GameRepository::new("  ".to_string()).is_err());
}

#[tokio::test]
async fn test_store_trait_reports_conflict() {
    let (_db, repo) = setup_test_db();
    let session = new_session("g");
    repo.put(&session).await.expect("Put failed");
    let id = GameId::from("g");

    let version = repo
        .update(&id, 0, guess_update("cake", 1, 5))
        .await
        .expect("Update failed");
    assert_eq!(version, 1);

    let err = repo
        .update(&id, 0, guess_update("pizza", 1, 6))
        .await
        .expect_err("Stale write should fail");
    assert!(matches!(err, StoreError::Conflict { expected_version: 0, .. }));
}

#[tokio::test]
async fn test_store_trait_reports_missing() {
    let (_db, repo) = setup_test_db();
    let err = repo
        .update(&GameId::from("ghost"), 0, guess_update("cake", 1, 5))
        .await
        .expect_err("Unknown game should fail");
    assert!(matches!(err, StoreError::Missing(_)));
}

#[tokio::test]
async fn test_engine_plays_against_sqlite() {
    let (_db, repo) = setup_test_db();
    let clock = Arc::new(ManualClock::new(start_time()));
    let engine = GameEngine::new(Arc::new(repo.clone()), Arc::new(PlaceholderDrawing::default()))
        .with_words(Arc::new(FixedWord::new("cat".to_string())))
        .with_clock(clock.clone());

    let game = engine.create_game().await.expect("Create failed");
    clock.advance(Duration::seconds(10));
    engine
        .submit_guess(&game.game_id, "dog")
        .await
        .expect("Guess failed");
    clock.advance(Duration::seconds(20));
    let outcome = engine
        .submit_guess(&game.game_id, "  CAT ")
        .await
        .expect("Guess failed");

    assert!(outcome.correct);
    assert_eq!(outcome.status, GameStatus::Won);
    // 100 - 2*10 + (120 - 30)/10
    assert_eq!(outcome.score, Some(89));

    let stored = repo
        .find_game(&game.game_id)
        .expect("Query failed")
        .expect("Game missing");
    assert_eq!(*stored.version(), 2);
    assert_eq!(stored.guesses().len(), 2);
    assert_eq!(stored.guesses()[1].text(), "  CAT ");
}

#[tokio::test]
async fn test_limits_beyond_column_range_are_refused() {
    let (_db, repo) = setup_test_db();
    let engine = GameEngine::new(Arc::new(repo.clone()), Arc::new(PlaceholderDrawing::default()))
        .with_settings(GameSettings::new(3_000_000_000, 120));

    let err = engine
        .create_game()
        .await
        .expect_err("Oversized limit must not be stored");
    assert!(matches!(err, GameError::Store(_)));

    let oversized = GameSession::start(
        GameId::from("big"),
        "cat".to_string(),
        Rendering::from("<svg/>".to_string()),
        GameSettings::new(3_000_000_000, 120),
        start_time(),
    );
    assert!(repo.insert_game(&oversized).is_err());
    assert!(repo.find_game(&GameId::from("big")).expect("Query failed").is_none());
}
