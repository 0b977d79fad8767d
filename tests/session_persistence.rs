use std::fs;

use study_scheduler::constants::{HOUR_MS, MINUTE_MS};
use study_scheduler::{
    CollectionId, CollectionSize, Persistence, Recall, SchedulerConfig, StudySession,
};

const T0: i64 = 1_700_000_000_000;

fn open(config: &SchedulerConfig, cards: usize, questions: usize) -> StudySession {
    StudySession::open(
        CollectionId::new("a+"),
        CollectionSize { cards, questions },
        config.schedule.clone(),
        Persistence::open(&config.database_path),
    )
}

fn config_in(dir: &tempfile::TempDir, extra: &str) -> SchedulerConfig {
    let db = dir.path().join("progress").join("study.db");
    let path = dir.path().join("config.json");
    let json = format!(r#"{{ "database_path": {:?} {} }}"#, db.to_string_lossy(), extra);
    fs::write(&path, json).unwrap();
    SchedulerConfig::load(&path).unwrap()
}

#[test]
fn review_history_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, "");

    let mut session = open(&config, 3, 0);
    assert_eq!(session.next_card(T0).unwrap(), Some(0));
    for _ in 0..5 {
        session.grade_card(0, None, true, T0).unwrap();
    }
    session.grade_card(1, Some("ports"), Recall::Missed, T0).unwrap();
    drop(session);

    // the collection grew while the app was closed
    let session = open(&config, 4, 0);
    let top = session.card_state(0).unwrap();
    assert_eq!(top.bucket.level(), 5);
    assert_eq!(top.next_due_at, T0 + 72 * HOUR_MS);
    assert_eq!(session.card_state(1).unwrap().next_due_at, T0 + 5 * MINUTE_MS);
    assert_eq!(session.topic_stats().topics["flashcards"].total, 5);
    assert_eq!(session.topic_stats().topics["ports"].correct, 0);
    assert_eq!(session.due_cards(T0).unwrap(), vec![2, 3]);
    assert_eq!(session.next_card(T0).unwrap(), Some(2));

    // once the weak card comes due it wins over the untouched ones
    assert_eq!(session.next_card(T0 + 6 * MINUTE_MS).unwrap(), Some(1));
}

#[test]
fn configured_schedule_applies() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, r#", "schedule_minutes": [1, 10, 100, 1000, 10000]"#);

    let mut session = open(&config, 1, 0);
    let state = session.grade_card(0, None, true, T0).unwrap();
    assert_eq!(state.next_due_at, T0 + 10 * MINUTE_MS);
}

#[test]
fn quiz_tallies_survive_restart_and_forget_clears_them() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, "");

    let mut session = open(&config, 0, 4);
    let answers = [
        (0, "ports", false),
        (0, "ports", false),
        (2, "security", false),
        (2, "security", false),
        (2, "security", false),
        (3, "hardware", false),
        (1, "hardware", true),
        (0, "ports", false),
    ];
    for (index, topic, correct) in answers {
        session.answer_question(index, Some(topic), correct).unwrap();
    }
    drop(session);

    let session = open(&config, 0, 4);
    assert_eq!(session.quiz_order(), vec![0, 2, 3, 1]);
    assert_eq!(session.weak_topics(), vec!["ports", "security", "hardware"]);
    assert_eq!(session.mastery_percent(), 17);
    session.forget();

    let session = open(&config, 0, 4);
    assert_eq!(session.quiz_order(), vec![0, 1, 2, 3]);
    assert_eq!(session.mastery_percent(), 0);
}

#[test]
fn corrupt_storage_behaves_like_first_session() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, "");

    let mut session = open(&config, 2, 0);
    session.grade_card(0, None, true, T0).unwrap();
    drop(session);

    let conn = rusqlite::Connection::open(&config.database_path).unwrap();
    conn.execute(
        "UPDATE kv_store SET value = 'garbage' WHERE key = 'srs:a+'",
        [],
    )
    .unwrap();
    drop(conn);

    let session = open(&config, 2, 0);
    assert_eq!(session.due_cards(T0).unwrap(), vec![0, 1]);
    assert_eq!(session.next_card(T0).unwrap(), Some(0));
}
