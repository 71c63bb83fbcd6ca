use rusqlite::Connection;
use trivia_core::db::open_db_in_memory;
use trivia_core::db::seed::seed_default_categories;
use trivia_core::{
    CategoryRepository, NewQuestion, QuestionRepository, QuestionValidationError, RepoError,
    SqliteCategoryRepository, SqliteQuestionRepository,
};

fn seeded_conn() -> Connection {
    let mut conn = open_db_in_memory().unwrap();
    seed_default_categories(&mut conn).unwrap();
    conn
}

#[test]
fn create_and_get_roundtrip() {
    let conn = seeded_conn();
    let repo = SqliteQuestionRepository::try_new(&conn).unwrap();

    let id = repo
        .create_question(&NewQuestion::new("Largest planet?", "Jupiter", 1, 2))
        .unwrap();

    let loaded = repo.get_question(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.text, "Largest planet?");
    assert_eq!(loaded.answer, "Jupiter");
    assert_eq!(loaded.category, 1);
    assert_eq!(loaded.difficulty, 2);
    assert!(repo.get_question(id + 100).unwrap().is_none());
}

#[test]
fn fetch_all_questions_is_ordered_by_id() {
    let conn = seeded_conn();
    let repo = SqliteQuestionRepository::try_new(&conn).unwrap();

    let mut created = Vec::new();
    for (index, category) in [3, 1, 2, 1].into_iter().enumerate() {
        created.push(
            repo.create_question(&NewQuestion::new(
                format!("question {index}"),
                "answer",
                category,
                1,
            ))
            .unwrap(),
        );
    }

    let ids = repo
        .fetch_all_questions()
        .unwrap()
        .into_iter()
        .map(|question| question.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, created);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(repo.count_questions().unwrap(), 4);
}

#[test]
fn unknown_category_is_a_constraint_violation() {
    let conn = seeded_conn();
    let repo = SqliteQuestionRepository::try_new(&conn).unwrap();

    let err = repo
        .create_question(&NewQuestion::new("Orphan?", "yes", 99, 1))
        .unwrap_err();
    assert!(matches!(err, RepoError::Constraint(_)), "{err}");
    assert_eq!(repo.count_questions().unwrap(), 0);
}

#[test]
fn validation_failure_blocks_create() {
    let conn = seeded_conn();
    let repo = SqliteQuestionRepository::try_new(&conn).unwrap();

    let err = repo
        .create_question(&NewQuestion::new("Too hard?", "yes", 1, 9))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(QuestionValidationError::DifficultyOutOfRange(9))
    ));
}

#[test]
fn delete_removes_row_and_reports_missing_ids() {
    let conn = seeded_conn();
    let repo = SqliteQuestionRepository::try_new(&conn).unwrap();
    let id = repo
        .create_question(&NewQuestion::new("Gone soon?", "yes", 2, 1))
        .unwrap();

    repo.delete_question(id).unwrap();
    assert!(repo.get_question(id).unwrap().is_none());

    let err = repo.delete_question(id).unwrap_err();
    assert!(matches!(err, RepoError::QuestionNotFound(missing) if missing == id));
}

#[test]
fn invalid_persisted_rows_are_rejected_on_read() {
    let conn = seeded_conn();
    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute(
        "INSERT INTO questions (question, answer, category, difficulty) VALUES ('q', 'a', 1, 42);",
        [],
    )
    .unwrap();

    let repo = SqliteQuestionRepository::try_new(&conn).unwrap();
    let err = repo.fetch_all_questions().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)), "{err}");
}

#[test]
fn categories_are_listed_by_id_and_created() {
    let conn = seeded_conn();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();

    let categories = repo.fetch_all_categories().unwrap();
    assert_eq!(categories.len(), 6);
    assert_eq!(categories[0].label, "Science");
    assert_eq!(categories[5].label, "Sports");

    let id = repo.create_category("  Music ").unwrap();
    let music = repo.get_category(id).unwrap().unwrap();
    assert_eq!(music.label, "Music");
    assert!(repo.get_category(999).unwrap().is_none());
    assert!(matches!(
        repo.create_category("   "),
        Err(RepoError::Constraint(_))
    ));
}
