//! Question repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Supply the id-ordered question snapshot consumed by the selector.
//! - Provide create/delete/get APIs over `questions` storage.
//!
//! # Invariants
//! - `fetch_all_questions` is always ordered by `id ASC`.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Foreign-key and check failures surface as `RepoError::Constraint`.

use crate::db::migrations::{latest_version, missing_tables, schema_state, SchemaState};
use crate::db::DbError;
use crate::model::question::{NewQuestion, Question, QuestionId, QuestionValidationError};
use log::info;
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const QUESTION_SELECT_SQL: &str = "SELECT
    id,
    question,
    answer,
    category,
    difficulty
FROM questions";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by question and category persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(QuestionValidationError),
    Db(DbError),
    QuestionNotFound(QuestionId),
    /// SQLite rejected a write (foreign key, check or not-null constraint).
    Constraint(String),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::QuestionNotFound(id) => write!(f, "question not found: {id}"),
            Self::Constraint(message) => write!(f, "constraint violation: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QuestionValidationError> for RepoError {
    fn from(value: QuestionValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Self::Constraint(message.clone().unwrap_or_else(|| failure.to_string()))
            }
            _ => Self::Db(DbError::Sqlite(value)),
        }
    }
}

/// Record store contract for questions.
pub trait QuestionRepository {
    /// Returns every question ordered by id ascending.
    fn fetch_all_questions(&self) -> RepoResult<Vec<Question>>;
    fn get_question(&self, id: QuestionId) -> RepoResult<Option<Question>>;
    fn count_questions(&self) -> RepoResult<usize>;
    /// Validates and inserts one question, returning its assigned id.
    fn create_question(&self, question: &NewQuestion) -> RepoResult<QuestionId>;
    /// Deletes one question; `QuestionNotFound` when no row matched.
    fn delete_question(&self, id: QuestionId) -> RepoResult<()>;
}

/// SQLite-backed question repository.
pub struct SqliteQuestionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteQuestionRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl QuestionRepository for SqliteQuestionRepository<'_> {
    fn fetch_all_questions(&self) -> RepoResult<Vec<Question>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{QUESTION_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut questions = Vec::new();

        while let Some(row) = rows.next()? {
            questions.push(parse_question_row(row)?);
        }

        Ok(questions)
    }

    fn get_question(&self, id: QuestionId) -> RepoResult<Option<Question>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{QUESTION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_question_row(row)?));
        }

        Ok(None)
    }

    fn count_questions(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM questions;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative question count `{count}`")))
    }

    fn create_question(&self, question: &NewQuestion) -> RepoResult<QuestionId> {
        question.validate()?;

        self.conn.execute(
            "INSERT INTO questions (
                question,
                answer,
                category,
                difficulty
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                question.text.as_str(),
                question.answer.as_str(),
                question.category,
                i64::from(question.difficulty),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(
            "event=question_create module=repo status=ok question_id={id} category_id={}",
            question.category
        );
        Ok(id)
    }

    fn delete_question(&self, id: QuestionId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM questions WHERE id = ?1;", params![id])?;

        if changed == 0 {
            return Err(RepoError::QuestionNotFound(id));
        }

        info!("event=question_delete module=repo status=ok question_id={id}");
        Ok(())
    }
}

fn parse_question_row(row: &Row<'_>) -> RepoResult<Question> {
    let id: QuestionId = row.get("id")?;
    let raw_difficulty: i64 = row.get("difficulty")?;
    let difficulty = u8::try_from(raw_difficulty).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid difficulty `{raw_difficulty}` in questions.difficulty for id {id}"
        ))
    })?;

    let question = Question {
        id,
        text: row.get("question")?,
        answer: row.get("answer")?,
        category: row.get("category")?,
        difficulty,
    };
    question
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("question {id}: {err}")))?;
    Ok(question)
}

/// Verifies the schema is current and every trivia table exists.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    match schema_state(conn)? {
        SchemaState::Current => {}
        SchemaState::Behind { found } | SchemaState::Ahead { found } => {
            return Err(RepoError::UninitializedConnection {
                expected_version: latest_version(),
                actual_version: found,
            });
        }
    }

    if let Some(table) = missing_tables(conn)?.first() {
        return Err(RepoError::MissingRequiredTable(*table));
    }
    Ok(())
}
