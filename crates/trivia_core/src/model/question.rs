//! Question domain model.
//!
//! # Responsibility
//! - Define the read-side `Question` record and write-side `NewQuestion`.
//! - Validate user input before it reaches persistence.
//!
//! # Invariants
//! - `text` and `answer` are never blank for a valid record.
//! - `difficulty` stays within `MIN_DIFFICULTY..=MAX_DIFFICULTY`.
//! - Records are immutable once read; selection never mutates them.

use crate::model::category::CategoryId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier and ordering key for a question row.
pub type QuestionId = i64;

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 5;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Persisted trivia question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    /// Serialized as `question` to match the wire schema.
    #[serde(rename = "question")]
    pub text: String,
    pub answer: String,
    pub category: CategoryId,
    pub difficulty: u8,
}

impl Question {
    /// Checks the same field rules as [`NewQuestion::validate`].
    ///
    /// Used on read paths so invalid persisted rows are rejected.
    pub fn validate(&self) -> Result<(), QuestionValidationError> {
        validate_fields(&self.text, &self.answer, self.category, self.difficulty)
    }
}

/// Input shape for creating a question; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub text: String,
    pub answer: String,
    pub category: CategoryId,
    pub difficulty: u8,
}

impl NewQuestion {
    /// Creates an input record with whitespace-normalized text and answer.
    pub fn new(
        text: impl AsRef<str>,
        answer: impl AsRef<str>,
        category: CategoryId,
        difficulty: u8,
    ) -> Self {
        Self {
            text: normalize_text(text.as_ref()),
            answer: normalize_text(answer.as_ref()),
            category,
            difficulty,
        }
    }

    pub fn validate(&self) -> Result<(), QuestionValidationError> {
        validate_fields(&self.text, &self.answer, self.category, self.difficulty)
    }
}

/// Field-level validation failures for question input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionValidationError {
    EmptyText,
    EmptyAnswer,
    InvalidCategory(CategoryId),
    DifficultyOutOfRange(u8),
}

impl Display for QuestionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "question text must not be empty"),
            Self::EmptyAnswer => write!(f, "answer must not be empty"),
            Self::InvalidCategory(id) => write!(f, "category id must be positive, got {id}"),
            Self::DifficultyOutOfRange(value) => write!(
                f,
                "difficulty must be within {MIN_DIFFICULTY}..={MAX_DIFFICULTY}, got {value}"
            ),
        }
    }
}

impl Error for QuestionValidationError {}

/// Collapses whitespace runs and trims both ends.
pub fn normalize_text(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

fn validate_fields(
    text: &str,
    answer: &str,
    category: CategoryId,
    difficulty: u8,
) -> Result<(), QuestionValidationError> {
    if text.trim().is_empty() {
        return Err(QuestionValidationError::EmptyText);
    }
    if answer.trim().is_empty() {
        return Err(QuestionValidationError::EmptyAnswer);
    }
    if category <= 0 {
        return Err(QuestionValidationError::InvalidCategory(category));
    }
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        return Err(QuestionValidationError::DifficultyOutOfRange(difficulty));
    }
    Ok(())
}
