//! Trivia use-case service.
//!
//! # Responsibility
//! - Provide list/search/filter/quiz/create/delete entry points for callers.
//! - Delegate selection to `selector` and persistence to repositories.
//!
//! # Invariants
//! - Selector results are never reinterpreted except empty -> not-found.
//! - Service layer remains storage-agnostic (generic over repository traits).
//! - Quiz exhaustion is a successful `None`, not an error.

use crate::model::category::{Category, CategoryId};
use crate::model::question::{NewQuestion, Question, QuestionId};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::question_repo::{QuestionRepository, RepoError};
use crate::selector::question_selector::{self, DEFAULT_PAGE_SIZE};
use log::{debug, info};
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for trivia use cases.
#[derive(Debug)]
pub enum ServiceError {
    /// The store holds no categories at all.
    NoCategories,
    /// Requested page lies beyond the last question.
    PageNotFound(u32),
    QuestionNotFound(QuestionId),
    CategoryNotFound(CategoryId),
    /// Category exists (or not) but holds no questions.
    EmptyCategory(CategoryId),
    NoSearchResults,
    /// Input was well-formed but rejected by validation or store constraints.
    Unprocessable(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ServiceError {
    /// Whether the failure means "nothing to return" rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoCategories
                | Self::PageNotFound(_)
                | Self::QuestionNotFound(_)
                | Self::CategoryNotFound(_)
                | Self::EmptyCategory(_)
                | Self::NoSearchResults
        )
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCategories => write!(f, "no categories available"),
            Self::PageNotFound(page) => write!(f, "page {page} has no questions"),
            Self::QuestionNotFound(id) => write!(f, "question not found: {id}"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::EmptyCategory(id) => write!(f, "category {id} has no questions"),
            Self::NoSearchResults => write!(f, "no questions matched the search term"),
            Self::Unprocessable(message) => write!(f, "unprocessable: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::QuestionNotFound(id) => Self::QuestionNotFound(id),
            RepoError::Validation(err) => Self::Unprocessable(err.to_string()),
            RepoError::Constraint(message) => Self::Unprocessable(message),
            other => Self::Repo(other),
        }
    }
}

/// One page of the question list plus listing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPage {
    pub page: u32,
    pub questions: Vec<Question>,
    /// Size of the full, unpaginated question list.
    pub total_questions: usize,
    pub page_count: usize,
    pub categories: Vec<Category>,
}

/// Questions of a single category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryQuestions {
    pub category_id: CategoryId,
    pub questions: Vec<Question>,
}

/// Quiz round input: what was already asked and the optional category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizRequest {
    pub previous_question_ids: Vec<QuestionId>,
    /// `None` plays across all categories.
    pub category_id: Option<CategoryId>,
}

/// Use-case service over question and category repositories.
pub struct TriviaService<Q: QuestionRepository, C: CategoryRepository> {
    questions: Q,
    categories: C,
    page_size: usize,
}

impl<Q: QuestionRepository, C: CategoryRepository> TriviaService<Q, C> {
    /// Creates a service with the default page size.
    pub fn new(questions: Q, categories: C) -> Self {
        Self::with_page_size(questions, categories, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(questions: Q, categories: C, page_size: usize) -> Self {
        Self {
            questions,
            categories,
            page_size,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Lists every category by id.
    ///
    /// Returns `NoCategories` when the store is empty.
    pub fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        let categories = self.categories.fetch_all_categories()?;
        if categories.is_empty() {
            return Err(ServiceError::NoCategories);
        }
        Ok(categories)
    }

    /// Returns page `page` (1-based) of all questions ordered by id.
    ///
    /// Returns `PageNotFound` when the page is empty, including page `0`.
    pub fn list_questions(&self, page: u32) -> ServiceResult<QuestionPage> {
        let all_questions = self.questions.fetch_all_questions()?;
        let items = question_selector::list_page(&all_questions, page, self.page_size);
        if items.is_empty() {
            debug!("event=questions_list module=service status=not_found page={page}");
            return Err(ServiceError::PageNotFound(page));
        }

        let questions = items.to_vec();
        let categories = self.categories.fetch_all_categories()?;
        debug!(
            "event=questions_list module=service status=ok page={page} returned={} total={}",
            questions.len(),
            all_questions.len()
        );
        Ok(QuestionPage {
            page,
            questions,
            total_questions: all_questions.len(),
            page_count: question_selector::page_count(all_questions.len(), self.page_size),
            categories,
        })
    }

    /// Deletes a question by id and returns that id.
    pub fn delete_question(&self, id: QuestionId) -> ServiceResult<QuestionId> {
        self.questions.delete_question(id)?;
        info!("event=question_delete module=service status=ok question_id={id}");
        Ok(id)
    }

    /// Validates and stores a new question, returning its id.
    ///
    /// Validation and constraint failures (e.g. unknown category) map to
    /// `Unprocessable`.
    pub fn create_question(&self, question: &NewQuestion) -> ServiceResult<QuestionId> {
        let id = self.questions.create_question(question)?;
        info!("event=question_create module=service status=ok question_id={id}");
        Ok(id)
    }

    /// Case-insensitive substring search over question text.
    ///
    /// Returns `NoSearchResults` when nothing matched.
    pub fn search_questions(&self, term: &str) -> ServiceResult<Vec<Question>> {
        let all_questions = self.questions.fetch_all_questions()?;
        let matches = question_selector::search(&all_questions, term);
        debug!(
            "event=questions_search module=service status=ok matched={} term_len={}",
            matches.len(),
            term.chars().count()
        );
        if matches.is_empty() {
            return Err(ServiceError::NoSearchResults);
        }
        Ok(matches.into_iter().cloned().collect())
    }

    /// Questions in one category.
    ///
    /// Unknown categories and categories without questions both return
    /// `EmptyCategory`.
    pub fn questions_in_category(&self, category_id: CategoryId) -> ServiceResult<CategoryQuestions> {
        let all_questions = self.questions.fetch_all_questions()?;
        let questions = question_selector::by_category(&all_questions, category_id)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        if questions.is_empty() {
            return Err(ServiceError::EmptyCategory(category_id));
        }
        Ok(CategoryQuestions {
            category_id,
            questions,
        })
    }

    /// Picks the next unseen quiz question.
    ///
    /// Returns `Ok(None)` once the quiz is exhausted and `CategoryNotFound`
    /// when the requested category does not exist.
    pub fn next_quiz_question<R>(
        &self,
        request: &QuizRequest,
        rng: &mut R,
    ) -> ServiceResult<Option<Question>>
    where
        R: Rng + ?Sized,
    {
        if let Some(category_id) = request.category_id {
            if self.categories.get_category(category_id)?.is_none() {
                return Err(ServiceError::CategoryNotFound(category_id));
            }
        }

        let all_questions = self.questions.fetch_all_questions()?;
        let picked = question_selector::next_quiz_question(
            &all_questions,
            &request.previous_question_ids,
            request.category_id,
            rng,
        )
        .cloned();

        match &picked {
            Some(question) => debug!(
                "event=quiz_next module=service status=ok question_id={} previous={}",
                question.id,
                request.previous_question_ids.len()
            ),
            None => debug!(
                "event=quiz_next module=service status=exhausted previous={}",
                request.previous_question_ids.len()
            ),
        }
        Ok(picked)
    }
}
