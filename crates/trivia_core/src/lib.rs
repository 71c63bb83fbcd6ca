//! Core domain logic for the trivia quiz API.
//! Selection, storage, use cases and the request boundary live here; front
//! ends only translate their transport into [`api::ApiRequest`] values.

pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod selector;
pub mod service;

pub use api::auth::{AuthError, AuthGuard, Claims, Permission, StaticTokenVerifier, TokenVerifier};
pub use api::error::ApiError;
pub use api::{ApiRequest, ApiResponse, Dispatcher, Method};
pub use config::{ConfigError, TriviaConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{Category, CategoryId};
pub use model::question::{NewQuestion, Question, QuestionId, QuestionValidationError};
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::question_repo::{
    QuestionRepository, RepoError, RepoResult, SqliteQuestionRepository,
};
pub use selector::question_selector::{
    by_category, list_page, next_quiz_question, page_count, search, DEFAULT_PAGE_SIZE,
};
pub use service::trivia_service::{
    CategoryQuestions, QuestionPage, QuizRequest, ServiceError, ServiceResult, TriviaService,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
