//! Route table and request handlers.

use crate::api::auth::Permission;
use crate::api::error::ApiError;
use crate::api::{ApiRequest, Method};
use crate::model::category::{category_labels, CategoryId};
use crate::model::question::{NewQuestion, QuestionId};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::question_repo::QuestionRepository;
use crate::service::trivia_service::{QuizRequest, TriviaService};
use rand::Rng;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    Categories,
    Questions,
    Question(QuestionId),
    CategoryQuestions(CategoryId),
    Quizzes,
}

impl Route {
    /// Permission for `method` on this route; `None` means 405.
    pub(crate) fn required_permission(self, method: Method) -> Option<Permission> {
        match (self, method) {
            (Self::Categories, Method::Get) => Some(Permission::GetCategories),
            (Self::Questions, Method::Get) => Some(Permission::GetQuestions),
            (Self::Questions, Method::Post) => Some(Permission::PostQuestions),
            (Self::Question(_), Method::Delete) => Some(Permission::DeleteQuestions),
            (Self::CategoryQuestions(_), Method::Get) => Some(Permission::GetQuestions),
            (Self::Quizzes, Method::Post) => Some(Permission::PostQuizzes),
            _ => None,
        }
    }
}

/// Matches a request path; ids must be non-negative integers.
pub(crate) fn match_route(path: &str) -> Option<Route> {
    let segments = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>();

    match segments.as_slice() {
        ["categories"] => Some(Route::Categories),
        ["questions"] => Some(Route::Questions),
        ["questions", id] => parse_path_id(id).map(Route::Question),
        ["categories", id, "questions"] => parse_path_id(id).map(Route::CategoryQuestions),
        ["quizzes"] => Some(Route::Quizzes),
        _ => None,
    }
}

pub(crate) fn handle<Q, C, R>(
    service: &TriviaService<Q, C>,
    route: Route,
    request: &ApiRequest,
    rng: &mut R,
) -> Result<Value, ApiError>
where
    Q: QuestionRepository,
    C: CategoryRepository,
    R: Rng + ?Sized,
{
    match (route, request.method) {
        (Route::Categories, Method::Get) => get_categories(service),
        (Route::Questions, Method::Get) => get_questions(service, request),
        (Route::Questions, Method::Post) => create_or_search_question(service, request),
        (Route::Question(id), Method::Delete) => delete_question(service, id),
        (Route::CategoryQuestions(id), Method::Get) => get_questions_by_category(service, id),
        (Route::Quizzes, Method::Post) => get_quiz_question(service, request, rng),
        _ => Err(ApiError::method_not_allowed(format!(
            "{} {}",
            request.method, request.path
        ))),
    }
}

fn get_categories<Q, C>(service: &TriviaService<Q, C>) -> Result<Value, ApiError>
where
    Q: QuestionRepository,
    C: CategoryRepository,
{
    let categories = service.list_categories()?;
    Ok(json!({
        "success": true,
        "categories": category_labels(&categories),
    }))
}

fn get_questions<Q, C>(service: &TriviaService<Q, C>, request: &ApiRequest) -> Result<Value, ApiError>
where
    Q: QuestionRepository,
    C: CategoryRepository,
{
    let page = page_param(request);
    let listing = service.list_questions(page)?;
    // List views key category icons by lowercase label.
    let categories = category_labels(&listing.categories)
        .into_iter()
        .map(|(id, label)| (id, label.to_lowercase()))
        .collect::<BTreeMap<_, _>>();

    Ok(json!({
        "success": true,
        "questions": listing.questions,
        "total_questions": listing.total_questions,
        "categories": categories,
        "current_category": categories,
    }))
}

fn create_or_search_question<Q, C>(
    service: &TriviaService<Q, C>,
    request: &ApiRequest,
) -> Result<Value, ApiError>
where
    Q: QuestionRepository,
    C: CategoryRepository,
{
    let body = require_object_body(request)?;

    if let Some(term) = search_term(body) {
        let questions = service.search_questions(term)?;
        let total_questions = questions.len();
        return Ok(json!({
            "success": true,
            "questions": questions,
            "total_questions": total_questions,
        }));
    }

    let question = new_question_from_body(body)?;
    let created = service.create_question(&question)?;
    Ok(json!({
        "success": true,
        "created": created,
    }))
}

fn delete_question<Q, C>(service: &TriviaService<Q, C>, id: QuestionId) -> Result<Value, ApiError>
where
    Q: QuestionRepository,
    C: CategoryRepository,
{
    let deleted = service.delete_question(id)?;
    Ok(json!({
        "success": true,
        "deleted": deleted,
    }))
}

fn get_questions_by_category<Q, C>(
    service: &TriviaService<Q, C>,
    category_id: CategoryId,
) -> Result<Value, ApiError>
where
    Q: QuestionRepository,
    C: CategoryRepository,
{
    let result = service.questions_in_category(category_id)?;
    let total_questions = result.questions.len();
    Ok(json!({
        "success": true,
        "questions": result.questions,
        "total_questions": total_questions,
        "current_category": result.category_id,
    }))
}

fn get_quiz_question<Q, C, R>(
    service: &TriviaService<Q, C>,
    request: &ApiRequest,
    rng: &mut R,
) -> Result<Value, ApiError>
where
    Q: QuestionRepository,
    C: CategoryRepository,
    R: Rng + ?Sized,
{
    let body = quiz_body(request)?;
    let quiz = QuizRequest {
        previous_question_ids: previous_questions(body.get("previous_questions"))?,
        category_id: quiz_category(body.get("quiz_category"))?,
    };

    let question = service.next_quiz_question(&quiz, rng)?;
    Ok(json!({
        "success": true,
        "question": question,
    }))
}

fn parse_path_id(segment: &str) -> Option<i64> {
    segment
        .parse::<u64>()
        .ok()
        .and_then(|value| i64::try_from(value).ok())
}

/// `page` query parameter; unparseable values fall back to page 1 and
/// non-positive values select the empty page 0.
fn page_param(request: &ApiRequest) -> u32 {
    match request.query.get("page").map(|raw| raw.trim().parse::<i64>()) {
        Some(Ok(page)) => u32::try_from(page).unwrap_or(0),
        _ => 1,
    }
}

fn require_object_body(request: &ApiRequest) -> Result<&Map<String, Value>, ApiError> {
    match request.body.as_ref() {
        Some(Value::Object(map)) if !map.is_empty() => Ok(map),
        Some(Value::Object(_)) | None | Some(Value::Null) => {
            Err(ApiError::bad_request("request body is empty"))
        }
        Some(_) => Err(ApiError::bad_request("request body must be a JSON object")),
    }
}

/// Quiz bodies may be `{}`: no previous questions, all categories.
fn quiz_body(request: &ApiRequest) -> Result<&Map<String, Value>, ApiError> {
    match request.body.as_ref() {
        Some(Value::Object(map)) => Ok(map),
        None | Some(Value::Null) => Err(ApiError::bad_request("request body is missing")),
        Some(_) => Err(ApiError::bad_request("request body must be a JSON object")),
    }
}

/// Only a missing, null or empty `searchTerm` means "no search"; the term is
/// matched as sent, surrounding whitespace included.
fn search_term(body: &Map<String, Value>) -> Option<&str> {
    body.get("searchTerm")
        .and_then(Value::as_str)
        .filter(|term| !term.is_empty())
}

fn new_question_from_body(body: &Map<String, Value>) -> Result<NewQuestion, ApiError> {
    let text = required_str(body, "question")?;
    let answer = required_str(body, "answer")?;
    let category = integer_field(body.get("category"))
        .ok_or_else(|| ApiError::unprocessable("`category` must be an integer"))?;
    let difficulty = integer_field(body.get("difficulty"))
        .and_then(|value| u8::try_from(value).ok())
        .ok_or_else(|| ApiError::unprocessable("`difficulty` must be a small integer"))?;

    let question = NewQuestion::new(text, answer, category, difficulty);
    question
        .validate()
        .map_err(|err| ApiError::unprocessable(err.to_string()))?;
    Ok(question)
}

fn required_str<'a>(body: &'a Map<String, Value>, key: &str) -> Result<&'a str, ApiError> {
    body.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::unprocessable(format!("`{key}` must be a string")))
}

/// Accepts JSON integers and integer strings such as `"3"`.
fn integer_field(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn previous_questions(value: Option<&Value>) -> Result<Vec<QuestionId>, ApiError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                integer_field(Some(item)).ok_or_else(|| {
                    ApiError::bad_request("`previous_questions` must contain integer ids")
                })
            })
            .collect(),
        Some(_) => Err(ApiError::bad_request("`previous_questions` must be an array")),
    }
}

/// `quiz_category.id` of `0`, `"0"`, null or missing plays all categories.
fn quiz_category(value: Option<&Value>) -> Result<Option<CategoryId>, ApiError> {
    let id = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(category)) => match category.get("id") {
            None | Some(Value::Null) => return Ok(None),
            Some(raw) => integer_field(Some(raw)),
        },
        Some(raw) => integer_field(Some(raw)),
    };

    match id {
        Some(0) => Ok(None),
        Some(id) => Ok(Some(id)),
        None => Err(ApiError::bad_request("`quiz_category.id` must be an integer")),
    }
}
