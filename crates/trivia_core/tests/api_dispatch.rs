use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;
use serde_json::{json, Value};
use trivia_core::db::open_db_in_memory;
use trivia_core::db::seed::seed_default_categories;
use trivia_core::{
    ApiRequest, ApiResponse, AuthGuard, Dispatcher, Method, NewQuestion, QuestionRepository,
    SqliteCategoryRepository, SqliteQuestionRepository, StaticTokenVerifier, TriviaService,
};

type SqliteTriviaService<'conn> =
    TriviaService<SqliteQuestionRepository<'conn>, SqliteCategoryRepository<'conn>>;

fn seeded_conn() -> Connection {
    let mut conn = open_db_in_memory().unwrap();
    seed_default_categories(&mut conn).unwrap();
    {
        let repo = SqliteQuestionRepository::try_new(&conn).unwrap();
        let fixtures = [
            ("What boxer's original name is Cassius Clay?", "Muhammad Ali", 4, 1),
            ("What continent is America in?", "America", 3, 2),
            ("Largest planet?", "Jupiter", 1, 2),
            ("Who painted the Mona Lisa?", "Da Vinci", 2, 3),
        ];
        for (text, answer, category, difficulty) in fixtures {
            repo.create_question(&NewQuestion::new(text, answer, category, difficulty))
                .unwrap();
        }
        for index in 0..10 {
            repo.create_question(&NewQuestion::new(
                format!("Filler science question {index}"),
                "filler",
                1,
                1,
            ))
            .unwrap();
        }
    }
    conn
}

fn service(conn: &Connection) -> SqliteTriviaService<'_> {
    TriviaService::new(
        SqliteQuestionRepository::try_new(conn).unwrap(),
        SqliteCategoryRepository::try_new(conn).unwrap(),
    )
}

type SqliteDispatcher<'svc, 'conn> =
    Dispatcher<'svc, SqliteQuestionRepository<'conn>, SqliteCategoryRepository<'conn>>;

fn send(dispatcher: &SqliteDispatcher<'_, '_>, request: ApiRequest) -> ApiResponse {
    let mut rng = StdRng::seed_from_u64(17);
    dispatcher.dispatch(&request, &mut rng)
}

fn assert_error(response: &ApiResponse, status: u16, message: &str) {
    assert_eq!(response.status, status, "{}", response.body);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"], status);
    assert_eq!(response.body["message"], message);
}

#[test]
fn get_categories_returns_id_to_label_map() {
    let conn = seeded_conn();
    let service = service(&conn);
    let dispatcher = Dispatcher::new(&service);

    let response = send(&dispatcher, ApiRequest::get("/categories"));
    assert_eq!(response.status, 200);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["categories"]["1"], "Science");
    assert_eq!(response.body["categories"]["6"], "Sports");
}

#[test]
fn post_to_categories_is_method_not_allowed() {
    let conn = seeded_conn();
    let service = service(&conn);
    let dispatcher = Dispatcher::new(&service);

    let response = send(&dispatcher, ApiRequest::post("/categories", json!({"a": 1})));
    assert_error(&response, 405, "method not allowed");
}

#[test]
fn get_questions_paginates_and_reports_context() {
    let conn = seeded_conn();
    let service = service(&conn);
    let dispatcher = Dispatcher::new(&service);

    let response = send(&dispatcher, ApiRequest::get("/questions"));
    assert_eq!(response.status, 200);
    assert_eq!(response.body["questions"].as_array().unwrap().len(), 10);
    assert_eq!(response.body["total_questions"], 14);
    assert_eq!(response.body["categories"]["2"], "art");
    assert_eq!(
        response.body["questions"][0]["question"],
        "What boxer's original name is Cassius Clay?"
    );

    let second = send(&dispatcher, ApiRequest::get("/questions?page=2"));
    assert_eq!(second.body["questions"].as_array().unwrap().len(), 4);
}

#[test]
fn get_questions_page_out_of_range_is_not_found() {
    let conn = seeded_conn();
    let service = service(&conn);
    let dispatcher = Dispatcher::new(&service);

    let response = send(&dispatcher, ApiRequest::get("/questions?page=1000000"));
    assert_error(&response, 404, "resource not found");

    let typo = send(&dispatcher, ApiRequest::get("/questios?page=1"));
    assert_error(&typo, 404, "resource not found");
}

#[test]
fn delete_question_then_delete_again_is_not_found() {
    let conn = seeded_conn();
    let service = service(&conn);
    let dispatcher = Dispatcher::new(&service);

    let response = send(&dispatcher, ApiRequest::delete("/questions/2"));
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({"success": true, "deleted": 2}));

    let again = send(&dispatcher, ApiRequest::delete("/questions/2"));
    assert_error(&again, 404, "resource not found");

    let zero = send(&dispatcher, ApiRequest::delete("/questions/0"));
    assert_error(&zero, 404, "resource not found");
}

#[test]
fn post_question_creates_and_accepts_string_category() {
    let conn = seeded_conn();
    let service = service(&conn);
    let dispatcher = Dispatcher::new(&service);

    let response = send(
        &dispatcher,
        ApiRequest::post(
            "/questions",
            json!({
                "question": "Which river is the longest?",
                "answer": "Nile",
                "difficulty": 2,
                "category": "3",
            }),
        ),
    );
    assert_eq!(response.status, 200, "{}", response.body);
    let created = response.body["created"].as_i64().unwrap();

    let stored = SqliteQuestionRepository::try_new(&conn)
        .unwrap()
        .get_question(created)
        .unwrap()
        .unwrap();
    assert_eq!(stored.category, 3);
    assert_eq!(stored.answer, "Nile");
}

#[test]
fn post_question_with_empty_body_is_bad_request() {
    let conn = seeded_conn();
    let service = service(&conn);
    let dispatcher = Dispatcher::new(&service);

    let missing = send(&dispatcher, ApiRequest::new(Method::Post, "/questions"));
    assert_error(&missing, 400, "bad request");

    let empty = send(&dispatcher, ApiRequest::post("/questions", json!({})));
    assert_error(&empty, 400, "bad request");
}

#[test]
fn post_question_with_invalid_fields_is_unprocessable() {
    let conn = seeded_conn();
    let service = service(&conn);
    let dispatcher = Dispatcher::new(&service);

    for body in [
        json!({"question": "No answer?", "difficulty": 1, "category": 1}),
        json!({"question": "Too hard?", "answer": "yes", "difficulty": 10, "category": 1}),
        json!({"question": "Unknown category?", "answer": "yes", "difficulty": 1, "category": 99}),
        json!({"question": "Empty search falls through", "searchTerm": ""}),
    ] {
        let response = send(&dispatcher, ApiRequest::post("/questions", body));
        assert_error(&response, 422, "unprocessable");
    }
}

#[test]
fn search_questions_is_case_insensitive() {
    let conn = seeded_conn();
    let service = service(&conn);
    let dispatcher = Dispatcher::new(&service);

    let response = send(
        &dispatcher,
        ApiRequest::post("/questions", json!({"searchTerm": "BOX"})),
    );
    assert_eq!(response.status, 200);
    let questions = response.body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0]["answer"], "Muhammad Ali");

    let none = send(
        &dispatcher,
        ApiRequest::post("/questions", json!({"searchTerm": "paralelepipedo"})),
    );
    assert_error(&none, 404, "resource not found");
}

#[test]
fn search_term_is_matched_as_sent() {
    let conn = seeded_conn();
    let service = service(&conn);
    let dispatcher = Dispatcher::new(&service);

    let spaces = send(
        &dispatcher,
        ApiRequest::post("/questions", json!({"searchTerm": " "})),
    );
    assert_eq!(spaces.status, 200, "{}", spaces.body);
    assert_eq!(spaces.body["total_questions"], 14);

    let padded = send(
        &dispatcher,
        ApiRequest::post("/questions", json!({"searchTerm": "in? "})),
    );
    assert_error(&padded, 404, "resource not found");

    let exact = send(
        &dispatcher,
        ApiRequest::post("/questions", json!({"searchTerm": "in?"})),
    );
    assert_eq!(exact.status, 200);
    assert_eq!(exact.body["questions"][0]["id"], 2);
}

#[test]
fn questions_by_category_returns_current_category() {
    let conn = seeded_conn();
    let service = service(&conn);
    let dispatcher = Dispatcher::new(&service);

    let response = send(&dispatcher, ApiRequest::get("/categories/1/questions"));
    assert_eq!(response.status, 200);
    assert_eq!(response.body["current_category"], 1);
    let questions = response.body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 11);
    assert!(questions.iter().all(|question| question["category"] == 1));

    let missing = send(&dispatcher, ApiRequest::get("/categories/0/questions"));
    assert_error(&missing, 404, "resource not found");
}

#[test]
fn quiz_returns_unseen_question_in_category() {
    let conn = seeded_conn();
    let service = service(&conn);
    let dispatcher = Dispatcher::new(&service);

    let response = send(
        &dispatcher,
        ApiRequest::post(
            "/quizzes",
            json!({"previous_questions": [], "quiz_category": {"id": "3", "type": "Geography"}}),
        ),
    );
    assert_eq!(response.status, 200);
    assert_eq!(response.body["question"]["id"], 2);

    let exhausted = send(
        &dispatcher,
        ApiRequest::post(
            "/quizzes",
            json!({"previous_questions": [2], "quiz_category": {"id": 3}}),
        ),
    );
    assert_eq!(exhausted.status, 200);
    assert_eq!(exhausted.body["question"], Value::Null);
}

#[test]
fn quiz_all_categories_excludes_previous_questions() {
    let conn = seeded_conn();
    let service = service(&conn);
    let dispatcher = Dispatcher::new(&service);
    let previous = (1..=13).collect::<Vec<i64>>();

    let response = send(
        &dispatcher,
        ApiRequest::post(
            "/quizzes",
            json!({"previous_questions": previous, "quiz_category": {"id": 0, "type": "click"}}),
        ),
    );
    assert_eq!(response.status, 200);
    assert_eq!(response.body["question"]["id"], 14);
}

#[test]
fn quiz_with_unknown_category_or_bad_payload_fails() {
    let conn = seeded_conn();
    let service = service(&conn);
    let dispatcher = Dispatcher::new(&service);

    let unknown = send(
        &dispatcher,
        ApiRequest::post("/quizzes", json!({"quiz_category": {"id": 1000}})),
    );
    assert_error(&unknown, 404, "resource not found");

    let bad = send(
        &dispatcher,
        ApiRequest::post("/quizzes", json!({"previous_questions": "1,2"})),
    );
    assert_error(&bad, 400, "bad request");
}

#[test]
fn quiz_with_empty_object_plays_all_categories() {
    let conn = seeded_conn();
    let service = service(&conn);
    let dispatcher = Dispatcher::new(&service);

    let response = send(&dispatcher, ApiRequest::post("/quizzes", json!({})));
    assert_eq!(response.status, 200, "{}", response.body);
    assert!(response.body["question"]["id"].is_i64());

    let missing = send(&dispatcher, ApiRequest::new(Method::Post, "/quizzes"));
    assert_error(&missing, 400, "bad request");
}

#[test]
fn guarded_dispatcher_checks_permissions_per_route() {
    let conn = seeded_conn();
    let service = service(&conn);
    let verifier = StaticTokenVerifier::new()
        .with_token("player", "quiz-player", &["get:categories", "post:quizzes"])
        .unwrap();
    let dispatcher = Dispatcher::new(&service).with_guard(AuthGuard::new(verifier));

    let anonymous = send(&dispatcher, ApiRequest::get("/categories"));
    assert_error(&anonymous, 401, "unauthorized");

    let allowed = send(
        &dispatcher,
        ApiRequest::get("/categories").with_authorization("Bearer player"),
    );
    assert_eq!(allowed.status, 200);

    let denied = send(
        &dispatcher,
        ApiRequest::delete("/questions/1").with_authorization("Bearer player"),
    );
    assert_error(&denied, 403, "forbidden");

    let forged = send(
        &dispatcher,
        ApiRequest::get("/categories").with_authorization("Bearer forged"),
    );
    assert_error(&forged, 401, "unauthorized");
}
