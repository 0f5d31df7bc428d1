use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use pagemark::api;
use pagemark::db;
use pagemark::infrastructure::AppState;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test database and router sharing it
async fn setup_test_app() -> (Router, DatabaseConnection) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let app = Router::new().nest("/api", api::api_router(AppState::new(db.clone())));
    (app, db)
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn load(app: &Router) -> Value {
    let req = Request::builder()
        .uri("/api/books")
        .method("GET")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    json
}

async fn add_first_book(app: &Router) -> i64 {
    let (status, json) = send(
        app,
        form_request(
            "/api/books",
            "isbn=111&title=A&author=X&total_pages=100&cover_url=",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "success": true }));

    load(app).await["books"][0]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup_test_app().await;
    let req = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "pagemark");
    assert_eq!(json["books"], 0);

    add_first_book(&app).await;
    let req = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (_, json) = send(&app, req).await;
    assert_eq!(json["books"], 1);
}

#[tokio::test]
async fn test_health_check_degraded_on_malformed_row() {
    let (app, db) = setup_test_app().await;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "INSERT INTO Books (title, author, isbn, total_pages, cover_url) \
         VALUES ('T', 'A', '1', 'abc', '')"
            .to_owned(),
    ))
    .await
    .unwrap();

    let req = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["reason"], "parse_error");
}

#[tokio::test]
async fn test_load_empty_library() {
    let (app, _) = setup_test_app().await;
    let json = load(&app).await;
    assert_eq!(json["error"], false);
    assert_eq!(json["books"], serde_json::json!([]));
}

#[tokio::test]
async fn test_add_book_starts_unread() {
    let (app, _) = setup_test_app().await;
    add_first_book(&app).await;

    let json = load(&app).await;
    let book = &json["books"][0];
    assert_eq!(book["isbn"], "111");
    assert_eq!(book["title"], "A");
    assert_eq!(book["author"], "X");
    assert_eq!(book["total_pages"], 100);
    assert_eq!(book["current_page"], 0);
    assert_eq!(book["started_at"], "");
    assert_eq!(book["finished_at"], "");
    assert_eq!(book["cover_url"], "");
}

#[tokio::test]
async fn test_duplicate_isbn_conflicts_and_leaves_table_unchanged() {
    let (app, _) = setup_test_app().await;
    add_first_book(&app).await;

    let (status, json) = send(
        &app,
        form_request("/api/books", "isbn=111&title=B&author=Y&total_pages=20"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], true);
    assert_eq!(json["message"], "Book with this ISBN already exists");

    let json = load(&app).await;
    let books = json["books"].as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "A");
}

#[tokio::test]
async fn test_finishing_book_sets_finished_at() {
    let (app, _) = setup_test_app().await;
    let id = add_first_book(&app).await;

    let (status, json) = send(
        &app,
        form_request(
            "/api/books/progress",
            &format!("id={}&current_page=100", id),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "error": false }));

    let json = load(&app).await;
    let book = &json["books"][0];
    assert_eq!(book["current_page"], 100);
    assert!(!book["finished_at"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_finished_at_survives_moving_back() {
    let (app, _) = setup_test_app().await;
    let id = add_first_book(&app).await;

    send(
        &app,
        form_request("/api/books/progress", &format!("id={}&current_page=100", id)),
    )
    .await;
    let finished_at = load(&app).await["books"][0]["finished_at"].clone();

    let (_, json) = send(
        &app,
        form_request("/api/books/progress", &format!("id={}&current_page=40", id)),
    )
    .await;
    assert_eq!(json["error"], false);

    let json = load(&app).await;
    assert_eq!(json["books"][0]["current_page"], 40);
    assert_eq!(json["books"][0]["finished_at"], finished_at);
}

#[tokio::test]
async fn test_reset_to_zero_stamps_started_at() {
    let (app, _) = setup_test_app().await;
    let id = add_first_book(&app).await;

    send(
        &app,
        form_request("/api/books/progress", &format!("id={}&current_page=0", id)),
    )
    .await;

    let json = load(&app).await;
    let started_at = json["books"][0]["started_at"].as_str().unwrap();
    assert!(!started_at.is_empty());
}

#[tokio::test]
async fn test_progress_beyond_total_is_rejected() {
    let (app, _) = setup_test_app().await;
    let id = add_first_book(&app).await;

    let (status, json) = send(
        &app,
        form_request(
            "/api/books/progress",
            &format!("id={}&current_page=150", id),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["error"], true);
    assert_eq!(json["reason"], "Invalid current_page");

    let json = load(&app).await;
    assert_eq!(json["books"][0]["current_page"], 0);
    assert_eq!(json["books"][0]["finished_at"], "");
}

#[tokio::test]
async fn test_progress_on_wrongly_typed_row_is_database_error() {
    let (app, db) = setup_test_app().await;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "INSERT INTO Books (title, author, isbn, total_pages, cover_url) \
         VALUES ('T', 'A', '1', 'abc', '')"
            .to_owned(),
    ))
    .await
    .unwrap();

    let (status, json) = send(
        &app,
        form_request("/api/books/progress", "id=1&current_page=0"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["error"], true);
    assert_eq!(json["reason"], "Database error");
}

#[tokio::test]
async fn test_malformed_row_fails_whole_listing() {
    let (app, db) = setup_test_app().await;
    add_first_book(&app).await;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "INSERT INTO Books (title, author, isbn, total_pages, cover_url) \
         VALUES ('', 'Nobody', '222', 10, '')"
            .to_owned(),
    ))
    .await
    .unwrap();

    let json = load(&app).await;
    assert_eq!(json["error"], true);
    assert_eq!(json["books"], Value::Null);
}
