use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::services::book_service::{self, AddBookError, AddBookForm, LoadData, ProgressForm};

#[utoipa::path(
    get,
    path = "/api/books",
    responses(
        (status = 200, description = "All books, or an error flag", body = LoadData)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> Json<LoadData> {
    Json(book_service::load(state.book_repo.as_ref()).await)
}

#[utoipa::path(
    post,
    path = "/api/books/progress",
    request_body(content = ProgressForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Outcome carried in the `error` and `reason` fields")
    )
)]
pub async fn update_progress(
    State(state): State<AppState>,
    form: Result<Form<ProgressForm>, FormRejection>,
) -> impl IntoResponse {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            tracing::debug!("Unreadable progress form: {}", rejection);
            return Json(json!({ "error": true, "reason": "Missing fields" }));
        }
    };

    match book_service::update_progress(state.book_repo.as_ref(), form).await {
        Ok(_) => Json(json!({ "error": false })),
        Err(e) => {
            tracing::debug!("Progress update rejected ({}): {}", e.code(), e);
            Json(json!({ "error": true, "reason": e.reason() }))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/books",
    request_body(content = AddBookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Book added"),
        (status = 400, description = "Invalid form field"),
        (status = 409, description = "ISBN already registered"),
        (status = 500, description = "Database error")
    )
)]
pub async fn add_book(
    State(state): State<AppState>,
    form: Result<Form<AddBookForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            tracing::debug!("Unreadable add-book form: {}", rejection);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": true, "message": "Missing fields" })),
            )
                .into_response();
        }
    };

    match book_service::add_book(state.book_repo.as_ref(), form).await {
        Ok(id) => {
            tracing::info!("Book {} added", id);
            Json(json!({ "success": true })).into_response()
        }
        Err(e) => (
            add_book_status(&e),
            Json(json!({ "error": true, "message": e.message() })),
        )
            .into_response(),
    }
}

fn add_book_status(e: &AddBookError) -> StatusCode {
    match e {
        AddBookError::Store(DomainError::DuplicateIsbn) => StatusCode::CONFLICT,
        AddBookError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}
