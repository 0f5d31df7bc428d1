use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::infrastructure::AppState;

/// Liveness plus a read through the repository, so a broken store or a
/// malformed row shows up here before it shows up on the page.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Store readable, book count included"),
        (status = 503, description = "Store unreadable or holds malformed rows")
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.book_repo.get_books().await {
        Ok(books) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "books": books.len(),
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check could not read books: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "service": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                    "reason": e.reason(),
                })),
            )
        }
    }
}
