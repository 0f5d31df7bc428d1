use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::books::list_books,
        api::books::add_book,
        api::books::update_progress,
    ),
    components(
        schemas(
            crate::models::book::Book,
            crate::services::book_service::LoadData,
            crate::services::book_service::ProgressForm,
            crate::services::book_service::AddBookForm,
        )
    ),
    tags(
        (name = "pagemark", description = "Reading progress API")
    )
)]
pub struct ApiDoc;
