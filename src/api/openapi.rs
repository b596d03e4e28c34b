//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, people};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelfkeeper API",
        version = "1.0.0",
        description = "Library catalog and lending API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::create_book,
        books::new_book,
        books::edit_book,
        books::show_book,
        books::update_book,
        books::assign_book,
        books::release_book,
        books::delete_book,
        books::search_page,
        books::search_results,
        // People
        people::list_people,
        people::create_person,
        people::new_person,
        people::edit_person,
        people::show_person,
        people::held_books,
        people::update_person,
        people::delete_person,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookForm,
            crate::models::book::BookQuery,
            crate::models::book::BookDetails,
            crate::models::book::BookSearch,
            crate::models::book::AssignBook,
            books::BookFormView,
            books::SearchView,
            // People
            crate::models::person::Person,
            crate::models::person::PersonForm,
            crate::models::person::PersonDetails,
            people::PersonFormView,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Catalog and lending"),
        (name = "people", description = "Borrower management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
