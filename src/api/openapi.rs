//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, genres, health, home, instances, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Local Library API",
        version = "1.0.0",
        description = "Library catalog, availability and loan renewal pages",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Home
        home::root_redirect,
        home::index,
        // Authors
        authors::list_authors,
        authors::author_detail,
        authors::create_form,
        authors::create_author,
        authors::update_form,
        authors::update_author,
        authors::delete_confirm,
        authors::delete_author,
        // Books
        books::list_books,
        books::book_detail,
        books::create_form,
        books::create_book,
        books::update_form,
        books::update_book,
        books::delete_confirm,
        books::delete_book,
        // Genres
        genres::list_genres,
        genres::create_form,
        genres::create_genre,
        // Book instances
        instances::create_form,
        instances::create_instance,
        instances::update_form,
        instances::update_instance,
        // Loans
        loans::my_books,
        loans::all_borrowed,
        loans::renew_form,
        loans::renew_book,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Catalog
            crate::services::home::HomeSummary,
            crate::models::author::Author,
            crate::models::author::AuthorDetail,
            crate::models::author::AuthorForm,
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookDetail,
            crate::models::book::BookForm,
            crate::models::genre::Genre,
            crate::models::genre::GenreForm,
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::BookInstanceDetail,
            crate::models::book_instance::BookInstanceForm,
            crate::models::book_instance::LoanStatus,
            crate::models::book_instance::RenewBookForm,
            crate::models::book_instance::RenewalPage,
            crate::models::pagination::PageObj,
            crate::models::user::Permission,
            // Forms
            crate::forms::FieldErrors,
            crate::forms::Choice,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "catalog", description = "Home page"),
        (name = "authors", description = "Author pages and forms"),
        (name = "books", description = "Book pages and forms"),
        (name = "genres", description = "Genre pages and forms"),
        (name = "instances", description = "Book copy management"),
        (name = "loans", description = "Borrowed copies and renewals")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
