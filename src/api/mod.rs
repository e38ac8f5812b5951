//! HTTP handlers for the Local Library catalog
//!
//! Page handlers answer with the JSON context of the page. Successful form
//! submissions redirect (302) to the next page; rejected ones re-render the form
//! with its field errors.

pub mod auth;
pub mod authors;
pub mod books;
pub mod genres;
pub mod health;
pub mod home;
pub mod instances;
pub mod loans;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::{
        header::{AUTHORIZATION, LOCATION},
        request::Parts,
        StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::{Form, FormRejection};
use serde::{de::DeserializeOwned, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    forms::FormOutcome,
    models::user::{Permission, UserClaims},
    AppState,
};

/// Claims from the bearer token, if a token was sent
fn bearer_claims(parts: &Parts, state: &AppState) -> AppResult<Option<UserClaims>> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let header = header
        .to_str()
        .map_err(|_| AppError::Authentication("Invalid authorization header".to_string()))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

    state.services.auth.decode_token(token).map(Some)
}

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        bearer_claims(parts, state)?
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))
    }
}

/// Extractor for the caller of a page open to anonymous visitors
pub struct Caller(pub Option<UserClaims>);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Caller(bearer_claims(parts, state)?))
    }
}

impl Caller {
    /// Forbidden unless the caller holds `perm`; anonymous callers included
    pub fn require_perm(&self, perm: Permission) -> AppResult<&UserClaims> {
        match &self.0 {
            Some(claims) => {
                claims.require_perm(perm)?;
                Ok(claims)
            }
            None => Err(AppError::Authorization(format!("Permission {} required", perm))),
        }
    }

    /// Librarian capability
    pub fn require_mark_returned(&self) -> AppResult<&UserClaims> {
        self.require_perm(Permission::CanMarkReturned)
    }
}

/// Path parameters; a value that does not parse is an unknown page
pub struct PathId<T>(pub T);

#[async_trait]
impl<T> FromRequestParts<AppState> for PathId<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| PathId(value))
            .map_err(|e| AppError::NotFound(e.body_text()))
    }
}

/// 302 redirect
pub fn found(location: impl Into<String>) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.into())]).into_response()
}

/// Submitted form fields; read after the caller has been authorized
pub fn form_data<T>(form: Result<Form<T>, FormRejection>) -> AppResult<T> {
    form.map(|Form(data)| data)
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Redirect after a saved form, or the form page again with its errors
pub fn render_form<T, P>(outcome: FormOutcome<T, P>, success_url: impl FnOnce(&T) -> String) -> Response
where
    P: Serialize,
{
    match outcome {
        FormOutcome::Saved(saved) => found(success_url(&saved)),
        FormOutcome::Invalid(page) => Json(page).into_response(),
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let catalog = Router::new()
        // Books
        .route("/books/", get(books::list_books))
        .route("/book/:id", get(books::book_detail))
        .route("/book/create/", get(books::create_form).post(books::create_book))
        .route("/book/:id/update/", get(books::update_form).post(books::update_book))
        .route("/book/:id/delete/", get(books::delete_confirm).post(books::delete_book))
        .route("/book/:id/renew/", get(loans::renew_form).post(loans::renew_book))
        .route(
            "/book/:id/instance/create/",
            get(instances::create_form).post(instances::create_instance),
        )
        // Book instances
        .route(
            "/bookinstance/:id/update/",
            get(instances::update_form).post(instances::update_instance),
        )
        // Authors
        .route("/authors/", get(authors::list_authors))
        .route("/author/:id", get(authors::author_detail))
        .route("/author/create/", get(authors::create_form).post(authors::create_author))
        .route("/author/:id/update/", get(authors::update_form).post(authors::update_author))
        .route("/author/:id/delete/", get(authors::delete_confirm).post(authors::delete_author))
        // Genres
        .route("/genres/", get(genres::list_genres))
        .route("/genre/create/", get(genres::create_form).post(genres::create_genre))
        // Loans
        .route("/mybooks/", get(loans::my_books))
        .route("/borrowed/", get(loans::all_borrowed));

    let app = Router::new()
        .route("/", get(home::root_redirect))
        .route("/catalog/", get(home::index))
        .nest("/catalog", catalog)
        // Authentication
        .route("/auth/login", axum::routing::post(auth::login))
        .route("/auth/me", get(auth::me))
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    app.merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
