//! Genre pages

use axum::{extract::State, response::Response, Json};
use axum_extra::extract::{Form, FormRejection};

use crate::{
    error::AppResult,
    forms::FormPage,
    models::genre::{Genre, GenreForm},
    AppState,
};

use super::{form_data, render_form, Caller};

/// All genres by name
#[utoipa::path(
    get,
    path = "/catalog/genres/",
    tag = "genres",
    responses(
        (status = 200, description = "Genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.catalog.list_genres().await?;
    Ok(Json(genres))
}

#[utoipa::path(
    get,
    path = "/catalog/genre/create/",
    tag = "genres",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Genre form", body = FormPage<GenreForm>),
        (status = 403, description = "Librarian permission required")
    )
)]
pub async fn create_form(
    State(state): State<AppState>,
    caller: Caller,
) -> AppResult<Json<FormPage<GenreForm>>> {
    caller.require_mark_returned()?;
    Ok(Json(state.services.catalog.genre_create_form()))
}

#[utoipa::path(
    post,
    path = "/catalog/genre/create/",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body(content = GenreForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Created, redirect to the genre list"),
        (status = 200, description = "Form with errors", body = FormPage<GenreForm>),
        (status = 403, description = "Librarian permission required")
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    caller: Caller,
    form: Result<Form<GenreForm>, FormRejection>,
) -> AppResult<Response> {
    caller.require_mark_returned()?;
    let outcome = state.services.catalog.create_genre(form_data(form)?).await?;
    Ok(render_form(outcome, |_| "/catalog/genres/".to_string()))
}
