//! Book instance (copy) management pages

use axum::{
    extract::State,
    response::Response,
    Json,
};
use axum_extra::extract::{Form, FormRejection};
use uuid::Uuid;

use crate::{
    error::AppResult,
    forms::FormPage,
    models::{book::book_url, book_instance::BookInstanceForm},
    AppState,
};

use super::{form_data, render_form, Caller, PathId};

#[utoipa::path(
    get,
    path = "/catalog/book/{id}/instance/create/",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Copy form", body = FormPage<BookInstanceForm>),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_form(
    State(state): State<AppState>,
    caller: Caller,
    PathId(book_id): PathId<i32>,
) -> AppResult<Json<FormPage<BookInstanceForm>>> {
    caller.require_mark_returned()?;
    let page = state.services.catalog.instance_create_form(book_id).await?;
    Ok(Json(page))
}

/// Add a copy of a book
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/instance/create/",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body(content = BookInstanceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Created, redirect to the book page"),
        (status = 200, description = "Form with errors", body = FormPage<BookInstanceForm>),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_instance(
    State(state): State<AppState>,
    caller: Caller,
    PathId(book_id): PathId<i32>,
    form: Result<Form<BookInstanceForm>, FormRejection>,
) -> AppResult<Response> {
    caller.require_mark_returned()?;
    let outcome = state
        .services
        .catalog
        .create_instance(book_id, form_data(form)?)
        .await?;
    Ok(render_form(outcome, |_| book_url(book_id)))
}

#[utoipa::path(
    get,
    path = "/catalog/bookinstance/{id}/update/",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Copy form", body = FormPage<BookInstanceForm>),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn update_form(
    State(state): State<AppState>,
    caller: Caller,
    PathId(id): PathId<Uuid>,
) -> AppResult<Json<FormPage<BookInstanceForm>>> {
    caller.require_mark_returned()?;
    let page = state.services.catalog.instance_update_form(id).await?;
    Ok(Json(page))
}

/// Update a copy's imprint, status, due date or borrower
#[utoipa::path(
    post,
    path = "/catalog/bookinstance/{id}/update/",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    request_body(content = BookInstanceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Updated, redirect to the book page"),
        (status = 200, description = "Form with errors", body = FormPage<BookInstanceForm>),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn update_instance(
    State(state): State<AppState>,
    caller: Caller,
    PathId(id): PathId<Uuid>,
    form: Result<Form<BookInstanceForm>, FormRejection>,
) -> AppResult<Response> {
    caller.require_mark_returned()?;
    let outcome = state.services.catalog.update_instance(id, form_data(form)?).await?;
    Ok(render_form(outcome, |saved| match saved.instance.book_id {
        Some(book_id) => book_url(book_id),
        None => "/catalog/borrowed/".to_string(),
    }))
}
