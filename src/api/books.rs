//! Book pages

use axum::{
    extract::{Query, State},
    response::Response,
    Json,
};
use axum_extra::extract::{Form, FormRejection};

use crate::{
    error::AppResult,
    forms::FormPage,
    models::{
        book::{Book, BookDetail, BookForm, BookSummary},
        pagination::{ListPage, PageQuery},
    },
    services, AppState,
};

use super::{form_data, found, render_form, Caller, PathId};

/// List books, three per page
#[utoipa::path(
    get,
    path = "/catalog/books/",
    tag = "books",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of books", body = ListPage<BookSummary>),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ListPage<BookSummary>>> {
    let page = state.services.catalog.list_books(query.page.as_deref()).await?;
    Ok(Json(page))
}

/// Book with its author, genres and copies
#[utoipa::path(
    get,
    path = "/catalog/book/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_detail(
    State(state): State<AppState>,
    PathId(id): PathId<i32>,
) -> AppResult<Json<BookDetail>> {
    let detail = state.services.catalog.book_detail(id, services::today()).await?;
    Ok(Json(detail))
}

/// Blank book form with author and genre choices
#[utoipa::path(
    get,
    path = "/catalog/book/create/",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Book form", body = FormPage<BookForm>),
        (status = 403, description = "Librarian permission required")
    )
)]
pub async fn create_form(
    State(state): State<AppState>,
    caller: Caller,
) -> AppResult<Json<FormPage<BookForm>>> {
    caller.require_mark_returned()?;
    let page = state.services.catalog.book_create_form().await?;
    Ok(Json(page))
}

/// Create a book; `genre` may be repeated
#[utoipa::path(
    post,
    path = "/catalog/book/create/",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Created, redirect to the book page"),
        (status = 200, description = "Form with errors", body = FormPage<BookForm>),
        (status = 403, description = "Librarian permission required")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    caller: Caller,
    form: Result<Form<BookForm>, FormRejection>,
) -> AppResult<Response> {
    caller.require_mark_returned()?;
    let outcome = state.services.catalog.create_book(form_data(form)?).await?;
    Ok(render_form(outcome, Book::get_absolute_url))
}

#[utoipa::path(
    get,
    path = "/catalog/book/{id}/update/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book form", body = FormPage<BookForm>),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_form(
    State(state): State<AppState>,
    caller: Caller,
    PathId(id): PathId<i32>,
) -> AppResult<Json<FormPage<BookForm>>> {
    caller.require_mark_returned()?;
    let page = state.services.catalog.book_update_form(id).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/catalog/book/{id}/update/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Updated, redirect to the book page"),
        (status = 200, description = "Form with errors", body = FormPage<BookForm>),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    caller: Caller,
    PathId(id): PathId<i32>,
    form: Result<Form<BookForm>, FormRejection>,
) -> AppResult<Response> {
    caller.require_mark_returned()?;
    let outcome = state.services.catalog.update_book(id, form_data(form)?).await?;
    Ok(render_form(outcome, Book::get_absolute_url))
}

#[utoipa::path(
    get,
    path = "/catalog/book/{id}/delete/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book to delete", body = Book),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_confirm(
    State(state): State<AppState>,
    caller: Caller,
    PathId(id): PathId<i32>,
) -> AppResult<Json<Book>> {
    caller.require_mark_returned()?;
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Delete a book; its copies are kept, detached from it
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/delete/",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 302, description = "Deleted, redirect to the book list"),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    caller: Caller,
    PathId(id): PathId<i32>,
) -> AppResult<Response> {
    caller.require_mark_returned()?;
    state.services.catalog.delete_book(id).await?;
    Ok(found("/catalog/books/"))
}
