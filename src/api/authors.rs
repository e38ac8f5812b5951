//! Author pages

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
        author::{Author, AuthorDetail, AuthorForm},
        pagination::{ListPage, PageQuery},
    },
    AppState,
};

use super::{form_data, found, render_form, Caller, PathId};

/// List authors, ten per page
#[utoipa::path(
    get,
    path = "/catalog/authors/",
    tag = "authors",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of authors", body = ListPage<Author>),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ListPage<Author>>> {
    let page = state.services.catalog.list_authors(query.page.as_deref()).await?;
    Ok(Json(page))
}

/// Author with their books
#[utoipa::path(
    get,
    path = "/catalog/author/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = AuthorDetail),
        (status = 404, description = "Author not found")
    )
)]
pub async fn author_detail(
    State(state): State<AppState>,
    PathId(id): PathId<i32>,
) -> AppResult<Json<AuthorDetail>> {
    let detail = state.services.catalog.author_detail(id).await?;
    Ok(Json(detail))
}

/// Blank author form
#[utoipa::path(
    get,
    path = "/catalog/author/create/",
    tag = "authors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Author form", body = FormPage<AuthorForm>),
        (status = 403, description = "Librarian permission required")
    )
)]
pub async fn create_form(
    State(state): State<AppState>,
    caller: Caller,
) -> AppResult<Json<FormPage<AuthorForm>>> {
    caller.require_mark_returned()?;
    Ok(Json(state.services.catalog.author_create_form()))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/catalog/author/create/",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body(content = AuthorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Created, redirect to the author page"),
        (status = 200, description = "Form with errors", body = FormPage<AuthorForm>),
        (status = 403, description = "Librarian permission required")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    caller: Caller,
    form: Result<Form<AuthorForm>, FormRejection>,
) -> AppResult<Response> {
    caller.require_mark_returned()?;
    let outcome = state.services.catalog.create_author(form_data(form)?).await?;
    Ok(render_form(outcome, Author::get_absolute_url))
}

/// Author form filled with the stored values
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/update/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author form", body = FormPage<AuthorForm>),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_form(
    State(state): State<AppState>,
    caller: Caller,
    PathId(id): PathId<i32>,
) -> AppResult<Json<FormPage<AuthorForm>>> {
    caller.require_mark_returned()?;
    let page = state.services.catalog.author_update_form(id).await?;
    Ok(Json(page))
}

/// Update an author
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/update/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    request_body(content = AuthorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Updated, redirect to the author page"),
        (status = 200, description = "Form with errors", body = FormPage<AuthorForm>),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    caller: Caller,
    PathId(id): PathId<i32>,
    form: Result<Form<AuthorForm>, FormRejection>,
) -> AppResult<Response> {
    caller.require_mark_returned()?;
    let outcome = state.services.catalog.update_author(id, form_data(form)?).await?;
    Ok(render_form(outcome, Author::get_absolute_url))
}

/// Deletion confirmation page
#[utoipa::path(
    get,
    path = "/catalog/author/{id}/delete/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author to delete", body = Author),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_confirm(
    State(state): State<AppState>,
    caller: Caller,
    PathId(id): PathId<i32>,
) -> AppResult<Json<Author>> {
    caller.require_mark_returned()?;
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Delete an author; their books are kept without an author
#[utoipa::path(
    post,
    path = "/catalog/author/{id}/delete/",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 302, description = "Deleted, redirect to the author list"),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    caller: Caller,
    PathId(id): PathId<i32>,
) -> AppResult<Response> {
    caller.require_mark_returned()?;
    state.services.catalog.delete_author(id).await?;
    Ok(found("/catalog/authors/"))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::{
        api::test_support::*,
        error::AppError,
        models::author::Author,
        repository::test_support::MockRepository,
    };

    fn author(id: i32) -> Author {
        Author {
            id,
            first_name: "Big".into(),
            last_name: "Bob".into(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    #[tokio::test]
    async fn test_author_detail() {
        let mut repo = MockRepository::new();
        repo.authors.expect_get_by_id().returning(|id| Ok(author(id)));
        repo.books.expect_list_by_author().returning(|_| Ok(vec![]));

        let response = send(state(repo), Method::GET, "/catalog/author/1", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["author"]["last_name"], "Bob");
        assert_eq!(body["books"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn test_missing_author_is_not_found() {
        let mut repo = MockRepository::new();
        repo.authors
            .expect_get_by_id()
            .returning(|id| Err(AppError::NotFound(format!("Author with id {} not found", id))));

        let response = send(state(repo), Method::GET, "/catalog/author/404", None, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_author_list_pagination() {
        let mut repo = MockRepository::new();
        repo.authors.expect_count().returning(|| Ok(13));
        repo.authors
            .expect_list()
            .returning(|_, _| Ok((11..=13).map(author).collect()));

        let response = send(state(repo), Method::GET, "/catalog/authors/?page=2", None, None).await;
        let body = json(response).await;
        assert_eq!(body["is_paginated"], true);
        assert_eq!(body["page_obj"]["number"], 2);
        assert_eq!(body["object_list"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_create_form_requires_librarian() {
        let st = state(MockRepository::new());
        let reader = token(&st, 2, &[]);
        let response = send(st, Method::GET, "/catalog/author/create/", Some(&reader), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_form_initial_date_of_birth() {
        let st = state(MockRepository::new());
        let librarian = librarian_token(&st);
        let response = send(st, Method::GET, "/catalog/author/create/", Some(&librarian), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["form"]["date_of_birth"], "1970-01-30");
    }

    #[tokio::test]
    async fn test_create_author_redirects_to_detail() {
        let mut repo = MockRepository::new();
        repo.authors.expect_create().returning(|_| Ok(author(8)));
        let st = state(repo);
        let librarian = librarian_token(&st);

        let response = send(
            st,
            Method::POST,
            "/catalog/author/create/",
            Some(&librarian),
            Some("first_name=Big&last_name=Bob&date_of_birth=&date_of_death="),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/catalog/author/8");
    }

    #[tokio::test]
    async fn test_create_author_rerenders_invalid_form() {
        let st = state(MockRepository::new());
        let librarian = librarian_token(&st);

        let response = send(
            st,
            Method::POST,
            "/catalog/author/create/",
            Some(&librarian),
            Some("first_name=&last_name=Bob&date_of_birth=someday"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["errors"]["first_name"][0], "This field is required.");
        assert_eq!(body["errors"]["date_of_birth"][0], "Enter a valid date.");
        assert_eq!(body["form"]["last_name"], "Bob");
    }

    #[tokio::test]
    async fn test_delete_author_redirects_to_list() {
        let mut repo = MockRepository::new();
        repo.authors.expect_get_by_id().returning(|id| Ok(author(id)));
        repo.authors.expect_delete().times(1).returning(|_| Ok(()));
        let st = state(repo);
        let librarian = librarian_token(&st);

        let response = send(st, Method::POST, "/catalog/author/3/delete/", Some(&librarian), None).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/catalog/authors/");
    }
}
