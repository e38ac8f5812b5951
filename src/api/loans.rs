//! Loan pages: borrowed copies and the librarian renewal form

use axum::{
    extract::{Query, State},
    response::Response,
    Json,
};
use axum_extra::extract::{Form, FormRejection};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstanceDetail, RenewBookForm, RenewalPage},
        pagination::{ListPage, PageQuery},
    },
    services, AppState,
};

use super::{form_data, render_form, AuthenticatedUser, Caller, PathId};

/// Copies on loan to the current user
#[utoipa::path(
    get,
    path = "/catalog/mybooks/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Copies on loan to the caller, by due date", body = ListPage<BookInstanceDetail>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_books(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ListPage<BookInstanceDetail>>> {
    let page = state
        .services
        .loans
        .my_books(claims.user_id, query.page.as_deref(), services::today())
        .await?;
    Ok(Json(page))
}

/// Every copy on loan
#[utoipa::path(
    get,
    path = "/catalog/borrowed/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Copies on loan, by due date", body = ListPage<BookInstanceDetail>),
        (status = 403, description = "Librarian permission required")
    )
)]
pub async fn all_borrowed(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ListPage<BookInstanceDetail>>> {
    caller.require_mark_returned()?;
    let page = state
        .services
        .loans
        .all_borrowed(query.page.as_deref(), services::today())
        .await?;
    Ok(Json(page))
}

/// Renewal form proposing the default due date
#[utoipa::path(
    get,
    path = "/catalog/book/{id}/renew/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Renewal form", body = RenewalPage),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_form(
    State(state): State<AppState>,
    caller: Caller,
    PathId(id): PathId<Uuid>,
) -> AppResult<Json<RenewalPage>> {
    caller.require_mark_returned()?;
    let page = state.services.loans.renewal_form(id, services::today()).await?;
    Ok(Json(page))
}

/// Set a new due date on a copy
#[utoipa::path(
    post,
    path = "/catalog/book/{id}/renew/",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    request_body(content = RenewBookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Renewed, redirect to /catalog/borrowed/"),
        (status = 200, description = "Form with errors", body = RenewalPage),
        (status = 403, description = "Librarian permission required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_book(
    State(state): State<AppState>,
    caller: Caller,
    PathId(id): PathId<Uuid>,
    form: Result<Form<RenewBookForm>, FormRejection>,
) -> AppResult<Response> {
    caller.require_mark_returned()?;
    let outcome = state
        .services
        .loans
        .renew(id, form_data(form)?, services::today())
        .await?;
    Ok(render_form(outcome, |_| "/catalog/borrowed/".to_string()))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use chrono::{Duration, NaiveDate};
    use uuid::Uuid;

    use crate::{
        api::test_support::*,
        error::AppError,
        models::book_instance::{BookInstance, BookInstanceDetail, LoanFilter, LoanStatus},
        repository::test_support::MockRepository,
        services,
    };

    fn on_loan(id: Uuid, due_back: NaiveDate) -> BookInstanceDetail {
        BookInstanceDetail {
            instance: BookInstance {
                id,
                book_id: Some(1),
                imprint: "Chilton, 1965".into(),
                due_back: Some(due_back),
                status: LoanStatus::OnLoan,
                borrower_id: Some(2),
            },
            book_title: Some("Dune".into()),
            borrower_username: Some("user2".into()),
            is_overdue: false,
        }
    }

    fn renew_uri(id: Uuid) -> String {
        format!("/catalog/book/{}/renew/", id)
    }

    #[tokio::test]
    async fn test_renewal_forbidden_without_permission() {
        let id = Uuid::new_v4();
        let mut repo = MockRepository::new();
        repo.book_instances.expect_get_by_id().never();
        repo.book_instances.expect_set_due_back().never();
        let st = state(repo);
        let reader = token(&st, 2, &[]);

        let response = send(st.clone(), Method::GET, &renew_uri(id), Some(&reader), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(
            st.clone(),
            Method::POST,
            &renew_uri(id),
            Some(&reader),
            Some("renewal_date=2026-01-01"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(st, Method::GET, &renew_uri(id), None, None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_renewal_form_proposes_three_weeks() {
        let id = Uuid::new_v4();
        let today = services::today();
        let mut repo = MockRepository::new();
        repo.book_instances
            .expect_get_by_id()
            .returning(move |id| Ok(on_loan(id, today)));
        let st = state(repo);
        let librarian = librarian_token(&st);

        let response = send(st, Method::GET, &renew_uri(id), Some(&librarian), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        let proposed = (today + Duration::weeks(3)).format("%Y-%m-%d").to_string();
        assert_eq!(body["form"]["renewal_date"], proposed.as_str());
        assert_eq!(body["bookinst"]["id"], id.to_string().as_str());
    }

    #[tokio::test]
    async fn test_valid_renewal_redirects_to_borrowed() {
        let id = Uuid::new_v4();
        let today = services::today();
        let new_date = today + Duration::weeks(1);
        let mut repo = MockRepository::new();
        repo.book_instances
            .expect_get_by_id()
            .returning(move |id| Ok(on_loan(id, today)));
        repo.book_instances
            .expect_set_due_back()
            .withf(move |target, due| *target == id && *due == new_date)
            .times(1)
            .returning(|_, _| Ok(()));
        let st = state(repo);
        let librarian = librarian_token(&st);

        let response = send(
            st,
            Method::POST,
            &renew_uri(id),
            Some(&librarian),
            Some(&format!("renewal_date={}", new_date.format("%Y-%m-%d"))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/catalog/borrowed/");
    }

    #[tokio::test]
    async fn test_renewal_too_far_ahead_is_rerendered() {
        let id = Uuid::new_v4();
        let today = services::today();
        let mut repo = MockRepository::new();
        repo.book_instances
            .expect_get_by_id()
            .returning(move |id| Ok(on_loan(id, today)));
        repo.book_instances.expect_set_due_back().never();
        let st = state(repo);
        let librarian = librarian_token(&st);

        let too_late = today + Duration::weeks(4) + Duration::days(1);
        let response = send(
            st,
            Method::POST,
            &renew_uri(id),
            Some(&librarian),
            Some(&format!("renewal_date={}", too_late.format("%Y-%m-%d"))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(
            body["errors"]["renewal_date"][0],
            "Invalid date - renewal more than 4 weeks ahead"
        );
    }

    #[tokio::test]
    async fn test_renewal_of_unknown_copy_is_not_found() {
        let mut repo = MockRepository::new();
        repo.book_instances
            .expect_get_by_id()
            .returning(|id| Err(AppError::NotFound(format!("Book instance {} not found", id))));
        let st = state(repo);
        let librarian = librarian_token(&st);

        let response = send(st, Method::GET, &renew_uri(Uuid::new_v4()), Some(&librarian), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_my_books_requires_login() {
        let response = send(state(MockRepository::new()), Method::GET, "/catalog/mybooks/", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_my_books_lists_callers_loans() {
        let mut repo = MockRepository::new();
        repo.book_instances
            .expect_count_filtered()
            .withf(|filter| *filter == LoanFilter::on_loan_to(2))
            .returning(|_| Ok(1));
        repo.book_instances
            .expect_list_filtered()
            .returning(|_, _, _| Ok(vec![on_loan(Uuid::new_v4(), services::today())]));
        let st = state(repo);
        let reader = token(&st, 2, &[]);

        let response = send(st, Method::GET, "/catalog/mybooks/", Some(&reader), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["object_list"][0]["status"], "o");
        assert_eq!(body["object_list"][0]["book_title"], "Dune");
    }

    #[tokio::test]
    async fn test_borrowed_requires_permission() {
        let st = state(MockRepository::new());
        let reader = token(&st, 2, &[]);
        let response = send(st, Method::GET, "/catalog/borrowed/", Some(&reader), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
