//! Home page endpoints

use axum::{extract::State, response::Response, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use crate::{error::AppResult, services::home::HomeSummary, AppState};

use super::found;

/// Redirect the site root to the catalog home page
#[utoipa::path(
    get,
    path = "/",
    tag = "catalog",
    responses(
        (status = 302, description = "Redirect to /catalog/")
    )
)]
pub async fn root_redirect() -> Response {
    found("/catalog/")
}

/// Catalog home page with record counts and the session visit counter
#[utoipa::path(
    get,
    path = "/catalog/",
    tag = "catalog",
    responses(
        (status = 200, description = "Home page context", body = HomeSummary)
    )
)]
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<HomeSummary>)> {
    let cookie_name = state.config.session.cookie_name.clone();
    let session_id = jar
        .get(&cookie_name)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
        .unwrap_or_else(Uuid::new_v4);

    let session = state.services.sessions.load(session_id).await?;
    let (summary, session) = state.services.home.summary(session).await?;
    state.services.sessions.save(session_id, &session).await?;

    let cookie = Cookie::build((cookie_name, session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((jar.add(cookie), Json(summary)))
}
