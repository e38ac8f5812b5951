//! Home page summary

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{book_instance::LoanStatus, session::SessionState},
    repository::Repository,
};

/// Home page context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HomeSummary {
    pub num_books: i64,
    pub num_instances: i64,
    /// Copies with status "available"
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_genres: i64,
    /// Books whose title contains the configured keyword
    pub num_books_for_managers: i64,
    /// Visits from this session before the current one
    pub num_visits: u64,
}

#[derive(Clone)]
pub struct HomeService {
    repository: Repository,
    title_keyword: String,
}

impl HomeService {
    pub fn new(repository: Repository, title_keyword: String) -> Self {
        Self {
            repository,
            title_keyword,
        }
    }

    /// Catalog counts for the home page; returns the session with this visit recorded
    pub async fn summary(&self, session: SessionState) -> AppResult<(HomeSummary, SessionState)> {
        let (
            num_books,
            num_instances,
            num_instances_available,
            num_authors,
            num_genres,
            num_books_for_managers,
        ) = tokio::try_join!(
            self.repository.books.count(),
            self.repository.book_instances.count(),
            self.repository.book_instances.count_by_status(LoanStatus::Available),
            self.repository.authors.count(),
            self.repository.genres.count(),
            self.repository.books.count_title_contains(&self.title_keyword),
        )?;

        let (num_visits, session) = session.record_visit();

        Ok((
            HomeSummary {
                num_books,
                num_instances,
                num_instances_available,
                num_authors,
                num_genres,
                num_books_for_managers,
                num_visits,
            },
            session,
        ))
    }
}
