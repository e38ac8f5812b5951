//! Repository layer for database operations
//!
//! Each entity is reached through a store trait so that services can be exercised
//! against mocks; the PostgreSQL implementations live in the submodules.

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorData},
        book::{Book, BookData, BookSummary},
        book_instance::{BookInstanceData, BookInstanceDetail, LoanFilter, LoanStatus},
        genre::Genre,
        user::{NewUser, User},
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenreStore: Send + Sync {
    /// All genres ordered by name
    async fn list(&self) -> AppResult<Vec<Genre>>;
    async fn get_by_ids(&self, ids: &[i32]) -> AppResult<Vec<Genre>>;
    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<Genre>>;
    async fn create(&self, name: &str) -> AppResult<Genre>;
    async fn count(&self) -> AppResult<i64>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorStore: Send + Sync {
    /// Authors ordered by last name then first name
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Author>>;
    async fn list_all(&self) -> AppResult<Vec<Author>>;
    async fn count(&self) -> AppResult<i64>;
    async fn get_by_id(&self, id: i32) -> AppResult<Author>;
    async fn exists(&self, id: i32) -> AppResult<bool>;
    async fn create(&self, data: &AuthorData) -> AppResult<Author>;
    async fn update(&self, id: i32, data: &AuthorData) -> AppResult<Author>;
    /// Books of the deleted author keep existing without an author
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<BookSummary>>;
    async fn list_all(&self) -> AppResult<Vec<Book>>;
    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>>;
    async fn count(&self) -> AppResult<i64>;
    /// Books whose title contains `term`, ignoring case
    async fn count_title_contains(&self, term: &str) -> AppResult<i64>;
    async fn get_by_id(&self, id: i32) -> AppResult<Book>;
    async fn create(&self, data: &BookData) -> AppResult<Book>;
    async fn update(&self, id: i32, data: &BookData) -> AppResult<Book>;
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstanceStore: Send + Sync {
    async fn count(&self) -> AppResult<i64>;
    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstanceDetail>;
    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstanceDetail>>;
    /// Matching copies ordered by due date, copies without one last
    async fn list_filtered(
        &self,
        filter: &LoanFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BookInstanceDetail>>;
    async fn count_filtered(&self, filter: &LoanFilter) -> AppResult<i64>;
    async fn create(&self, book_id: i32, data: &BookInstanceData) -> AppResult<BookInstanceDetail>;
    async fn update(&self, id: Uuid, data: &BookInstanceData) -> AppResult<BookInstanceDetail>;
    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: i32) -> AppResult<User>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn exists(&self, id: i32) -> AppResult<bool>;
    /// Active users ordered by username
    async fn list_active(&self) -> AppResult<Vec<User>>;
    async fn create(&self, user: &NewUser) -> AppResult<User>;
    /// Round-trip to the database
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding one store per entity
#[derive(Clone)]
pub struct Repository {
    pub genres: Arc<dyn GenreStore>,
    pub authors: Arc<dyn AuthorStore>,
    pub books: Arc<dyn BookStore>,
    pub book_instances: Arc<dyn BookInstanceStore>,
    pub users: Arc<dyn UserStore>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            genres: Arc::new(genres::GenresRepository::new(pool.clone())),
            authors: Arc::new(authors::AuthorsRepository::new(pool.clone())),
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            book_instances: Arc::new(book_instances::BookInstancesRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool)),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Stores left unconfigured panic on any call
    pub struct MockRepository {
        pub genres: MockGenreStore,
        pub authors: MockAuthorStore,
        pub books: MockBookStore,
        pub book_instances: MockBookInstanceStore,
        pub users: MockUserStore,
    }

    impl MockRepository {
        pub fn new() -> Self {
            Self {
                genres: MockGenreStore::new(),
                authors: MockAuthorStore::new(),
                books: MockBookStore::new(),
                book_instances: MockBookInstanceStore::new(),
                users: MockUserStore::new(),
            }
        }

        pub fn build(self) -> Repository {
            Repository {
                genres: Arc::new(self.genres),
                authors: Arc::new(self.authors),
                books: Arc::new(self.books),
                book_instances: Arc::new(self.book_instances),
                users: Arc::new(self.users),
            }
        }
    }
}
