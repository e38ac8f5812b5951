//! Data models for the Local Library catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod pagination;
pub mod session;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorDetail, AuthorForm};
pub use book::{Book, BookDetail, BookForm, BookSummary};
pub use book_instance::{BookInstance, BookInstanceDetail, BookInstanceForm, LoanFilter, LoanStatus, RenewBookForm};
pub use genre::{Genre, GenreForm};
pub use pagination::{ListPage, PageObj, PageQuery};
pub use session::SessionState;
pub use user::{Permission, User, UserClaims};
