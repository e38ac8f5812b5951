//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{author::Author, book_instance::BookInstanceDetail, genre::Genre};
use crate::forms::{self, FieldErrors, FieldMeta, ModelForm};

const BOOK_FIELDS: &[FieldMeta] = &[
    FieldMeta {
        name: "title",
        verbose_name: "title",
        max_length: Some(200),
    },
    FieldMeta {
        name: "author",
        verbose_name: "author",
        max_length: None,
    },
    FieldMeta {
        name: "summary",
        verbose_name: "summary",
        max_length: Some(1000),
    },
    FieldMeta {
        name: "isbn",
        verbose_name: "ISBN",
        max_length: Some(13),
    },
    FieldMeta {
        name: "genre",
        verbose_name: "genre",
        max_length: None,
    },
];

/// Book model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    /// Brief description of the book
    pub summary: String,
    /// 13 character ISBN number
    pub isbn: String,
}

impl Book {
    pub fn get_absolute_url(&self) -> String {
        book_url(self.id)
    }
}

pub fn book_url(id: i32) -> String {
    format!("/catalog/book/{}", id)
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Book row for the paginated book list
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    /// "<last_name> <first_name>" of the author, when set
    pub author_name: Option<String>,
    /// First genres of the book, comma separated
    pub display_genre: Option<String>,
}

/// Book detail page context
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetail {
    pub book: Book,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
    pub display_genre: String,
    /// Copies of this book
    pub instances: Vec<BookInstanceDetail>,
}

/// Names of the first three genres, for list display
pub fn display_genre(genres: &[Genre]) -> String {
    genres
        .iter()
        .take(3)
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Cleaned book fields, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookData {
    pub title: String,
    pub author_id: Option<i32>,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<i32>,
}

/// Book create/update form; `genre` is a multi-select (repeated keys)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct BookForm {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub title: String,
    pub author: String,
    #[validate(length(max = 1000, message = "Ensure this value has at most 1000 characters."))]
    pub summary: String,
    #[validate(length(max = 13, message = "Ensure this value has at most 13 characters."))]
    pub isbn: String,
    pub genre: Vec<String>,
}

impl ModelForm for BookForm {
    fn fields() -> &'static [FieldMeta] {
        BOOK_FIELDS
    }
}

impl BookForm {
    /// Syntactic cleaning; the referenced author and genres are checked by the caller
    pub fn clean(&self) -> Result<BookData, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = forms::clean_text("title", &self.title, &mut errors);
        let summary = forms::clean_text("summary", &self.summary, &mut errors);
        let isbn = forms::clean_text("isbn", &self.isbn, &mut errors);
        errors.extend_validation(
            BookForm {
                title: title.clone(),
                summary: summary.clone(),
                isbn: isbn.clone(),
                ..Default::default()
            }
            .validate(),
        );

        let author_id = forms::clean_optional_id("author", &self.author, &mut errors);
        if author_id.is_none() && !errors.has("author") {
            errors.add("author", forms::REQUIRED);
        }

        let mut genre_ids = Vec::new();
        for raw in self.genre.iter().map(|g| g.trim()).filter(|g| !g.is_empty()) {
            match raw.parse::<i32>() {
                Ok(id) if !genre_ids.contains(&id) => genre_ids.push(id),
                Ok(_) => {}
                Err(_) => errors.add("genre", format!("\"{}\" is not a valid value.", raw)),
            }
        }
        if genre_ids.is_empty() && !errors.has("genre") {
            errors.add("genre", forms::REQUIRED);
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(BookData {
            title,
            author_id,
            summary,
            isbn,
            genre_ids,
        })
    }

    pub fn from_book(book: &Book, genres: &[Genre]) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author_id.map(|id| id.to_string()).unwrap_or_default(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genre: genres.iter().map(|g| g.id.to_string()).collect(),
        }
    }
}
