//! Catalog service: authors, books, genres and book instances

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::AppResult,
    forms::{self, Choice, FieldErrors, FormOutcome, FormPage},
    models::{
        author::{Author, AuthorDetail, AuthorForm},
        book::{display_genre, Book, BookData, BookDetail, BookForm, BookSummary},
        book_instance::{BookInstanceDetail, BookInstanceForm, LoanStatus},
        genre::{Genre, GenreForm},
        pagination::{ListPage, PageObj},
    },
    repository::Repository,
};

pub const AUTHORS_PER_PAGE: i64 = 10;
pub const BOOKS_PER_PAGE: i64 = 3;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // ---- Authors ----

    pub async fn list_authors(&self, page: Option<&str>) -> AppResult<ListPage<Author>> {
        let count = self.repository.authors.count().await?;
        let page_obj = PageObj::resolve(page, AUTHORS_PER_PAGE, count)?;
        let authors = self
            .repository
            .authors
            .list(page_obj.limit(), page_obj.offset())
            .await?;
        Ok(ListPage::new(authors, page_obj))
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    /// Author with the books credited to them
    pub async fn author_detail(&self, id: i32) -> AppResult<AuthorDetail> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.list_by_author(id).await?;
        Ok(AuthorDetail { author, books })
    }

    pub fn author_create_form(&self) -> FormPage<AuthorForm> {
        FormPage::new(AuthorForm::initial())
    }

    pub async fn author_update_form(&self, id: i32) -> AppResult<FormPage<AuthorForm>> {
        let author = self.repository.authors.get_by_id(id).await?;
        Ok(FormPage::new(AuthorForm::from(&author)))
    }

    pub async fn create_author(
        &self,
        form: AuthorForm,
    ) -> AppResult<FormOutcome<Author, FormPage<AuthorForm>>> {
        let data = match form.clean() {
            Ok(data) => data,
            Err(errors) => return Ok(FormOutcome::Invalid(FormPage::with_errors(form, errors))),
        };
        let author = self.repository.authors.create(&data).await?;
        tracing::info!("Created author {} ({})", author.id, author);
        Ok(FormOutcome::Saved(author))
    }

    pub async fn update_author(
        &self,
        id: i32,
        form: AuthorForm,
    ) -> AppResult<FormOutcome<Author, FormPage<AuthorForm>>> {
        self.repository.authors.get_by_id(id).await?;
        let data = match form.clean() {
            Ok(data) => data,
            Err(errors) => return Ok(FormOutcome::Invalid(FormPage::with_errors(form, errors))),
        };
        let author = self.repository.authors.update(id, &data).await?;
        tracing::info!("Updated author {}", author.id);
        Ok(FormOutcome::Saved(author))
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        let author = self.repository.authors.get_by_id(id).await?;
        self.repository.authors.delete(id).await?;
        tracing::info!("Deleted author {} ({})", id, author);
        Ok(())
    }

    // ---- Books ----

    pub async fn list_books(&self, page: Option<&str>) -> AppResult<ListPage<BookSummary>> {
        let count = self.repository.books.count().await?;
        let page_obj = PageObj::resolve(page, BOOKS_PER_PAGE, count)?;
        let books = self
            .repository
            .books
            .list(page_obj.limit(), page_obj.offset())
            .await?;
        Ok(ListPage::new(books, page_obj))
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Book with its author, genres and copies
    pub async fn book_detail(&self, id: i32, today: NaiveDate) -> AppResult<BookDetail> {
        let book = self.repository.books.get_by_id(id).await?;
        let author = match book.author_id {
            Some(author_id) => Some(self.repository.authors.get_by_id(author_id).await?),
            None => None,
        };
        let genres = self.repository.genres.list_for_book(id).await?;
        let instances = self
            .repository
            .book_instances
            .list_for_book(id)
            .await?
            .into_iter()
            .map(|i| i.with_overdue(today))
            .collect();

        Ok(BookDetail {
            display_genre: display_genre(&genres),
            book,
            author,
            genres,
            instances,
        })
    }

    pub async fn book_create_form(&self) -> AppResult<FormPage<BookForm>> {
        self.book_form_page(BookForm::default(), FieldErrors::new()).await
    }

    pub async fn book_update_form(&self, id: i32) -> AppResult<FormPage<BookForm>> {
        let book = self.repository.books.get_by_id(id).await?;
        let genres = self.repository.genres.list_for_book(id).await?;
        self.book_form_page(BookForm::from_book(&book, &genres), FieldErrors::new())
            .await
    }

    pub async fn create_book(&self, form: BookForm) -> AppResult<FormOutcome<Book, FormPage<BookForm>>> {
        let data = match self.clean_book(&form).await? {
            Ok(data) => data,
            Err(errors) => return Ok(FormOutcome::Invalid(self.book_form_page(form, errors).await?)),
        };
        let book = self.repository.books.create(&data).await?;
        tracing::info!("Created book {} ({})", book.id, book);
        Ok(FormOutcome::Saved(book))
    }

    pub async fn update_book(
        &self,
        id: i32,
        form: BookForm,
    ) -> AppResult<FormOutcome<Book, FormPage<BookForm>>> {
        self.repository.books.get_by_id(id).await?;
        let data = match self.clean_book(&form).await? {
            Ok(data) => data,
            Err(errors) => return Ok(FormOutcome::Invalid(self.book_form_page(form, errors).await?)),
        };
        let book = self.repository.books.update(id, &data).await?;
        tracing::info!("Updated book {}", book.id);
        Ok(FormOutcome::Saved(book))
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        let book = self.repository.books.get_by_id(id).await?;
        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book {} ({})", id, book);
        Ok(())
    }

    /// Form cleaning plus existence of the referenced author and genres
    async fn clean_book(&self, form: &BookForm) -> AppResult<Result<BookData, FieldErrors>> {
        let data = match form.clean() {
            Ok(data) => data,
            Err(errors) => return Ok(Err(errors)),
        };

        let mut errors = FieldErrors::new();
        if let Some(author_id) = data.author_id {
            if !self.repository.authors.exists(author_id).await? {
                errors.add("author", forms::INVALID_CHOICE);
            }
        }

        let found = self.repository.genres.get_by_ids(&data.genre_ids).await?;
        for id in data.genre_ids.iter().filter(|id| !found.iter().any(|g| g.id == **id)) {
            errors.add(
                "genre",
                format!("Select a valid choice. {} is not one of the available choices.", id),
            );
        }

        Ok(if errors.is_empty() { Ok(data) } else { Err(errors) })
    }

    async fn book_form_page(&self, form: BookForm, errors: FieldErrors) -> AppResult<FormPage<BookForm>> {
        let authors = self.repository.authors.list_all().await?;
        let genres = self.repository.genres.list().await?;
        Ok(FormPage::with_errors(form, errors)
            .with_choices(
                "author",
                authors.iter().map(|a| Choice::new(a.id, a)).collect(),
            )
            .with_choices(
                "genre",
                genres.iter().map(|g| Choice::new(g.id, &g.name)).collect(),
            ))
    }

    // ---- Genres ----

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub fn genre_create_form(&self) -> FormPage<GenreForm> {
        FormPage::new(GenreForm::default())
    }

    pub async fn create_genre(&self, form: GenreForm) -> AppResult<FormOutcome<Genre, FormPage<GenreForm>>> {
        let name = match form.clean() {
            Ok(name) => name,
            Err(errors) => return Ok(FormOutcome::Invalid(FormPage::with_errors(form, errors))),
        };
        let genre = self.repository.genres.create(&name).await?;
        tracing::info!("Created genre {} ({})", genre.id, genre);
        Ok(FormOutcome::Saved(genre))
    }

    // ---- Book instances ----

    pub async fn instance_create_form(&self, book_id: i32) -> AppResult<FormPage<BookInstanceForm>> {
        self.repository.books.get_by_id(book_id).await?;
        self.instance_form_page(BookInstanceForm::default(), FieldErrors::new())
            .await
    }

    pub async fn instance_update_form(&self, id: Uuid) -> AppResult<FormPage<BookInstanceForm>> {
        let detail = self.repository.book_instances.get_by_id(id).await?;
        self.instance_form_page(BookInstanceForm::from(&detail.instance), FieldErrors::new())
            .await
    }

    pub async fn create_instance(
        &self,
        book_id: i32,
        form: BookInstanceForm,
    ) -> AppResult<FormOutcome<BookInstanceDetail, FormPage<BookInstanceForm>>> {
        self.repository.books.get_by_id(book_id).await?;
        let data = match form.clean() {
            Ok(data) => data,
            Err(errors) => return Ok(FormOutcome::Invalid(self.instance_form_page(form, errors).await?)),
        };
        if let Some(errors) = self.check_borrower(data.borrower_id).await? {
            return Ok(FormOutcome::Invalid(self.instance_form_page(form, errors).await?));
        }

        let instance = self.repository.book_instances.create(book_id, &data).await?;
        tracing::info!("Created copy {} of book {}", instance.instance.id, book_id);
        Ok(FormOutcome::Saved(instance))
    }

    pub async fn update_instance(
        &self,
        id: Uuid,
        form: BookInstanceForm,
    ) -> AppResult<FormOutcome<BookInstanceDetail, FormPage<BookInstanceForm>>> {
        self.repository.book_instances.get_by_id(id).await?;
        let data = match form.clean() {
            Ok(data) => data,
            Err(errors) => return Ok(FormOutcome::Invalid(self.instance_form_page(form, errors).await?)),
        };
        if let Some(errors) = self.check_borrower(data.borrower_id).await? {
            return Ok(FormOutcome::Invalid(self.instance_form_page(form, errors).await?));
        }

        let instance = self.repository.book_instances.update(id, &data).await?;
        tracing::info!("Updated copy {} (status {})", id, instance.instance.status);
        Ok(FormOutcome::Saved(instance))
    }

    async fn check_borrower(&self, borrower_id: Option<i32>) -> AppResult<Option<FieldErrors>> {
        match borrower_id {
            Some(id) if !self.repository.users.exists(id).await? => {
                let mut errors = FieldErrors::new();
                errors.add("borrower", forms::INVALID_CHOICE);
                Ok(Some(errors))
            }
            _ => Ok(None),
        }
    }

    async fn instance_form_page(
        &self,
        form: BookInstanceForm,
        errors: FieldErrors,
    ) -> AppResult<FormPage<BookInstanceForm>> {
        let users = self.repository.users.list_active().await?;
        Ok(FormPage::with_errors(form, errors)
            .with_choices(
                "status",
                LoanStatus::ALL
                    .iter()
                    .map(|s| Choice::new(s.code(), s.label()))
                    .collect(),
            )
            .with_choices(
                "borrower",
                users.iter().map(|u| Choice::new(u.id, &u.username)).collect(),
            ))
    }
}
