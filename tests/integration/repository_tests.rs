//! Repository tests against a live PostgreSQL database
//!
//! Uses `DATABASE_URL` and applies the migrations before each test. Rows are
//! created under fresh users and books so the tests can share a database.

use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use locallibrary_server::{
    models::{
        book::BookData,
        book_instance::{BookInstanceData, LoanFilter, LoanStatus},
        user::NewUser,
    },
    repository::Repository,
    AppError,
};

async fn repository() -> Repository {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Repository::new(pool)
}

async fn new_borrower(repository: &Repository) -> i32 {
    repository
        .users
        .create(&NewUser {
            username: format!("reader-{}", Uuid::new_v4().simple()),
            password_hash: String::new(),
            permissions: vec![],
        })
        .await
        .expect("Failed to create user")
        .id
}

async fn new_book(repository: &Repository) -> i32 {
    repository
        .books
        .create(&BookData {
            title: "The Dispossessed".to_string(),
            author_id: None,
            summary: "An ambiguous utopia".to_string(),
            isbn: "9780061054884".to_string(),
            genre_ids: vec![],
        })
        .await
        .expect("Failed to create book")
        .id
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn copy(status: LoanStatus, due_back: Option<NaiveDate>, borrower_id: Option<i32>) -> BookInstanceData {
    BookInstanceData {
        imprint: "Harper Voyager, 1994".to_string(),
        due_back,
        status,
        borrower_id,
    }
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_copies_of_a_book_list_undated_last() {
    let repository = repository().await;
    let book_id = new_book(&repository).await;

    for due_back in [Some(date(2030, 5, 1)), None, Some(date(2030, 1, 1))] {
        repository
            .book_instances
            .create(book_id, &copy(LoanStatus::Available, due_back, None))
            .await
            .unwrap();
    }

    let copies = repository.book_instances.list_for_book(book_id).await.unwrap();
    let dues: Vec<_> = copies.iter().map(|c| c.instance.due_back).collect();
    assert_eq!(dues, vec![Some(date(2030, 1, 1)), Some(date(2030, 5, 1)), None]);
}

#[tokio::test]
#[ignore]
async fn test_loans_filtered_by_borrower_and_status() {
    let repository = repository().await;
    let book_id = new_book(&repository).await;
    let reader = new_borrower(&repository).await;
    let other = new_borrower(&repository).await;

    let store = &repository.book_instances;
    let late = store
        .create(book_id, &copy(LoanStatus::OnLoan, Some(date(2030, 3, 1)), Some(reader)))
        .await
        .unwrap();
    let early = store
        .create(book_id, &copy(LoanStatus::OnLoan, Some(date(2030, 2, 1)), Some(reader)))
        .await
        .unwrap();
    store
        .create(book_id, &copy(LoanStatus::Reserved, Some(date(2030, 1, 1)), Some(reader)))
        .await
        .unwrap();
    let others = store
        .create(book_id, &copy(LoanStatus::OnLoan, Some(date(2030, 1, 15)), Some(other)))
        .await
        .unwrap();

    let filter = LoanFilter::on_loan_to(reader);
    let mine = store.list_filtered(&filter, 10, 0).await.unwrap();
    let ids: Vec<_> = mine.iter().map(|c| c.instance.id).collect();
    assert_eq!(ids, vec![early.instance.id, late.instance.id]);
    assert_eq!(store.count_filtered(&filter).await.unwrap(), 2);

    let page = store.list_filtered(&filter, 1, 1).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].instance.id, late.instance.id);

    let total = store.count_filtered(&LoanFilter::on_loan()).await.unwrap();
    let everyone = store.list_filtered(&LoanFilter::on_loan(), total, 0).await.unwrap();
    assert!(everyone.iter().any(|c| c.instance.id == others.instance.id));
    assert!(everyone.iter().all(|c| c.instance.status == LoanStatus::OnLoan));
}

#[tokio::test]
#[ignore]
async fn test_copy_on_loan_requires_borrower_and_due_date() {
    let repository = repository().await;
    let book_id = new_book(&repository).await;
    let reader = new_borrower(&repository).await;

    let no_borrower = repository
        .book_instances
        .create(book_id, &copy(LoanStatus::OnLoan, Some(date(2030, 1, 1)), None))
        .await;
    assert!(matches!(no_borrower, Err(AppError::Database(_))));

    let no_due_date = repository
        .book_instances
        .create(book_id, &copy(LoanStatus::OnLoan, None, Some(reader)))
        .await;
    assert!(matches!(no_due_date, Err(AppError::Database(_))));
}
