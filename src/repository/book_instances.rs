//! Book instances repository

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::BookInstanceStore;
use crate::{
    error::{AppError, AppResult},
    models::book_instance::{BookInstanceData, BookInstanceDetail, LoanFilter, LoanStatus},
};

const SELECT_DETAIL: &str = r#"
    SELECT bi.*, b.title AS book_title, u.username AS borrower_username
    FROM book_instances bi
    LEFT JOIN books b ON bi.book_id = b.id
    LEFT JOIN users u ON bi.borrower_id = u.id
"#;

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Book instance {} not found", id))
}

#[async_trait]
impl BookInstanceStore for BookInstancesRepository {
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstanceDetail> {
        let query = format!("{} WHERE bi.id = $1", SELECT_DETAIL);
        sqlx::query_as::<_, BookInstanceDetail>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstanceDetail>> {
        let query = format!(
            "{} WHERE bi.book_id = $1 ORDER BY bi.due_back ASC NULLS LAST, bi.id",
            SELECT_DETAIL
        );
        let instances = sqlx::query_as::<_, BookInstanceDetail>(&query)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(instances)
    }

    async fn list_filtered(
        &self,
        filter: &LoanFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BookInstanceDetail>> {
        let query = format!(
            r#"{}
            WHERE bi.status = $1 AND ($2::int4 IS NULL OR bi.borrower_id = $2)
            ORDER BY bi.due_back ASC NULLS LAST, bi.id
            LIMIT $3 OFFSET $4
            "#,
            SELECT_DETAIL
        );
        let instances = sqlx::query_as::<_, BookInstanceDetail>(&query)
            .bind(filter.status)
            .bind(filter.borrower_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(instances)
    }

    async fn count_filtered(&self, filter: &LoanFilter) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE status = $1 AND ($2::int4 IS NULL OR borrower_id = $2)",
        )
        .bind(filter.status)
        .bind(filter.borrower_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn create(&self, book_id: i32, data: &BookInstanceData) -> AppResult<BookInstanceDetail> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, due_back, status, borrower_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(book_id)
        .bind(&data.imprint)
        .bind(data.due_back)
        .bind(data.status)
        .bind(data.borrower_id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    async fn update(&self, id: Uuid, data: &BookInstanceData) -> AppResult<BookInstanceDetail> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances
            SET imprint = $1, due_back = $2, status = $3, borrower_id = $4
            WHERE id = $5
            "#,
        )
        .bind(&data.imprint)
        .bind(data.due_back)
        .bind(data.status)
        .bind(data.borrower_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        self.get_by_id(id).await
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        let result = sqlx::query("UPDATE book_instances SET due_back = $1 WHERE id = $2")
            .bind(due_back)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}
