//! Transactions (loans) repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use super::TransactionsRepository;
use crate::{
    error::AppResult,
    models::transaction::{IssueOutcome, NewLoan, Transaction, TransactionDetails},
};

const TRANSACTION_COLUMNS: &str =
    "id, user_id, book_id, issued_at, due_at, returned_at, fine_collected";

#[derive(Clone)]
pub struct PgTransactionsRepository {
    pool: Pool<Postgres>,
}

impl PgTransactionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionsRepository for PgTransactionsRepository {
    async fn get_by_id(&self, id: i32) -> AppResult<Option<Transaction>> {
        let trx = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(trx)
    }

    async fn issue(&self, loan: &NewLoan) -> AppResult<IssueOutcome> {
        let mut tx = self.pool.begin().await?;

        // Decrement iff a copy is on the shelf; concurrent issues cannot both win the last copy
        let taken: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE books
            SET available_copies = available_copies - 1
            WHERE id = $1 AND available_copies > 0
            RETURNING id
            "#,
        )
        .bind(loan.book_id)
        .fetch_optional(&mut *tx)
        .await?;

        if taken.is_none() {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                .bind(loan.book_id)
                .fetch_one(&mut *tx)
                .await?;
            return Ok(if exists {
                IssueOutcome::NoCopiesAvailable
            } else {
                IssueOutcome::BookNotFound
            });
        }

        let trx = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            INSERT INTO transactions (user_id, book_id, issued_at, due_at, fine_collected)
            VALUES ($1, $2, $3, $4, 0)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(loan.user_id)
        .bind(loan.book_id)
        .bind(loan.issued_at)
        .bind(loan.due_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            "Loan {} created for user {} on book {}",
            trx.id,
            trx.user_id,
            trx.book_id
        );
        Ok(IssueOutcome::Issued(trx))
    }

    async fn mark_returned(
        &self,
        id: i32,
        returned_at: DateTime<Utc>,
        fine: i32,
    ) -> AppResult<Option<Transaction>> {
        let mut tx = self.pool.begin().await?;

        let returned = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            UPDATE transactions
            SET returned_at = $2, fine_collected = $3
            WHERE id = $1 AND returned_at IS NULL
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(returned_at)
        .bind(fine)
        .fetch_optional(&mut *tx)
        .await?;

        let trx = match returned {
            Some(trx) => trx,
            None => return Ok(None),
        };

        // Capped in case total_copies was reduced while the copy was out
        sqlx::query(
            r#"
            UPDATE books
            SET available_copies = LEAST(total_copies, available_copies + 1)
            WHERE id = $1
            "#,
        )
        .bind(trx.book_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(trx))
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Transaction>> {
        let trxs = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE user_id = $1
            ORDER BY issued_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(trxs)
    }

    async fn list_all(&self) -> AppResult<Vec<TransactionDetails>> {
        let trxs = sqlx::query_as::<_, TransactionDetails>(
            r#"
            SELECT t.id, t.user_id, u.name AS user_name,
                   t.book_id, b.title AS book_title,
                   t.issued_at, t.due_at, t.returned_at, t.fine_collected
            FROM transactions t
            JOIN users u ON u.id = t.user_id
            LEFT JOIN books b ON b.id = t.book_id
            ORDER BY t.issued_at DESC, t.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(trxs)
    }
}
