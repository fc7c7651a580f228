//! Repository layer for database operations

pub mod books;
pub mod transactions;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        Book, CreateBook, IssueOutcome, NewLoan, NewUser, Role, Transaction, TransactionDetails,
        UpdateBook, User,
    },
};

/// Book catalog storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksRepository: Send + Sync {
    /// All books, newest first, optionally filtered on title/author/ISBN
    async fn list(&self, search: Option<String>) -> AppResult<Vec<Book>>;
    async fn get_by_id(&self, id: i32) -> AppResult<Option<Book>>;
    async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool>;
    /// Insert with `available_copies = total_copies`
    async fn create(&self, book: &CreateBook) -> AppResult<Book>;
    /// Lock the row, apply the changes, write back. `None` when the id is unknown.
    async fn update(&self, id: i32, changes: &UpdateBook) -> AppResult<Option<Book>>;
    /// Delete only if no copy is on loan. Returns whether a row was removed.
    async fn delete_if_idle(&self, id: i32) -> AppResult<bool>;
    async fn count(&self) -> AppResult<i64>;
    /// Insert books whose ISBN is not yet present. Returns the number inserted.
    async fn insert_missing(&self, books: &[CreateBook]) -> AppResult<u64>;
}

/// Loan storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionsRepository: Send + Sync {
    async fn get_by_id(&self, id: i32) -> AppResult<Option<Transaction>>;
    /// Take one copy of the book and record the loan, atomically
    async fn issue(&self, loan: &NewLoan) -> AppResult<IssueOutcome>;
    /// Close the loan and put the copy back on the shelf.
    /// `None` when the loan was already returned.
    async fn mark_returned(
        &self,
        id: i32,
        returned_at: DateTime<Utc>,
        fine: i32,
    ) -> AppResult<Option<Transaction>>;
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Transaction>>;
    async fn list_all(&self) -> AppResult<Vec<TransactionDetails>>;
}

/// User account storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn get_by_id(&self, id: i32) -> AppResult<Option<User>>;
    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn email_exists(&self, email: &str) -> AppResult<bool>;
    async fn create(&self, user: &NewUser) -> AppResult<User>;
    /// Accounts sorted by name, optionally filtered on name/email, role and active flag
    async fn list(
        &self,
        search: Option<String>,
        role: Option<Role>,
        is_active: Option<bool>,
    ) -> AppResult<Vec<User>>;
    /// Write back name, email, role and active flag. `None` when the id is unknown.
    async fn update(&self, user: &User) -> AppResult<Option<User>>;
}

/// Main repository struct holding the connection pool and the table stores
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: Arc<dyn BooksRepository>,
    pub transactions: Arc<dyn TransactionsRepository>,
    pub users: Arc<dyn UsersRepository>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBooksRepository::new(pool.clone())),
            transactions: Arc::new(transactions::PgTransactionsRepository::new(pool.clone())),
            users: Arc::new(users::PgUsersRepository::new(pool.clone())),
            pool,
        }
    }

    /// Assemble a repository from explicit stores
    pub fn with_stores(
        pool: Pool<Postgres>,
        books: Arc<dyn BooksRepository>,
        transactions: Arc<dyn TransactionsRepository>,
        users: Arc<dyn UsersRepository>,
    ) -> Self {
        Self {
            pool,
            books,
            transactions,
            users,
        }
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
