//! Transaction (loan) model, fine computation and request/response types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Loan state. `Issued -> Returned` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Issued,
    Returned,
}

/// Transaction record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Transaction {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub issued_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    /// Minor currency units; stays 0 until the book is returned
    pub fine_collected: i32,
}

impl Transaction {
    pub fn status(&self) -> TransactionStatus {
        if self.returned_at.is_some() {
            TransactionStatus::Returned
        } else {
            TransactionStatus::Issued
        }
    }

    pub fn is_returned(&self) -> bool {
        self.returned_at.is_some()
    }
}

/// Transaction joined with borrower name and book title
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TransactionDetails {
    pub id: i32,
    pub user_id: i32,
    pub user_name: String,
    pub book_id: i32,
    /// `None` once the book has been removed from the catalog
    pub book_title: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub fine_collected: i32,
}

/// Insert payload for a new loan
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    pub user_id: i32,
    pub book_id: i32,
    pub issued_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
}

impl NewLoan {
    pub fn starting_at(user_id: i32, book_id: i32, issued_at: DateTime<Utc>, loan_days: i64) -> Self {
        Self {
            user_id,
            book_id,
            issued_at,
            due_at: issued_at + Duration::days(loan_days),
        }
    }
}

/// Result of the conditional "take one copy" write
#[derive(Debug, Clone, PartialEq)]
pub enum IssueOutcome {
    Issued(Transaction),
    BookNotFound,
    NoCopiesAvailable,
}

/// Whole calendar days between the due date and the return date.
///
/// Both instants are truncated to their UTC date first, so an item due at
/// 23:59 and returned at 00:01 the next day is one day late.
pub fn overdue_days(due_at: DateTime<Utc>, returned_at: DateTime<Utc>) -> i64 {
    let days = (returned_at.date_naive() - due_at.date_naive()).num_days();
    days.max(0)
}

/// Fine owed for a return, in minor currency units
pub fn compute_fine(due_at: DateTime<Utc>, returned_at: DateTime<Utc>, fine_per_day: i32) -> i32 {
    let days = i32::try_from(overdue_days(due_at, returned_at)).unwrap_or(i32::MAX);
    days.saturating_mul(fine_per_day)
}

/// Issue request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IssueRequest {
    /// Borrower; defaults to the caller
    pub user_id: Option<i32>,
    pub book_id: i32,
    /// Loan period in days (default 14)
    #[validate(range(min = 1, message = "Loan period must be at least one day"))]
    pub days: Option<i64>,
}

/// Return request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnRequest {
    pub transaction_id: i32,
}
