//! Issue/return workflow and fine assessment

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::transaction::{
        compute_fine, IssueOutcome, IssueRequest, NewLoan, Transaction, TransactionDetails,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct TransactionsService {
    repository: Repository,
    config: LoansConfig,
}

impl TransactionsService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    /// Lend one copy of a book. `caller_id` is the borrower unless the request names one.
    pub async fn issue(&self, caller_id: i32, request: IssueRequest) -> AppResult<Transaction> {
        request.validate()?;

        let loan_days = request.days.unwrap_or(self.config.default_loan_days);
        if loan_days > self.config.max_loan_days {
            return Err(AppError::Validation(format!(
                "Loan period cannot exceed {} days",
                self.config.max_loan_days
            )));
        }

        let user_id = request.user_id.unwrap_or(caller_id);
        let borrower = self
            .repository
            .users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))?;
        if !borrower.is_active {
            return Err(AppError::Validation(format!(
                "User with id {} is deactivated",
                user_id
            )));
        }

        let loan = NewLoan::starting_at(user_id, request.book_id, Utc::now(), loan_days);

        match self.repository.transactions.issue(&loan).await? {
            IssueOutcome::Issued(trx) => {
                tracing::info!(
                    "Book {} issued to user {} (transaction {}, due {})",
                    trx.book_id,
                    trx.user_id,
                    trx.id,
                    trx.due_at
                );
                Ok(trx)
            }
            IssueOutcome::BookNotFound => Err(AppError::NotFound(format!(
                "Book with id {} not found",
                request.book_id
            ))),
            IssueOutcome::NoCopiesAvailable => Err(AppError::Unavailable(
                "No copies available".to_string(),
            )),
        }
    }

    /// Close a loan now and assess the late fine
    pub async fn return_book(&self, transaction_id: i32) -> AppResult<(Transaction, i32)> {
        self.return_book_at(transaction_id, Utc::now()).await
    }

    /// Close a loan at the given instant and assess the late fine
    pub async fn return_book_at(
        &self,
        transaction_id: i32,
        returned_at: DateTime<Utc>,
    ) -> AppResult<(Transaction, i32)> {
        let trx = self
            .repository
            .transactions
            .get_by_id(transaction_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Transaction with id {} not found", transaction_id))
            })?;

        if trx.is_returned() {
            return Err(AppError::AlreadyReturned("Book already returned".to_string()));
        }

        let fine = compute_fine(trx.due_at, returned_at, self.config.fine_per_day);

        // A concurrent return may have closed the loan since the read above
        let returned = self
            .repository
            .transactions
            .mark_returned(transaction_id, returned_at, fine)
            .await?
            .ok_or_else(|| AppError::AlreadyReturned("Book already returned".to_string()))?;

        if fine > 0 {
            tracing::info!(
                "Transaction {} returned late, fine {}",
                transaction_id,
                fine
            );
        } else {
            tracing::info!("Transaction {} returned", transaction_id);
        }

        Ok((returned, fine))
    }

    /// Loans of one user, most recent first
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Transaction>> {
        self.repository.transactions.list_for_user(user_id).await
    }

    /// Every loan with borrower and book names, most recent first
    pub async fn list_all(&self) -> AppResult<Vec<TransactionDetails>> {
        self.repository.transactions.list_all().await
    }
}
