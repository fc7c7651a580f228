//! Issue/return endpoints and loan listings

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::transaction::{IssueRequest, ReturnRequest, Transaction, TransactionDetails},
    AppState,
};

use super::AuthenticatedUser;

/// Issue response
#[derive(Serialize, ToSchema)]
pub struct IssueResponse {
    pub detail: String,
    pub transaction_id: i32,
    pub due_at: DateTime<Utc>,
}

/// Return response
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub detail: String,
    /// Fine charged for this return, in minor currency units
    pub fine: i32,
    pub transaction: Transaction,
}

/// Issue a copy of a book
#[utoipa::path(
    post,
    path = "/transactions/issue",
    tag = "transactions",
    security(("bearer_auth" = [])),
    request_body = IssueRequest,
    responses(
        (status = 200, description = "Book issued", body = IssueResponse),
        (status = 400, description = "No copies available or invalid loan period", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 404, description = "Book or user not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn issue_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<IssueRequest>,
) -> AppResult<Json<IssueResponse>> {
    let trx = state
        .services
        .transactions
        .issue(claims.user_id, request)
        .await?;

    Ok(Json(IssueResponse {
        detail: "Issued".to_string(),
        transaction_id: trx.id,
        due_at: trx.due_at,
    }))
}

/// Return an issued book
#[utoipa::path(
    post,
    path = "/transactions/return",
    tag = "transactions",
    security(("bearer_auth" = [])),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 400, description = "Book already returned", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 404, description = "Transaction not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<ReturnResponse>> {
    let (transaction, fine) = state
        .services
        .transactions
        .return_book(request.transaction_id)
        .await?;

    Ok(Json(ReturnResponse {
        detail: "Returned".to_string(),
        fine,
        transaction,
    }))
}

/// Loans of the caller
#[utoipa::path(
    get,
    path = "/transactions/my",
    tag = "transactions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's transactions, most recent first", body = Vec<Transaction>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn my_transactions(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Transaction>>> {
    let trxs = state
        .services
        .transactions
        .list_for_user(claims.user_id)
        .await?;
    Ok(Json(trxs))
}

/// All loans with borrower and book names
#[utoipa::path(
    get,
    path = "/transactions",
    tag = "transactions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All transactions, most recent first", body = Vec<TransactionDetails>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Librarian role required when the report is restricted", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<TransactionDetails>>> {
    if state.config.transactions.report_requires_librarian {
        claims.require_librarian()?;
    }

    let trxs = state.services.transactions.list_all().await?;
    Ok(Json(trxs))
}
