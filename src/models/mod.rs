//! Data models for the LMS

pub mod book;
pub mod transaction;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookQuery, CreateBook, UpdateBook};
pub use transaction::{IssueOutcome, NewLoan, Transaction, TransactionDetails, TransactionStatus};
pub use user::{NewUser, Role, User, UserClaims, UserOut};
