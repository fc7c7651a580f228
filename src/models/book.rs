//! Book (catalog record) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub total_copies: i32,
    /// Copies currently on the shelf, always within `0..=total_copies`
    pub available_copies: i32,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Number of copies currently on loan
    pub fn copies_on_loan(&self) -> i32 {
        self.total_copies - self.available_copies
    }

    /// A book may only be removed from the catalog when every copy is on the shelf
    pub fn is_idle(&self) -> bool {
        self.available_copies == self.total_copies
    }

    /// Apply a partial update in place.
    ///
    /// Changing `total_copies` shifts `available_copies` by the same delta,
    /// floored at zero. Shrinking the total below the number of copies on loan
    /// therefore leaves no copy available instead of failing.
    pub fn apply_changes(&mut self, changes: &UpdateBook) {
        if let Some(ref title) = changes.title {
            self.title = title.clone();
        }
        if let Some(ref author) = changes.author {
            self.author = author.clone();
        }
        if let Some(ref isbn) = changes.isbn {
            self.isbn = isbn.clone();
        }
        if let Some(new_total) = changes.total_copies {
            let delta = new_total - self.total_copies;
            self.total_copies = new_total;
            self.available_copies = (self.available_copies + delta).max(0);
        }
    }
}

/// Query string for `GET /books/`
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive match against title, author or ISBN
    pub q: Option<String>,
}

impl BookQuery {
    /// Search term with surrounding whitespace removed; blank input means no filter
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    #[serde(default = "default_total_copies")]
    #[validate(range(min = 0, message = "Total copies cannot be negative"))]
    pub total_copies: i32,
}

fn default_total_copies() -> i32 {
    1
}

/// Update book request; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: Option<String>,
    #[validate(length(min = 1, message = "ISBN cannot be empty"))]
    pub isbn: Option<String>,
    #[validate(range(min = 0, message = "Total copies cannot be negative"))]
    pub total_copies: Option<i32>,
}
