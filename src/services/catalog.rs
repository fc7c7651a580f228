//! Catalog management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List books, newest first, optionally filtered by title/author/ISBN
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        self.repository
            .books
            .list(query.term().map(str::to_string))
            .await
    }

    /// Get a book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository
            .books
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Add a book; every copy starts on the shelf
    pub async fn add_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;

        if self.repository.books.isbn_exists(&book.isbn, None).await? {
            return Err(AppError::Conflict(
                "Book with this ISBN already exists".to_string(),
            ));
        }

        let created = self.repository.books.create(&book).await?;
        tracing::info!("Book {} added (isbn {})", created.id, created.isbn);
        Ok(created)
    }

    /// Partially update a book
    pub async fn update_book(&self, id: i32, changes: UpdateBook) -> AppResult<Book> {
        changes.validate()?;

        // Check if book exists
        self.get_book(id).await?;

        if let Some(ref isbn) = changes.isbn {
            if self.repository.books.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::Conflict(
                    "ISBN already used by another book".to_string(),
                ));
            }
        }

        self.repository
            .books
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book that has no copy on loan
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        let book = self.get_book(id).await?;

        if !book.is_idle() {
            return Err(AppError::Conflict(format!(
                "Cannot delete: {} copies are issued",
                book.copies_on_loan()
            )));
        }

        // A loan may have started, or the book been removed, since the read above
        if !self.repository.books.delete_if_idle(id).await? {
            self.get_book(id).await?;
            return Err(AppError::Conflict(
                "Cannot delete: some copies are issued".to_string(),
            ));
        }

        tracing::info!("Book {} deleted", id);
        Ok(())
    }
}
