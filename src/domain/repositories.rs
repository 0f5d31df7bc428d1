//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;
use crate::models::{Book, NewBook};

/// Repository trait for the `Books` table
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a new book and return the id assigned by the store
    async fn add_book(&self, book: NewBook) -> Result<i32, DomainError>;

    /// Fetch one book. Rows that fail validation are reported as `NotFound`.
    async fn get_book_by_id(&self, id: i32) -> Result<Book, DomainError>;

    /// Fetch every book, or fail if any stored row is malformed
    async fn get_books(&self) -> Result<Vec<Book>, DomainError>;

    /// Record `book.current_page` against the stored row, deriving
    /// `started_at`/`finished_at`, and return the row as written
    async fn update_progress(&self, book: &Book) -> Result<Book, DomainError>;
}
