//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set, SqlErr,
    TransactionTrait,
};

use crate::domain::{BookRepository, DomainError};
use crate::models::book::{ActiveModel, Column, Entity as BookEntity};
use crate::models::{Book, NewBook};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn insert_error(e: DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::DuplicateIsbn,
        _ => DomainError::from(e),
    }
}

/// Rows that fail validation are discarded and reported as missing.
fn discard_malformed(id: i32, e: DomainError) -> DomainError {
    match e {
        DomainError::Parse(msg) => {
            tracing::warn!("Discarding malformed book {}: {}", id, msg);
            DomainError::NotFound
        }
        other => other,
    }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn add_book(&self, book: NewBook) -> Result<i32, DomainError> {
        let new_book = ActiveModel {
            isbn: Set(Some(book.isbn)),
            title: Set(book.title),
            author: Set(Some(book.author)),
            total_pages: Set(book.total_pages),
            current_page: Set(Some(0)),
            started_at: Set(Some(String::new())),
            finished_at: Set(Some(String::new())),
            cover_url: Set(Some(book.cover_url)),
            ..Default::default()
        };

        let result = BookEntity::insert(new_book)
            .exec(&self.db)
            .await
            .map_err(insert_error)?;

        tracing::debug!("Inserted book {}", result.last_insert_id);
        Ok(result.last_insert_id)
    }

    async fn get_book_by_id(&self, id: i32) -> Result<Book, DomainError> {
        let model = BookEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| discard_malformed(id, e.into()))?
            .ok_or(DomainError::NotFound)?;

        Book::try_from(model).map_err(|e| discard_malformed(id, e.into()))
    }

    async fn get_books(&self) -> Result<Vec<Book>, DomainError> {
        let models = BookEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        // All-or-nothing: one bad row fails the whole listing
        models
            .into_iter()
            .map(Book::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                tracing::warn!("Book listing rejected: {}", e);
                DomainError::from(e)
            })
    }

    async fn update_progress(&self, book: &Book) -> Result<Book, DomainError> {
        // Read and write share one transaction so a concurrent update to
        // the same row cannot slip in between them.
        let txn = self.db.begin().await?;

        let existing = BookEntity::find_by_id(book.id)
            .one(&txn)
            .await
            .map_err(|e| discard_malformed(book.id, e.into()))?
            .ok_or(DomainError::NotFound)?;

        let mut current = Book::try_from(existing.clone())
            .map_err(|e| discard_malformed(book.id, e.into()))?;

        let now = chrono::Utc::now().to_rfc3339();
        current.apply_progress(book.current_page, &now);

        let mut active: ActiveModel = existing.into();
        active.current_page = Set(Some(current.current_page));
        active.started_at = Set(current.started_at.clone());
        active.finished_at = Set(current.finished_at.clone());
        active.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            "Book {} progress: {}/{}",
            current.id,
            current.current_page,
            current.total_pages
        );
        Ok(current)
    }
}
