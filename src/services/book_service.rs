//! Book Service - Form handling without the HTTP layer
//!
//! Validates raw form fields, derives progress timestamps and delegates to
//! the [`BookRepository`]. HTTP status mapping lives in `api::books`.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::domain::{BookRepository, DomainError};
use crate::models::{Book, NewBook};

/// Page-load payload
#[derive(Debug, Serialize, ToSchema)]
pub struct LoadData {
    pub error: bool,
    pub books: Option<Vec<Book>>,
}

/// Raw fields of the progress form
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct ProgressForm {
    pub id: Option<String>,
    pub current_page: Option<String>,
}

/// Raw fields of the add-book form
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct AddBookForm {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub total_pages: Option<String>,
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressError {
    MissingFields,
    InvalidValue(&'static str),
    /// The target book could not be loaded
    Lookup(DomainError),
    /// The repository rejected the write
    Update(DomainError),
}

impl ProgressError {
    /// User-facing reason
    pub fn reason(&self) -> &'static str {
        match self {
            ProgressError::MissingFields => "Missing fields",
            ProgressError::InvalidValue(msg) => *msg,
            ProgressError::Lookup(_) => "Database error",
            ProgressError::Update(_) => "Error while updating book",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ProgressError::MissingFields => "missing_fields",
            ProgressError::InvalidValue(_) => "invalid_value",
            ProgressError::Lookup(e) | ProgressError::Update(e) => e.reason(),
        }
    }
}

impl fmt::Display for ProgressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

impl std::error::Error for ProgressError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddBookError {
    MissingIsbn,
    MissingTitle,
    MissingAuthor,
    /// Absent, non-numeric or not positive
    InvalidTotalPages,
    Store(DomainError),
}

impl AddBookError {
    /// User-facing message
    pub fn message(&self) -> &'static str {
        match self {
            AddBookError::MissingIsbn => "ISBN is required",
            AddBookError::MissingTitle => "Title is required",
            AddBookError::MissingAuthor => "Author is required",
            AddBookError::InvalidTotalPages => "Valid total pages is required",
            AddBookError::Store(DomainError::DuplicateIsbn) => "Book with this ISBN already exists",
            AddBookError::Store(_) => "Database error occurred",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AddBookError::MissingIsbn | AddBookError::MissingTitle | AddBookError::MissingAuthor => {
                "missing_fields"
            }
            AddBookError::InvalidTotalPages => "invalid_value",
            AddBookError::Store(e) => e.reason(),
        }
    }
}

impl fmt::Display for AddBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for AddBookError {}

/// Parse the leading integer of a form value.
///
/// Leading whitespace and an optional sign are accepted and anything after
/// the first run of digits is ignored, so `"12 pages"` reads as 12. Returns
/// `None` when there are no digits or the value does not fit an `i32`.
pub fn parse_leading_int(raw: &str) -> Option<i32> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value: i64 = digits[..end].parse().ok()?;
    let value = if negative { -value } else { value };
    i32::try_from(value).ok()
}

/// Fetch every book for the page view. Failure is reported as a flag.
pub async fn load(repo: &dyn BookRepository) -> LoadData {
    match repo.get_books().await {
        Ok(books) => LoadData {
            error: false,
            books: Some(books),
        },
        Err(e) => {
            tracing::error!("Failed to load books: {}", e);
            LoadData {
                error: true,
                books: None,
            }
        }
    }
}

/// Validate the progress form and record the new page.
pub async fn update_progress(
    repo: &dyn BookRepository,
    form: ProgressForm,
) -> Result<Book, ProgressError> {
    let (Some(id), Some(current_page)) = (form.id, form.current_page) else {
        return Err(ProgressError::MissingFields);
    };

    // An id that is not a number cannot name a stored book
    let id = parse_leading_int(&id).ok_or(ProgressError::Lookup(DomainError::NotFound))?;
    let current_page = parse_leading_int(&current_page)
        .ok_or(ProgressError::InvalidValue("Invalid current_page"))?;

    let mut book = repo
        .get_book_by_id(id)
        .await
        .map_err(ProgressError::Lookup)?;

    if current_page < 0 || current_page > book.total_pages {
        return Err(ProgressError::InvalidValue("Invalid current_page"));
    }

    book.current_page = current_page;
    if book.is_finished() {
        book.finished_at = Some(chrono::Utc::now().to_rfc3339());
    }

    repo.update_progress(&book).await.map_err(|e| {
        tracing::error!("Failed to update progress of book {}: {}", id, e);
        ProgressError::Update(e)
    })
}

/// Validate the add-book form and insert the book. Returns the new id.
pub async fn add_book(repo: &dyn BookRepository, form: AddBookForm) -> Result<i32, AddBookError> {
    let isbn = required(form.isbn).ok_or(AddBookError::MissingIsbn)?;
    let title = required(form.title).ok_or(AddBookError::MissingTitle)?;
    let author = required(form.author).ok_or(AddBookError::MissingAuthor)?;
    let total_pages = form
        .total_pages
        .as_deref()
        .and_then(parse_leading_int)
        .filter(|pages| *pages > 0)
        .ok_or(AddBookError::InvalidTotalPages)?;

    let book = NewBook {
        isbn,
        title,
        author,
        total_pages,
        cover_url: form
            .cover_url
            .map(|url| url.trim().to_string())
            .unwrap_or_default(),
    };

    repo.add_book(book).await.map_err(|e| {
        match &e {
            DomainError::DuplicateIsbn => tracing::info!("Rejected duplicate ISBN"),
            other => tracing::error!("Failed to add book: {}", other),
        }
        AddBookError::Store(e)
    })
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
