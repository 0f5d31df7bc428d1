use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Raw `Books` row as stored. Nullable columns stay optional here; nothing
/// outside the repository sees a `Model` before it has been validated into
/// a [`Book`].
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    #[sea_orm(unique)]
    pub isbn: Option<String>,
    pub total_pages: i32,
    pub current_page: Option<i32>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub cover_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// Validated book handed to services and API responses
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub total_pages: i32,
    pub current_page: i32,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub cover_url: String,
}

/// Input for registering a new book. The store assigns the id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub total_pages: i32,
    pub cover_url: String,
}

/// A stored row that does not have the shape of a [`Book`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub id: i32,
    pub field: &'static str,
    pub problem: &'static str,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {} {}", self.id, self.field, self.problem)
    }
}

impl std::error::Error for RowError {}

impl TryFrom<Model> for Book {
    type Error = RowError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = model.id;
        let reject = |field, problem| RowError { id, field, problem };

        if model.title.is_empty() {
            return Err(reject("title", "is empty"));
        }
        let author = model.author.ok_or_else(|| reject("author", "is null"))?;
        let isbn = model.isbn.ok_or_else(|| reject("isbn", "is null"))?;
        if model.total_pages < 1 {
            return Err(reject("total_pages", "is below 1"));
        }
        let current_page = model.current_page.unwrap_or(0);
        if current_page < 0 {
            return Err(reject("current_page", "is negative"));
        }
        let cover_url = model.cover_url.ok_or_else(|| reject("cover_url", "is null"))?;

        Ok(Self {
            id,
            title: model.title,
            author,
            isbn,
            total_pages: model.total_pages,
            current_page,
            started_at: model.started_at,
            finished_at: model.finished_at,
            cover_url,
        })
    }
}

impl Book {
    /// Record `current_page` as the new position and derive the timestamps.
    ///
    /// `started_at` is stamped when the submitted page is 0 (a reset), and
    /// `finished_at` when the last page is reached. A previously recorded
    /// `finished_at` survives moving back below `total_pages`.
    pub fn apply_progress(&mut self, current_page: i32, now: &str) {
        if current_page == 0 {
            self.started_at = Some(now.to_string());
        }

        self.current_page = current_page;

        if current_page == self.total_pages {
            self.finished_at = Some(now.to_string());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.current_page == self.total_pages
    }
}
