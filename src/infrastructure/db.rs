use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::path::Path;

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    run_migrations(&db).await?;

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // ISBN is the natural key, so the store rejects duplicates
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS Books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT,
            isbn TEXT UNIQUE,
            total_pages INTEGER NOT NULL,
            current_page INTEGER DEFAULT 0,
            started_at TEXT,
            finished_at TEXT,
            cover_url TEXT
        )
        "#
        .to_owned(),
    ))
    .await?;

    Ok(())
}

/// Create the directory holding a file-backed SQLite database.
///
/// `sqlite://data/books.db?mode=rwc` needs `data/` to exist before the
/// driver can create the file. In-memory URLs are left alone.
pub fn ensure_database_dir(database_url: &str) -> std::io::Result<()> {
    let Some(path) = sqlite_file_path(database_url) else {
        return Ok(());
    };

    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn sqlite_file_path(database_url: &str) -> Option<&str> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);

    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_path_is_extracted_from_url() {
        assert_eq!(
            sqlite_file_path("sqlite://data/books.db?mode=rwc"),
            Some("data/books.db")
        );
        assert_eq!(sqlite_file_path("sqlite:books.db"), Some("books.db"));
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/db"), None);
    }
}
