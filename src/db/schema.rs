use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::{AppError, Result};

pub const SCHEMA: &str = r#"
-- category table
CREATE TABLE category (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

-- msgs table (articles)
CREATE TABLE msgs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    category INTEGER NOT NULL REFERENCES category(id),
    description TEXT NOT NULL,
    text TEXT NOT NULL,
    source TEXT NOT NULL,
    datetime INTEGER NOT NULL
);
"#;

/// Seed categories, inserted with ids 1, 2, 3 in this order.
pub const SEED_CATEGORIES: [&str; 3] = ["Политика", "Культура", "Спорт"];

/// A database file that is missing or zero-length has never been set up.
pub fn needs_initialization(db_path: &Path) -> bool {
    std::fs::metadata(db_path)
        .map(|meta| meta.len() == 0)
        .unwrap_or(true)
}

/// Creates both tables and the seed categories in a single transaction.
/// Any failure leaves nothing behind and comes back as [`AppError::Init`].
pub fn initialize(conn: &mut Connection) -> Result<()> {
    let tx = conn
        .transaction()
        .map_err(|e| init_error("Failed to start schema transaction", e))?;

    tx.execute_batch(SCHEMA)
        .map_err(|e| init_error("Failed to create tables", e))?;

    for (index, name) in SEED_CATEGORIES.iter().enumerate() {
        tx.execute(
            "INSERT INTO category (id, name) VALUES (?1, ?2)",
            params![index as i64 + 1, name],
        )
        .map_err(|e| init_error("Failed to seed categories", e))?;
    }

    tx.commit()
        .map_err(|e| init_error("Failed to commit schema", e))?;

    tracing::info!("Created schema with {} seed categories", SEED_CATEGORIES.len());
    Ok(())
}

fn init_error(context: &str, err: rusqlite::Error) -> AppError {
    AppError::Init(format!("{}: \"{}\"", context, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::OpenFlags;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn initialize_creates_two_tables_and_three_categories() {
        let mut conn = Connection::open_in_memory().unwrap();

        initialize(&mut conn).unwrap();

        assert_eq!(table_names(&conn), vec!["category", "msgs"]);
        let names: Vec<(i64, String)> = conn
            .prepare("SELECT id, name FROM category ORDER BY id")
            .unwrap()
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(
            names,
            vec![
                (1, "Политика".to_string()),
                (2, "Культура".to_string()),
                (3, "Спорт".to_string()),
            ]
        );
    }

    #[test]
    fn needs_initialization_for_missing_or_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("news.db");
        assert!(needs_initialization(&path));

        std::fs::write(&path, b"").unwrap();
        assert!(needs_initialization(&path));

        std::fs::write(&path, b"not empty").unwrap();
        assert!(!needs_initialization(&path));
    }

    #[test]
    fn initialize_on_read_only_connection_is_an_init_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("news.db");
        std::fs::write(&path, b"").unwrap();
        let mut conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY).unwrap();

        let err = initialize(&mut conn).unwrap_err();

        assert!(err.is_init(), "unexpected error: {err}");
        drop(conn);
        let conn = Connection::open(&path).unwrap();
        assert!(table_names(&conn).is_empty());
    }

    #[test]
    fn initialize_twice_fails_instead_of_duplicating_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        initialize(&mut conn).unwrap();

        assert!(initialize(&mut conn).unwrap_err().is_init());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM category", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 3);
    }
}
