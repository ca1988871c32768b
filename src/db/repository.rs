use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::error_log::ErrorLog;
use crate::feed::FeedGenerator;
use crate::models::{ArticleView, Category, NewArticle};
use crate::sanitize::clear_id;

use super::schema;

const ARTICLE_COLUMNS: &str = r#"msgs.id, msgs.title, msgs.category, category.name,
       msgs.description, msgs.text, msgs.source, msgs.datetime"#;

/// Whether the feed on disk reflects a mutation that was just committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Current,
    /// The data change is committed but the feed could not be rewritten.
    Stale(String),
}

impl FeedStatus {
    pub fn is_current(&self) -> bool {
        matches!(self, FeedStatus::Current)
    }
}

/// Outcome of a committed save or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// The inserted row id for a save, the sanitized target id for a delete.
    pub id: i64,
    pub rows_affected: usize,
    pub feed: FeedStatus,
}

pub struct ArticleStore {
    conn: Connection,
    feed: FeedGenerator,
}

impl ArticleStore {
    /// Opens the store described by `config`. Initialization failures are
    /// appended to the configured error log before being returned.
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_with(
            &config.db_path,
            FeedGenerator::from_config(config),
            &ErrorLog::new(&config.error_log_path),
        )
    }

    pub fn open_with(db_path: &Path, feed: FeedGenerator, error_log: &ErrorLog) -> Result<Self> {
        let fresh = schema::needs_initialization(db_path);

        let result = Connection::open(db_path)
            .map_err(|e| AppError::Init(format!("Failed to open database {:?}: \"{}\"", db_path, e)))
            .and_then(|conn| Self::bootstrap(conn, fresh));

        match result {
            Ok(conn) => Ok(Self { conn, feed }),
            Err(e) => {
                tracing::error!("Store initialization failed: {}", e);
                error_log.append(&e.to_string());
                Err(e)
            }
        }
    }

    /// A private in-memory store, always freshly initialized.
    pub fn open_in_memory(feed: FeedGenerator) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Init(format!("Failed to open in-memory database: \"{}\"", e)))?;
        let conn = Self::bootstrap(conn, true)?;
        Ok(Self { conn, feed })
    }

    fn bootstrap(mut conn: Connection, fresh: bool) -> Result<Connection> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .and_then(|()| conn.busy_timeout(Duration::from_secs(5)))
            .map_err(|e| AppError::Init(format!("Failed to configure connection: \"{}\"", e)))?;

        // Opening is lazy: a file that is not a database only fails on first read.
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
            .map_err(|e| AppError::Init(format!("Failed to read database: \"{}\"", e)))?;

        if fresh {
            schema::initialize(&mut conn)?;
        } else {
            tracing::debug!("Existing database found, skipping schema setup");
        }
        Ok(conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn feed(&self) -> &FeedGenerator {
        &self.feed
    }

    /// Releases the connection now instead of at drop, reporting close errors.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| AppError::Database(e))
    }

    // Article operations

    pub fn save_article(
        &self,
        title: &str,
        category: i64,
        description: &str,
        text: &str,
        source: &str,
    ) -> Result<Mutation> {
        self.insert_article(&NewArticle {
            title: title.to_string(),
            category,
            description: description.to_string(),
            text: text.to_string(),
            source: source.to_string(),
        })
    }

    /// Inserts an article stamped with the current time, then rewrites the
    /// feed. Content is stored as given; validation belongs to the caller.
    pub fn insert_article(&self, article: &NewArticle) -> Result<Mutation> {
        let rows_affected = self.conn.execute(
            "INSERT INTO msgs (title, category, description, text, source, datetime)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                article.title,
                article.category,
                article.description,
                article.text,
                article.source,
                Utc::now().timestamp(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!("Inserted article {}", id);

        Ok(Mutation {
            id,
            rows_affected,
            feed: self.refresh_feed(),
        })
    }

    /// All articles with their category names, newest first.
    pub fn list_articles(&self) -> Result<Vec<ArticleView>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ARTICLE_COLUMNS}
             FROM msgs
             JOIN category ON category.id = msgs.category
             ORDER BY msgs.id DESC"
        ))?;
        let articles = stmt
            .query_map([], article_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(articles)
    }

    /// Looks up one article; a negative id is treated as its absolute value.
    pub fn get_article(&self, id: i64) -> Result<Option<ArticleView>> {
        let id = clear_id(id);
        let article = self
            .conn
            .query_row(
                &format!(
                    "SELECT {ARTICLE_COLUMNS}
                     FROM msgs
                     JOIN category ON category.id = msgs.category
                     WHERE msgs.id = ?1"
                ),
                params![id],
                article_from_row,
            )
            .optional()?;
        Ok(article)
    }

    /// Deletes by id. A missing id is not an error; `rows_affected` is then 0.
    pub fn delete_article(&self, id: i64) -> Result<Mutation> {
        let id = clear_id(id);
        let rows_affected = self
            .conn
            .execute("DELETE FROM msgs WHERE id = ?1", params![id])?;
        tracing::debug!("Deleted {} article(s) with id {}", rows_affected, id);

        Ok(Mutation {
            id,
            rows_affected,
            feed: self.refresh_feed(),
        })
    }

    pub fn count_articles(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM msgs", [], |row| row.get(0))?;
        Ok(count)
    }

    // Category operations

    /// Categories ordered by name.
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM category ORDER BY name ASC")?;
        let categories = stmt
            .query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    pub fn count_categories(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM category", [], |row| row.get(0))?;
        Ok(count)
    }

    // Feed

    /// Rewrites the feed from the current article list and returns the
    /// number of items written.
    pub fn regenerate_feed(&self) -> Result<usize> {
        let articles = self.list_articles()?;
        self.feed.regenerate(&articles)?;
        Ok(articles.len())
    }

    fn refresh_feed(&self) -> FeedStatus {
        match self.regenerate_feed() {
            Ok(_) => FeedStatus::Current,
            Err(e) => {
                tracing::warn!("Feed is stale after mutation: {}", e);
                FeedStatus::Stale(e.to_string())
            }
        }
    }
}

fn article_from_row(row: &Row) -> rusqlite::Result<ArticleView> {
    Ok(ArticleView {
        id: row.get(0)?,
        title: row.get(1)?,
        category_id: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        text: row.get(5)?,
        source: row.get(6)?,
        datetime: row.get(7)?,
    })
}
