//! Durable article cache.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};
use crate::models::Article;

/// Persistent set of articles, unique on link.
pub trait ArticleStore: Send + Sync {
    /// All stored articles, newest first.
    fn load_all(&self) -> Result<Vec<Article>>;

    /// Insert the articles whose link is not stored yet, as one atomic batch.
    /// Returns how many rows were actually inserted.
    fn insert_if_absent(&self, articles: &[Article]) -> Result<usize>;
}

/// SQLite-backed store. A connection is opened per call, so nothing is held
/// open between sync cycles.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and ensure the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };
        let conn = store.connect().map_err(|e| SyncError::StoreRead(e.to_string()))?;
        create_schema(&conn).map_err(|e| SyncError::StoreWrite(format!("creating schema: {}", e)))?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.connect().map_err(|e| SyncError::StoreRead(e.to_string()))?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))
            .map_err(|e| SyncError::StoreRead(format!("counting articles: {}", e)))?;
        Ok(count as usize)
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        Connection::open(&self.path)
    }
}

fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS articles (
            id       INTEGER NOT NULL PRIMARY KEY,
            source   TEXT,
            title    TEXT,
            datetime INTEGER,
            link     TEXT UNIQUE
        );",
    )
}

impl ArticleStore for SqliteStore {
    fn load_all(&self) -> Result<Vec<Article>> {
        let read_err = |context: &str, e: rusqlite::Error| SyncError::StoreRead(format!("{}: {}", context, e));

        let conn = self.connect().map_err(|e| read_err("opening database", e))?;
        let mut stmt = conn
            .prepare(
                "SELECT source, title, datetime, link
                 FROM articles
                 ORDER BY datetime DESC",
            )
            .map_err(|e| read_err("querying articles", e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?, // source
                    row.get::<_, String>(1)?, // title
                    row.get::<_, i64>(2)?,    // datetime, epoch millis
                    row.get::<_, String>(3)?, // link
                ))
            })
            .map_err(|e| read_err("querying articles", e))?;

        let mut articles = Vec::new();
        for row in rows {
            let (source, title, millis, link) = row.map_err(|e| read_err("scanning article row", e))?;
            let published_at = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
                SyncError::StoreRead(format!("invalid timestamp {} for {}", millis, link))
            })?;
            articles.push(Article {
                source,
                title,
                published_at,
                link,
            });
        }

        Ok(articles)
    }

    fn insert_if_absent(&self, articles: &[Article]) -> Result<usize> {
        let write_err = |context: &str, e: rusqlite::Error| SyncError::StoreWrite(format!("{}: {}", context, e));

        let mut conn = self.connect().map_err(|e| write_err("opening database", e))?;
        // Dropping the transaction without commit rolls it back.
        let tx = conn
            .transaction()
            .map_err(|e| write_err("beginning transaction", e))?;

        let mut inserted = 0;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR IGNORE INTO articles (source, title, datetime, link)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(|e| write_err("preparing statement", e))?;

            for a in articles {
                inserted += stmt
                    .execute(params![a.source, a.title, a.published_at.timestamp_millis(), a.link])
                    .map_err(|e| write_err(&format!("inserting article {:?}", a.title), e))?;
            }
        }

        tx.commit().map_err(|e| write_err("committing transaction", e))?;
        Ok(inserted)
    }
}
