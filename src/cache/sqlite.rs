use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::{CacheKey, TranslationCache};
use crate::error::{Error, Result};
use crate::paths;

/// Persistent cache backed by a `SQLite` database file.
///
/// A connection is opened per operation, so the cache can be shared across
/// tasks without holding a lock around the database handle.
pub struct SqliteCache {
    db_path: PathBuf,
}

impl SqliteCache {
    /// Opens the cache at the default location (`<cache dir>/translations.db`).
    pub fn open_default() -> Result<Self> {
        let cache_dir = paths::cache_dir();
        std::fs::create_dir_all(&cache_dir).map_err(|e| {
            Error::cache(format!(
                "failed to create cache directory {}: {e}",
                cache_dir.display()
            ))
        })?;
        Self::open(cache_dir.join("translations.db"))
    }

    /// Opens (or creates) the cache database at `db_path`.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let cache = Self {
            db_path: db_path.into(),
        };
        cache.init_db()?;
        Ok(cache)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             CREATE TABLE IF NOT EXISTS translations (
                cache_key TEXT PRIMARY KEY NOT NULL,
                translated_text TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                accessed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );",
        )?;

        Ok(())
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path).map_err(|e| {
            Error::cache(format!(
                "failed to open cache database {}: {e}",
                self.db_path.display()
            ))
        })?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(conn)
    }
}

impl TranslationCache for SqliteCache {
    fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        let conn = self.connect()?;

        let result: Option<String> = conn
            .query_row(
                "SELECT translated_text FROM translations WHERE cache_key = ?1",
                [key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        if result.is_some() {
            conn.execute(
                "UPDATE translations SET accessed_at = CURRENT_TIMESTAMP WHERE cache_key = ?1",
                [key.as_str()],
            )?;
        }

        Ok(result)
    }

    fn set(&self, key: &CacheKey, translated: &str) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "INSERT OR REPLACE INTO translations (cache_key, translated_text) VALUES (?1, ?2)",
            [key.as_str(), translated],
        )?;

        Ok(())
    }
}
