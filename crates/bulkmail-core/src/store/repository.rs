//! SQLite-backed key-value store.

use std::path::Path;

use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use super::KeyValueStore;
use crate::{Error, Result};

/// Key-value store persisted in `SQLite`, one row per `(session, key)`.
///
/// Several named sessions can share a database file; each store instance
/// only sees its own session's rows.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    session: String,
}

impl SqliteStore {
    /// Opens (or creates) the database at `database_path` for `session`.
    ///
    /// Creates parent directories, the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the session name is empty, the directory cannot be
    /// created, or the database connection or schema creation fails.
    pub async fn open(database_path: &Path, session: &str) -> Result<Self> {
        let session = checked_session(session)?;
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        debug!(path = %database_path.display(), %session, "Opened session store");
        let store = Self { pool, session };
        store.initialize().await?;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection or schema creation fails.
    pub async fn in_memory(session: &str) -> Result<Self> {
        let session = checked_session(session)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool, session };
        store.initialize().await?;
        Ok(store)
    }

    /// Name of the session this store reads and writes.
    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS session_entries (
                session TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (session, key)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn checked_session(session: &str) -> Result<String> {
    let session = session.trim();
    if session.is_empty() {
        return Err(Error::Config("session name must not be empty".to_string()));
    }
    Ok(session.to_string())
}

impl KeyValueStore for SqliteStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM session_entries WHERE session = ? AND key = ?")
            .bind(&self.session)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("value")))
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO session_entries (session, key, value, updated_at)
            VALUES (?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(session, key) DO UPDATE SET
                value = excluded.value,
                updated_at = CURRENT_TIMESTAMP
            ",
        )
        .bind(&self.session)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear(&self, keys: &[&str]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for key in keys {
            sqlx::query("DELETE FROM session_entries WHERE session = ? AND key = ?")
                .bind(&self.session)
                .bind(*key)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_load_overwrite() {
        let store = SqliteStore::in_memory("default").await.unwrap();
        assert_eq!(store.load("lp_subject").await.unwrap(), None);

        store.save("lp_subject", "Hello").await.unwrap();
        store.save("lp_subject", "Hello again").await.unwrap();
        assert_eq!(
            store.load("lp_subject").await.unwrap().as_deref(),
            Some("Hello again")
        );
    }

    #[tokio::test]
    async fn clear_removes_all_named_keys() {
        let store = SqliteStore::in_memory("default").await.unwrap();
        store.save("lp_subject", "s").await.unwrap();
        store.save("lp_body", "b").await.unwrap();
        store.save("token", "t").await.unwrap();

        store.clear(&["lp_subject", "lp_body"]).await.unwrap();

        assert_eq!(store.load("lp_subject").await.unwrap(), None);
        assert_eq!(store.load("lp_body").await.unwrap(), None);
        assert_eq!(store.load("token").await.unwrap().as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn empty_session_rejected() {
        assert!(matches!(
            SqliteStore::in_memory("  ").await,
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn sessions_are_isolated_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.db");

        let work = SqliteStore::open(&path, "work").await.unwrap();
        work.save("lp_subject", "Work subject").await.unwrap();

        let personal = SqliteStore::open(&path, "personal").await.unwrap();
        assert_eq!(personal.load("lp_subject").await.unwrap(), None);

        let reopened = SqliteStore::open(&path, "work").await.unwrap();
        assert_eq!(
            reopened.load("lp_subject").await.unwrap().as_deref(),
            Some("Work subject")
        );
        assert_eq!(reopened.session(), "work");
    }
}
