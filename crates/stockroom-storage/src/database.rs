// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use stockroom_core::StockroomError;
use tracing::debug;

use crate::migrations;

/// Handle to the Stockroom SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (or creates) the database at `path` and applies pending migrations.
    ///
    /// Migrations run on a short-lived synchronous connection before the
    /// background connection is started.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, StockroomError> {
        if let Some(parent) = Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StockroomError::storage)?;
        }

        {
            let mut setup = rusqlite::Connection::open(path).map_err(StockroomError::storage)?;
            if wal_mode {
                let mode: String = setup
                    .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                    .map_err(StockroomError::storage)?;
                debug!(journal_mode = %mode, "journal mode set");
            }
            migrations::run_migrations(&mut setup)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| StockroomError::Storage { source: Box::new(e) })?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The background connection every query goes through.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL so the main database file is self-contained.
    pub async fn close(&self) -> Result<(), StockroomError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Maps a tokio-rusqlite failure into the workspace error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> StockroomError {
    StockroomError::Storage {
        source: Box::new(e),
    }
}

/// True when `err` is a UNIQUE or PRIMARY KEY constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_parent_directories() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/deeper/stockroom.db");

        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        assert!(db_path.exists());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        let path = db_path.to_str().unwrap();

        Database::open(path, true).await.unwrap().close().await.unwrap();
        Database::open(path, true).await.unwrap().close().await.unwrap();
    }

    #[tokio::test]
    async fn migrations_create_import_tables() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("tables.db");
        let db = Database::open(db_path.to_str().unwrap(), false).await.unwrap();

        let tables = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();

        for expected in [
            "assets",
            "attachments",
            "attributes",
            "categories",
            "category_attributes",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
        }
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("fk.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();

        let result = db
            .connection()
            .call(|conn| -> Result<usize, rusqlite::Error> {
                conn.execute(
                    "INSERT INTO attachments (id, asset_id, storage_key, filename, size, content_type, created_at)
                     VALUES ('a1', 'missing-asset', 'k', 'f', 0, 'image/png', '2026-01-01T00:00:00Z')",
                    [],
                )
            })
            .await;
        assert!(result.is_err());
    }
}
