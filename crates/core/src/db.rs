// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed store for the pending transaction queue and managed users.
//!
//! The [`Database`] struct owns both tables. Every mutating call is a single
//! statement and commits on its own; there is no transaction spanning calls.

use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

use crate::entry::{Kind, TransactionEntry};
use crate::error::{Error, Result};

/// Number of entries drained per batch unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// SQL schema for the provisioning store.
pub const SCHEMA: &str = r#"
-- Pending changes, drained in insertion order
CREATE TABLE IF NOT EXISTS txlog (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    unique_id TEXT NOT NULL,
    txtype TEXT NOT NULL,
    queued_at TEXT NOT NULL,
    UNIQUE (unique_id, txtype)
);

-- Users currently believed to hold the entitlement
CREATE TABLE IF NOT EXISTS users (
    unique_id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL
);
"#;

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Run schema creation on a database connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// SQLite database connection with queue and user operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database connection at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    // ── Queue ─────────────────────────────────────────────────────────

    /// Check whether an entry with the same identifier and kind is queued.
    pub fn exists(&self, identifier: &str, kind: Kind) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM txlog WHERE unique_id = ?1 AND txtype = ?2",
            params![identifier, kind.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Queue a change.
    ///
    /// Returns `false` when the same `(identifier, kind)` pair is already
    /// queued; the uniqueness constraint makes that a no-op rather than an error.
    pub fn enqueue(&self, identifier: &str, kind: Kind) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO txlog (unique_id, txtype, queued_at) VALUES (?1, ?2, ?3)",
            params![identifier, kind.as_str(), Utc::now().to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    /// Remove a queued change. Removing an absent entry is not an error.
    pub fn dequeue(&self, identifier: &str, kind: Kind) -> Result<()> {
        self.conn.execute(
            "DELETE FROM txlog WHERE unique_id = ?1 AND txtype = ?2",
            params![identifier, kind.as_str()],
        )?;
        Ok(())
    }

    /// Read at most `limit` entries in insertion order without removing them.
    pub fn peek_page(&self, limit: usize) -> Result<Vec<TransactionEntry>> {
        self.peek_page_at(0, limit)
    }

    /// Like [`Database::peek_page`], but skips the first `offset` entries.
    pub fn peek_page_at(&self, offset: usize, limit: usize) -> Result<Vec<TransactionEntry>> {
        let limit = i64::try_from(limit)
            .map_err(|_| Error::InvalidInput(format!("page size {limit} is too large")))?;
        let offset = i64::try_from(offset)
            .map_err(|_| Error::InvalidInput(format!("offset {offset} is too large")))?;
        self.query_entries(
            "SELECT unique_id, txtype FROM txlog ORDER BY id LIMIT ?1 OFFSET ?2",
            params![limit, offset],
        )
    }

    /// Read every queued entry in insertion order.
    pub fn list_entries(&self) -> Result<Vec<TransactionEntry>> {
        self.query_entries("SELECT unique_id, txtype FROM txlog ORDER BY id", [])
    }

    /// Number of queued entries.
    pub fn queue_len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM txlog", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn query_entries<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<TransactionEntry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let entries = stmt
            .query_map(params, |row| {
                let kind_str: String = row.get(1)?;
                Ok(TransactionEntry {
                    identifier: row.get(0)?,
                    kind: parse_db(&kind_str, "txtype")?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // ── Managed users ─────────────────────────────────────────────────

    /// Record that a user holds the entitlement. Recording twice is a no-op.
    pub fn insert_user(&self, identifier: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO users (unique_id, created_at) VALUES (?1, ?2)",
            params![identifier, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Forget a managed user. Returns true if a row was removed.
    pub fn delete_user(&self, identifier: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM users WHERE unique_id = ?1", params![identifier])?;
        Ok(affected > 0)
    }

    /// Check if a user is managed.
    pub fn user_exists(&self, identifier: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE unique_id = ?1",
            params![identifier],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// All managed user identifiers, sorted.
    pub fn list_users(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT unique_id FROM users ORDER BY unique_id")?;
        let users = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(users)
    }

    /// Number of managed users.
    pub fn user_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Size of the database in bytes (`page_count * page_size`).
    pub fn size_bytes(&self) -> Result<u64> {
        let pages: i64 = self
            .conn
            .query_row("PRAGMA page_count", [], |row| row.get(0))?;
        let page_size: i64 = self
            .conn
            .query_row("PRAGMA page_size", [], |row| row.get(0))?;
        Ok(u64::try_from(pages.saturating_mul(page_size)).unwrap_or(0))
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
