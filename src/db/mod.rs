//! SQLite persistence layer.
//!
//! One connection shared behind a parking_lot mutex; WAL mode so readers
//! are not blocked during writes. Uniqueness lives in the schema, not in
//! application checks: user and store emails carry UNIQUE constraints and
//! the ratings table is keyed UNIQUE(user_id, store_id).

use anyhow::{Context, Result};
use parking_lot::Mutex; // Faster than std::sync::Mutex
use rusqlite::{Connection, OpenFlags};
use std::sync::Arc;
use thiserror::Error;

pub mod ratings;
pub mod stores;
pub mod users;

pub use ratings::RatingLedger;
pub use stores::StoreDirectory;
pub use users::UserStore;

const SCHEMA_SQL: &str = r#"
-- WAL mode for concurrent reads during writes
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL COLLATE NOCASE UNIQUE,
    password_hash TEXT NOT NULL,
    address TEXT,
    role TEXT NOT NULL DEFAULT 'normal',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS stores (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL COLLATE NOCASE UNIQUE,
    address TEXT,
    owner_id INTEGER REFERENCES users(id),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ratings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    store_id INTEGER NOT NULL REFERENCES stores(id),
    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, store_id)
);

CREATE INDEX IF NOT EXISTS idx_ratings_store ON ratings(store_id);
CREATE INDEX IF NOT EXISTS idx_stores_owner ON stores(owner_id);
"#;

/// Storage failures that handlers need to tell apart.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("email already exists")]
    DuplicateEmail,
    #[error("password hashing failed")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Handle to the rating platform database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file and apply the schema.
    pub fn open(db_path: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX; // We handle our own locking

        let conn = Connection::open_with_flags(db_path, flags)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn users(&self) -> UserStore {
        UserStore::new(self.conn.clone())
    }

    pub fn stores(&self) -> StoreDirectory {
        StoreDirectory::new(self.conn.clone())
    }

    pub fn ratings(&self) -> RatingLedger {
        RatingLedger::new(self.conn.clone())
    }
}

/// Sort direction for admin listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub(crate) fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Substring match pattern for LIKE filters.
pub(crate) fn like_pattern(term: &str) -> String {
    format!("%{}%", term)
}

/// Means are reported to one decimal place.
pub(crate) fn round_rating(avg: f64) -> f64 {
    (avg * 10.0).round() / 10.0
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
