//! Store directory backed by the shared SQLite connection.

use crate::db::{is_unique_violation, like_pattern, round_rating, DbError, SortOrder};
use crate::models::{Store, StoreListing};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct NewStore<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub address: Option<&'a str>,
    pub owner_id: Option<i64>,
}

/// Filters for the admin store listing.
#[derive(Debug, Default)]
pub struct StoreFilter<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub address: Option<&'a str>,
}

/// Sortable columns for the admin store listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSortField {
    Name,
    Email,
    Address,
}

impl StoreSortField {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "name" => Some(StoreSortField::Name),
            "email" => Some(StoreSortField::Email),
            "address" => Some(StoreSortField::Address),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            StoreSortField::Name => "s.name",
            StoreSortField::Email => "s.email",
            StoreSortField::Address => "s.address",
        }
    }
}

#[derive(Clone)]
pub struct StoreDirectory {
    conn: Arc<Mutex<Connection>>,
}

impl StoreDirectory {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Create a store. Owner validity (existing store_owner user) is the
    /// caller's concern; email uniqueness is the schema's.
    pub fn create(&self, new: NewStore<'_>) -> Result<Store, DbError> {
        let created_at = Utc::now().to_rfc3339();

        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO stores (name, email, address, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![new.name, new.email, new.address, new.owner_id, created_at],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(DbError::DuplicateEmail),
            Err(e) => return Err(e.into()),
        }

        let store = Store {
            id: conn.last_insert_rowid(),
            name: new.name.to_string(),
            email: new.email.to_string(),
            address: new.address.map(|a| a.to_string()),
            owner_id: new.owner_id,
            created_at,
        };

        info!("🏬 Created store: {} (owner: {:?})", store.name, store.owner_id);

        Ok(store)
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Store>, DbError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, email, address, owner_id, created_at
             FROM stores WHERE id = ?1",
        )?;

        match stmt.query_row(params![id], row_to_store) {
            Ok(store) => Ok(Some(store)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The store assigned to an owner. At most one per owner is assigned in
    /// practice; the oldest wins if data ever says otherwise.
    pub fn find_by_owner(&self, owner_id: i64) -> Result<Option<Store>, DbError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, email, address, owner_id, created_at
             FROM stores WHERE owner_id = ?1 ORDER BY id ASC LIMIT 1",
        )?;

        match stmt.query_row(params![owner_id], row_to_store) {
            Ok(store) => Ok(Some(store)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Directory view for normal users: substring filters plus the overall
    /// mean and the caller's own rating per store.
    pub fn list_visible(
        &self,
        user_id: i64,
        name: Option<&str>,
        address: Option<&str>,
    ) -> Result<Vec<StoreListing>, DbError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT s.id, s.name, s.address,
                    (SELECT AVG(r.rating) FROM ratings r WHERE r.store_id = s.id) AS overall,
                    (SELECT r.rating FROM ratings r
                      WHERE r.store_id = s.id AND r.user_id = ?1) AS own
             FROM stores s
             WHERE (?2 IS NULL OR s.name LIKE ?2)
               AND (?3 IS NULL OR s.address LIKE ?3)
             ORDER BY s.name COLLATE NOCASE ASC",
        )?;

        let listings = stmt
            .query_map(
                params![user_id, name.map(like_pattern), address.map(like_pattern)],
                |row| {
                    Ok(StoreListing {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        address: row.get(2)?,
                        overall_rating: row.get::<_, Option<f64>>(3)?.map(round_rating),
                        user_rating: row.get(4)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(listings)
    }

    /// Admin view: full records with the mean rating per store.
    pub fn list(
        &self,
        filter: &StoreFilter<'_>,
        sort: StoreSortField,
        order: SortOrder,
    ) -> Result<Vec<(Store, Option<f64>)>, DbError> {
        let sql = format!(
            "SELECT s.id, s.name, s.email, s.address, s.owner_id, s.created_at,
                    (SELECT AVG(r.rating) FROM ratings r WHERE r.store_id = s.id) AS rating
             FROM stores s
             WHERE (?1 IS NULL OR s.name LIKE ?1)
               AND (?2 IS NULL OR s.email LIKE ?2)
               AND (?3 IS NULL OR s.address LIKE ?3)
             ORDER BY {} COLLATE NOCASE {}",
            sort.column(),
            order.keyword()
        );

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(
                params![
                    filter.name.map(like_pattern),
                    filter.email.map(like_pattern),
                    filter.address.map(like_pattern),
                ],
                |row| {
                    let store = row_to_store(row)?;
                    let rating = row.get::<_, Option<f64>>(6)?.map(round_rating);
                    Ok((store, rating))
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn count(&self) -> Result<i64, DbError> {
        let conn = self.conn.lock();
        let count = conn.query_row("SELECT COUNT(*) FROM stores", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn row_to_store(row: &rusqlite::Row<'_>) -> rusqlite::Result<Store> {
    Ok(Store {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        address: row.get(3)?,
        owner_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}
