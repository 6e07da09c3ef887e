//! Rating storage. One row per (user, store); re-submitting revises in place.

use crate::db::{round_rating, DbError};
use crate::models::Rating;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::sync::Arc;
use tracing::info;

/// A rating joined with the rater's identity, for the owner dashboard.
#[derive(Debug, Clone)]
pub struct RatingWithRater {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub rating: i64,
}

#[derive(Clone)]
pub struct RatingLedger {
    conn: Arc<Mutex<Connection>>,
}

impl RatingLedger {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Insert or revise the caller's rating for a store. Returns the stored
    /// row plus whether it was newly created (false means revised).
    pub fn submit(&self, user_id: i64, store_id: i64, rating: i64) -> Result<(Rating, bool), DbError> {
        let now = Utc::now().to_rfc3339();

        let conn = self.conn.lock();

        let existing: Option<i64> = {
            let mut stmt = conn.prepare_cached(
                "SELECT id FROM ratings WHERE user_id = ?1 AND store_id = ?2",
            )?;
            match stmt.query_row(params![user_id, store_id], |row| row.get(0)) {
                Ok(id) => Some(id),
                Err(rusqlite::Error::QueryReturnedNoRows) => None,
                Err(e) => return Err(e.into()),
            }
        };
        let created = existing.is_none();

        conn.execute(
            "INSERT INTO ratings (user_id, store_id, rating, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(user_id, store_id)
             DO UPDATE SET rating = excluded.rating, updated_at = excluded.updated_at",
            params![user_id, store_id, rating, now],
        )?;

        let mut stmt = conn.prepare_cached(
            "SELECT id, user_id, store_id, rating, created_at, updated_at
             FROM ratings WHERE user_id = ?1 AND store_id = ?2",
        )?;
        let stored = stmt.query_row(params![user_id, store_id], row_to_rating)?;

        info!(
            "🎯 User {} rated store {} at {} ({})",
            user_id,
            store_id,
            rating,
            if created { "new" } else { "revised" }
        );

        Ok((stored, created))
    }

    pub fn get(&self, user_id: i64, store_id: i64) -> Result<Option<Rating>, DbError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, user_id, store_id, rating, created_at, updated_at
             FROM ratings WHERE user_id = ?1 AND store_id = ?2",
        )?;

        match stmt.query_row(params![user_id, store_id], row_to_rating) {
            Ok(rating) => Ok(Some(rating)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Mean rating for a store, rounded to one decimal. None with no ratings.
    pub fn store_average(&self, store_id: i64) -> Result<Option<f64>, DbError> {
        let conn = self.conn.lock();
        let avg: Option<f64> = conn.query_row(
            "SELECT AVG(rating) FROM ratings WHERE store_id = ?1",
            params![store_id],
            |row| row.get(0),
        )?;
        Ok(avg.map(round_rating))
    }

    /// All ratings for a store with rater identities, newest revision first.
    pub fn list_for_store(&self, store_id: i64) -> Result<Vec<RatingWithRater>, DbError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT r.id, r.user_id, u.name, u.email, r.rating
             FROM ratings r
             JOIN users u ON u.id = r.user_id
             WHERE r.store_id = ?1
             ORDER BY r.updated_at DESC, r.id DESC",
        )?;

        let rows = stmt
            .query_map(params![store_id], |row| {
                Ok(RatingWithRater {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    user_name: row.get(2)?,
                    user_email: row.get(3)?,
                    rating: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn count(&self) -> Result<i64, DbError> {
        let conn = self.conn.lock();
        let count = conn.query_row("SELECT COUNT(*) FROM ratings", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn row_to_rating(row: &rusqlite::Row<'_>) -> rusqlite::Result<Rating> {
    Ok(Rating {
        id: row.get(0)?,
        user_id: row.get(1)?,
        store_id: row.get(2)?,
        rating: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use crate::db::{stores::NewStore, users::NewUser, Database};

    fn db_with_store() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let store = db
            .stores()
            .create(NewStore {
                name: "Harbor Goods",
                email: "harbor@example.com",
                address: None,
                owner_id: None,
            })
            .unwrap();
        (db, store.id)
    }

    fn add_user(db: &Database, email: &str) -> i64 {
        db.users()
            .create(NewUser {
                name: "Rating Tester",
                email,
                password: "Secret!12",
                address: None,
                role: Role::Normal,
            })
            .unwrap()
            .id
    }

    #[test]
    fn test_submit_then_revise_keeps_single_row() {
        let (db, store_id) = db_with_store();
        let user_id = add_user(&db, "rita@example.com");
        let ratings = db.ratings();

        let (first, created) = ratings.submit(user_id, store_id, 5).unwrap();
        assert!(created);
        assert_eq!(first.rating, 5);

        let (second, created) = ratings.submit(user_id, store_id, 3).unwrap();
        assert!(!created);
        assert_eq!(second.rating, 3);
        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);

        assert_eq!(ratings.count().unwrap(), 1);
        assert_eq!(ratings.get(user_id, store_id).unwrap().unwrap().rating, 3);
    }

    #[test]
    fn test_store_average_rounds_and_nulls() {
        let (db, store_id) = db_with_store();
        let ratings = db.ratings();

        assert_eq!(ratings.store_average(store_id).unwrap(), None);

        for (i, value) in [3, 4, 5].iter().enumerate() {
            let user_id = add_user(&db, &format!("rater{}@example.com", i));
            ratings.submit(user_id, store_id, *value).unwrap();
        }

        assert_eq!(ratings.store_average(store_id).unwrap(), Some(4.0));
    }

    #[test]
    fn test_list_for_store_includes_rater_identity() {
        let (db, store_id) = db_with_store();
        let ratings = db.ratings();

        let a = add_user(&db, "ann@example.com");
        let b = add_user(&db, "bob@example.com");
        ratings.submit(a, store_id, 2).unwrap();
        ratings.submit(b, store_id, 4).unwrap();

        let rows = ratings.list_for_store(store_id).unwrap();
        assert_eq!(rows.len(), 2);
        let emails: Vec<&str> = rows.iter().map(|r| r.user_email.as_str()).collect();
        assert!(emails.contains(&"ann@example.com"));
        assert!(emails.contains(&"bob@example.com"));
    }

    #[test]
    fn test_out_of_range_rating_rejected_by_schema() {
        let (db, store_id) = db_with_store();
        let user_id = add_user(&db, "rita@example.com");

        assert!(db.ratings().submit(user_id, store_id, 6).is_err());
        assert_eq!(db.ratings().count().unwrap(), 0);
    }
}
